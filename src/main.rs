use std::path::Path;

use driftview::config::Config;
use driftview::Viewer;

/// Config file looked up in the working directory.
const CONFIG_PATH: &str = "driftview.toml";

fn main() {
    env_logger::init();

    let config_path = Path::new(CONFIG_PATH);
    let mut config = if config_path.exists() {
        match Config::load(config_path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("failed to load {CONFIG_PATH}: {e}");
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    // First CLI argument overrides the configured mesh path.
    if let Some(path) = std::env::args().nth(1) {
        config.scene.mesh_path = path;
    }

    if let Err(e) = Viewer::builder().with_config(config).build().run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
