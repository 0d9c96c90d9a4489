//! Per-frame orchestration of simulation, uploads, and draw submission.
//!
//! The engine owns every GPU resource for the process lifetime: the render
//! context, the shared camera binding, and both passes. Each frame splits
//! into [`DriftEngine::update`] (CPU mutation plus buffer uploads) and
//! [`DriftEngine::render`] (one pass clearing to black, particles drawn
//! before the mesh, then present).

use std::path::Path;

use crate::camera::Camera;
use crate::config::Config;
use crate::error::DriftError;
use crate::geometry::{load_stl, Mesh};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader::{ShaderProgram, ShaderStage, ShaderUnit};
use crate::particles::ParticleCloud;
use crate::render::mesh::{MeshPass, MeshSpin};
use crate::render::particles::ParticlePass;
use crate::render::CameraBinding;

/// Owns the GPU context, the simulation state, and both render passes.
pub struct DriftEngine {
    /// Explicit GPU context; every draw and upload goes through it.
    pub context: RenderContext,
    camera: Camera,
    camera_binding: CameraBinding,
    cloud: ParticleCloud,
    particle_pass: ParticlePass,
    mesh_pass: MeshPass,
    spin: MeshSpin,
}

impl DriftEngine {
    /// Build every resource up front: context, mesh, shaders, passes.
    ///
    /// Shader compile or link failures are logged and leave the affected
    /// pass inert rather than failing construction. A missing mesh file or
    /// a failed GPU handshake is fatal.
    ///
    /// # Errors
    ///
    /// Returns [`DriftError`] when the GPU context cannot be created, the
    /// mesh file cannot be read, or attribute reflection fails against a
    /// linked program.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        initial_size: (u32, u32),
        config: &Config,
    ) -> Result<Self, DriftError> {
        let context = RenderContext::new(window, initial_size).await?;

        let triangles = load_stl(Path::new(&config.scene.mesh_path))?;
        let mesh = Mesh::from_triangles(&triangles);
        log::info!(
            "loaded {} ({} triangles)",
            config.scene.mesh_path,
            triangles.len()
        );

        let camera = Camera::from_config(
            &config.camera,
            initial_size.0,
            initial_size.1,
        );
        let camera_binding = CameraBinding::new(&context, &camera);

        let shader_dir = Path::new(&config.scene.shader_dir);
        let particle_program = build_program(shader_dir, "particle");
        let mesh_program = build_program(shader_dir, "mesh");

        let cloud = match config.simulation.seed {
            Some(seed) => ParticleCloud::spawn_seeded(
                config.simulation.particle_count,
                config.simulation.jitter,
                seed,
            ),
            None => ParticleCloud::spawn(
                config.simulation.particle_count,
                config.simulation.jitter,
            ),
        };

        let particle_pass = ParticlePass::new(
            &context,
            &particle_program,
            camera_binding.layout(),
            cloud.particles(),
        )?;
        let mesh_pass = MeshPass::new(
            &context,
            &mesh_program,
            camera_binding.layout(),
            &mesh,
        )?;

        let spin = MeshSpin::new(
            glam::Vec3::from_array(config.scene.rotation_axis),
            config.scene.rotation_step_deg,
            config.scene.mesh_scale,
        );

        Ok(Self {
            context,
            camera,
            camera_binding,
            cloud,
            particle_pass,
            mesh_pass,
            spin,
        })
    }

    /// Advance the simulation one frame and push the results to the GPU:
    /// jitter every particle and overwrite the whole stream buffer, then
    /// step the mesh spin and rewrite its model uniform.
    ///
    /// # Errors
    ///
    /// Returns [`DriftError::BufferOverrun`] if an upload outgrew its
    /// buffer; counts are fixed at startup, so this signals a bug.
    pub fn update(&mut self) -> Result<(), DriftError> {
        self.cloud.advance();
        self.particle_pass
            .upload(&self.context.queue, self.cloud.particles())?;
        let transform = self.spin.step();
        self.mesh_pass.set_transform(&self.context.queue, transform)
    }

    /// Record and submit one frame: clear to black, draw the particle
    /// cloud, draw the mesh, present.
    ///
    /// # Errors
    ///
    /// Returns [`wgpu::SurfaceError`] when the swapchain image cannot be
    /// acquired; the caller reconfigures on `Lost`/`Outdated` and simply
    /// tries again next frame otherwise.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.get_next_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.context.create_encoder();

        {
            let mut render_pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Main Render Pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        },
                    )],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

            // Particles first, mesh second. Blending is off so the order
            // does not change final pixels, but it is kept fixed.
            self.particle_pass
                .draw(&mut render_pass, self.camera_binding.bind_group());
            self.mesh_pass
                .draw(&mut render_pass, self.camera_binding.bind_group());
        }

        self.context.submit(encoder);
        frame.present();
        Ok(())
    }

    /// Reconfigure the surface and camera projection for a new framebuffer
    /// size. Zero-sized dimensions are ignored by the surface; the camera
    /// clamps them.
    ///
    /// # Errors
    ///
    /// Returns [`DriftError`] if the camera uniform rewrite fails.
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<(), DriftError> {
        self.context.resize(width, height);
        self.camera.set_aspect(width, height);
        self.camera_binding.update(&self.context.queue, &self.camera)
    }

    /// Number of particles drawn each frame.
    #[must_use]
    pub fn particle_count(&self) -> u32 {
        self.particle_pass.count()
    }

    /// Number of mesh vertices drawn each frame.
    #[must_use]
    pub fn mesh_vertex_count(&self) -> u32 {
        self.mesh_pass.vertex_count()
    }

    /// Accumulated mesh rotation in degrees, wrapped to [0, 360).
    #[must_use]
    pub fn rotation_deg(&self) -> f32 {
        self.spin.angle_deg()
    }
}

/// Compile `<name>.vert.wgsl` and `<name>.frag.wgsl` from `dir` and link
/// them. Failures are logged here and leave the program unusable; the
/// passes built from it skip their draws.
fn build_program(dir: &Path, name: &str) -> ShaderProgram {
    let vertex = ShaderUnit::compile_file(
        ShaderStage::Vertex,
        &dir.join(format!("{name}.vert.wgsl")),
    );
    let fragment = ShaderUnit::compile_file(
        ShaderStage::Fragment,
        &dir.join(format!("{name}.frag.wgsl")),
    );
    let program = ShaderProgram::link(name, vertex, fragment);
    if program.is_ok() {
        log::debug!("program `{name}` linked");
    } else {
        log::warn!("program `{name}` is unusable:\n{}", program.log());
    }
    program
}
