//! Shader program building with CPU-side compile and link checking.
//!
//! WGSL text is parsed and validated on the CPU before anything touches the
//! device, so a broken shader produces a readable diagnostic log instead of
//! a device error at pipeline creation. Compile and link failures are
//! deliberately non-fatal: the unit or program is still returned with its
//! log filled, matching an iterative shader-editing workflow where the
//! operator reads the log, fixes the source, and relaunches.

use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::error::DriftError;

/// Upper bound on retained diagnostic text per unit or program.
const MAX_LOG_BYTES: usize = 4096;

/// Pipeline stage a shader unit feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    /// Vertex stage.
    Vertex,
    /// Fragment stage.
    Fragment,
}

impl ShaderStage {
    fn naga_stage(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

/// One compiled (or failed) shader stage.
pub struct ShaderUnit {
    stage: ShaderStage,
    label: String,
    module: Option<naga::Module>,
    log: String,
}

impl ShaderUnit {
    /// Parse and validate WGSL source. Never fails hard; check
    /// [`ShaderUnit::is_ok`] and read [`ShaderUnit::log`] on failure.
    ///
    /// Empty (or whitespace-only) source is a compile failure: it is what a
    /// missing or truncated shader file degrades to, and naga would accept
    /// it as a module with no entry points.
    #[must_use]
    pub fn compile(stage: ShaderStage, label: &str, source: &str) -> Self {
        if source.trim().is_empty() {
            return Self::failed(
                stage,
                label,
                format!("{stage} stage `{label}`: empty shader source"),
            );
        }
        let module = match naga::front::wgsl::parse_str(source) {
            Ok(module) => module,
            Err(err) => {
                return Self::failed(stage, label, err.emit_to_string(source));
            }
        };
        let mut validator =
            Validator::new(ValidationFlags::all(), Capabilities::default());
        match validator.validate(&module) {
            Ok(_info) => Self {
                stage,
                label: label.to_owned(),
                module: Some(module),
                log: String::new(),
            },
            Err(err) => Self::failed(stage, label, err.emit_to_string(source)),
        }
    }

    /// Read a shader stage from disk. A missing or unreadable file becomes a
    /// failed unit whose log carries the I/O detail, the same path a bad
    /// compile takes.
    #[must_use]
    pub fn compile_file(stage: ShaderStage, path: &Path) -> Self {
        let label = path.display().to_string();
        match std::fs::read_to_string(path) {
            Ok(source) => Self::compile(stage, &label, &source),
            Err(err) => {
                Self::failed(stage, &label, format!("cannot read {label}: {err}"))
            }
        }
    }

    fn failed(stage: ShaderStage, label: &str, log: String) -> Self {
        Self {
            stage,
            label: label.to_owned(),
            module: None,
            log: bounded(log),
        }
    }

    /// True when the source parsed and validated.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.module.is_some()
    }

    /// Diagnostic text from compilation, empty on success.
    #[must_use]
    pub fn log(&self) -> &str {
        &self.log
    }

    /// Stage this unit was compiled for.
    #[must_use]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Label given at compile time, usually the source path.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A vertex and fragment unit linked into one draw-capable program.
///
/// Linking is a CPU check: both units must have compiled, each must expose
/// an entry point for its stage, and every fragment input location must be
/// fed by a vertex output. A program that fails any of these still exists
/// and reports through [`ShaderProgram::log`]; only pipeline creation is
/// withheld.
pub struct ShaderProgram {
    label: String,
    vertex: ShaderUnit,
    fragment: ShaderUnit,
    vertex_entry: String,
    fragment_entry: String,
    log: String,
    ok: bool,
}

impl ShaderProgram {
    /// Link two compiled units into a program.
    #[must_use]
    pub fn link(label: &str, vertex: ShaderUnit, fragment: ShaderUnit) -> Self {
        let mut log = String::new();
        let mut ok = true;

        if !vertex.is_ok() {
            ok = false;
            log.push_str(&format!(
                "{} stage `{}` failed to compile:\n{}\n",
                vertex.stage,
                vertex.label,
                vertex.log
            ));
        }
        if !fragment.is_ok() {
            ok = false;
            log.push_str(&format!(
                "{} stage `{}` failed to compile:\n{}\n",
                fragment.stage,
                fragment.label,
                fragment.log
            ));
        }

        let mut vertex_entry = String::new();
        let mut fragment_entry = String::new();
        if ok {
            match entry_point(&vertex, ShaderStage::Vertex) {
                Some(ep) => vertex_entry = ep.name.clone(),
                None => {
                    ok = false;
                    log.push_str("no vertex entry point\n");
                }
            }
            match entry_point(&fragment, ShaderStage::Fragment) {
                Some(ep) => fragment_entry = ep.name.clone(),
                None => {
                    ok = false;
                    log.push_str("no fragment entry point\n");
                }
            }
        }

        if ok {
            let outputs = stage_output_locations(&vertex, ShaderStage::Vertex);
            for (name, location) in
                stage_input_locations(&fragment, ShaderStage::Fragment)
            {
                if !outputs.contains(&location) {
                    ok = false;
                    log.push_str(&format!(
                        "fragment input `{name}` at location {location} \
                         has no matching vertex output\n",
                    ));
                }
            }
        }

        Self {
            label: label.to_owned(),
            vertex,
            fragment,
            vertex_entry,
            fragment_entry,
            log: bounded(log),
            ok,
        }
    }

    /// True when both stages compiled and their interfaces line up.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Diagnostic text from linking, empty on success.
    #[must_use]
    pub fn log(&self) -> &str {
        &self.log
    }

    /// Label given at link time.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Name of the vertex entry point. Empty for a failed program.
    #[must_use]
    pub fn vertex_entry(&self) -> &str {
        &self.vertex_entry
    }

    /// Name of the fragment entry point. Empty for a failed program.
    #[must_use]
    pub fn fragment_entry(&self) -> &str {
        &self.fragment_entry
    }

    /// Resolve a named vertex input to its shader location, searching both
    /// direct entry-point arguments and struct-typed argument members.
    ///
    /// # Errors
    ///
    /// Returns [`DriftError::UnknownAttribute`] if the program did not link
    /// or no vertex input carries the name.
    pub fn attribute_location(&self, name: &str) -> Result<u32, DriftError> {
        if self.ok {
            let inputs = stage_input_locations(&self.vertex, ShaderStage::Vertex);
            if let Some((_, location)) =
                inputs.iter().find(|(input, _)| input == name)
            {
                return Ok(*location);
            }
        }
        Err(DriftError::UnknownAttribute {
            name: name.to_owned(),
            program: self.label.clone(),
        })
    }

    /// Hand both stages to the device as wgpu modules, moving the validated
    /// IR across without a WGSL re-parse. `None` for a failed program.
    #[must_use]
    pub fn create_modules(
        &self,
        device: &wgpu::Device,
    ) -> Option<(wgpu::ShaderModule, wgpu::ShaderModule)> {
        if !self.ok {
            return None;
        }
        let vs = self.vertex.module.as_ref()?;
        let fs = self.fragment.module.as_ref()?;
        let vs_module =
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(self.vertex.label()),
                source: wgpu::ShaderSource::Naga(Cow::Owned(vs.clone())),
            });
        let fs_module =
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(self.fragment.label()),
                source: wgpu::ShaderSource::Naga(Cow::Owned(fs.clone())),
            });
        Some((vs_module, fs_module))
    }
}

fn entry_point<'m>(
    unit: &'m ShaderUnit,
    stage: ShaderStage,
) -> Option<&'m naga::EntryPoint> {
    let module = unit.module.as_ref()?;
    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage.naga_stage())
}

/// Named `@location` inputs of a stage entry point. Builtins are skipped;
/// struct-typed arguments are flattened to their members.
fn stage_input_locations(
    unit: &ShaderUnit,
    stage: ShaderStage,
) -> Vec<(String, u32)> {
    let mut inputs = Vec::new();
    let (Some(module), Some(entry)) =
        (unit.module.as_ref(), entry_point(unit, stage))
    else {
        return inputs;
    };
    for arg in &entry.function.arguments {
        match &arg.binding {
            Some(naga::Binding::Location { location, .. }) => {
                if let Some(name) = &arg.name {
                    inputs.push((name.clone(), *location));
                }
            }
            Some(naga::Binding::BuiltIn(_)) => {}
            None => {
                if let naga::TypeInner::Struct { members, .. } =
                    &module.types[arg.ty].inner
                {
                    for member in members {
                        if let Some(naga::Binding::Location {
                            location, ..
                        }) = &member.binding
                        {
                            if let Some(name) = &member.name {
                                inputs.push((name.clone(), *location));
                            }
                        }
                    }
                }
            }
        }
    }
    inputs
}

/// `@location` outputs of a stage entry point, builtins skipped.
fn stage_output_locations(unit: &ShaderUnit, stage: ShaderStage) -> Vec<u32> {
    let mut outputs = Vec::new();
    let (Some(module), Some(entry)) =
        (unit.module.as_ref(), entry_point(unit, stage))
    else {
        return outputs;
    };
    let Some(result) = &entry.function.result else {
        return outputs;
    };
    match &result.binding {
        Some(naga::Binding::Location { location, .. }) => {
            outputs.push(*location);
        }
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } =
                &module.types[result.ty].inner
            {
                for member in members {
                    if let Some(naga::Binding::Location { location, .. }) =
                        &member.binding
                    {
                        outputs.push(*location);
                    }
                }
            }
        }
    }
    outputs
}

/// Cap diagnostic text at [`MAX_LOG_BYTES`], preserving char boundaries.
fn bounded(mut log: String) -> String {
    if log.len() > MAX_LOG_BYTES {
        let mut end = MAX_LOG_BYTES;
        while !log.is_char_boundary(end) {
            end -= 1;
        }
        log.truncate(end);
        log.push_str("\n(log truncated)");
    }
    log
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_VERT: &str = r"
struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) color: vec3<f32>,
}

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
) -> VsOut {
    var out: VsOut;
    out.clip = vec4<f32>(position, 1.0);
    out.color = color;
    return out;
}
";

    const VALID_FRAG: &str = r"
@fragment
fn fs_main(@location(0) color: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(color, 1.0);
}
";

    fn linked_program() -> ShaderProgram {
        let vs = ShaderUnit::compile(ShaderStage::Vertex, "test.vert", VALID_VERT);
        let fs =
            ShaderUnit::compile(ShaderStage::Fragment, "test.frag", VALID_FRAG);
        ShaderProgram::link("test", vs, fs)
    }

    #[test]
    fn valid_source_compiles_with_empty_log() {
        let unit =
            ShaderUnit::compile(ShaderStage::Vertex, "test.vert", VALID_VERT);
        assert!(unit.is_ok());
        assert!(unit.log().is_empty());
        assert_eq!(unit.stage(), ShaderStage::Vertex);
    }

    #[test]
    fn syntax_error_fails_with_diagnostics() {
        let unit = ShaderUnit::compile(
            ShaderStage::Fragment,
            "broken.frag",
            "@fragment fn fs_main( -> f32 { return 1.0; }",
        );
        assert!(!unit.is_ok());
        assert!(!unit.log().is_empty());
    }

    #[test]
    fn type_error_fails_validation() {
        let unit = ShaderUnit::compile(
            ShaderStage::Fragment,
            "broken.frag",
            r"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return 1.0;
}
",
        );
        assert!(!unit.is_ok());
        assert!(!unit.log().is_empty());
    }

    #[test]
    fn matching_stages_link() {
        let program = linked_program();
        assert!(program.is_ok());
        assert!(program.log().is_empty());
        assert_eq!(program.vertex_entry(), "vs_main");
        assert_eq!(program.fragment_entry(), "fs_main");
    }

    #[test]
    fn compiling_twice_yields_equivalent_programs() {
        let first = linked_program();
        let second = linked_program();
        assert!(first.is_ok() && second.is_ok());
        assert_eq!(first.vertex_entry(), second.vertex_entry());
        assert_eq!(
            first.attribute_location("position").unwrap(),
            second.attribute_location("position").unwrap()
        );
    }

    #[test]
    fn unfed_fragment_input_fails_link() {
        let vs = ShaderUnit::compile(
            ShaderStage::Vertex,
            "plain.vert",
            r"
@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 1.0);
}
",
        );
        let fs =
            ShaderUnit::compile(ShaderStage::Fragment, "test.frag", VALID_FRAG);
        let program = ShaderProgram::link("mismatched", vs, fs);
        assert!(!program.is_ok());
        assert!(program.log().contains("location 0"));
    }

    #[test]
    fn failed_unit_fails_link_but_still_returns_program() {
        let vs = ShaderUnit::compile(ShaderStage::Vertex, "bad.vert", "nope");
        let fs =
            ShaderUnit::compile(ShaderStage::Fragment, "test.frag", VALID_FRAG);
        let program = ShaderProgram::link("half-broken", vs, fs);
        assert!(!program.is_ok());
        assert!(program.log().contains("bad.vert"));
    }

    #[test]
    fn empty_source_is_a_compile_failure() {
        let vs = ShaderUnit::compile(ShaderStage::Vertex, "empty.vert", "");
        assert!(!vs.is_ok());
        assert!(vs.log().contains("empty shader source"));

        // Whitespace-only source takes the same path.
        let ws =
            ShaderUnit::compile(ShaderStage::Vertex, "blank.vert", " \n\t\n");
        assert!(!ws.is_ok());

        // The failure still flows through the normal link diagnostics.
        let fs =
            ShaderUnit::compile(ShaderStage::Fragment, "test.frag", VALID_FRAG);
        let program = ShaderProgram::link("empty", vs, fs);
        assert!(!program.is_ok());
        assert!(program.log().contains("empty.vert"));
    }

    #[test]
    fn attributes_resolve_from_struct_and_direct_arguments() {
        let program = linked_program();
        assert_eq!(program.attribute_location("position").unwrap(), 0);
        assert_eq!(program.attribute_location("color").unwrap(), 1);
        assert!(matches!(
            program.attribute_location("missing"),
            Err(DriftError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn oversized_logs_are_truncated() {
        let huge = "x".repeat(3 * MAX_LOG_BYTES);
        let capped = bounded(huge);
        assert!(capped.len() <= MAX_LOG_BYTES + "\n(log truncated)".len());
        assert!(capped.ends_with("(log truncated)"));
        assert_eq!(bounded("short".to_owned()), "short");
    }
}
