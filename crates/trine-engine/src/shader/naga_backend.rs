use std::collections::HashSet;

use naga::valid::{Capabilities, ModuleInfo, ValidationFlags, Validator};

use super::compiler::{CompilerBackend, DiagnosticBlob, OperationResult, SourceBlob};
use super::error::StatusCode;
use super::flags;
use super::profile::{ProfileStage, TargetProfile};

/// Validated shader stage ready for pipeline creation.
#[derive(Debug)]
pub struct CompiledShader {
    pub module: naga::Module,
    pub info: ModuleInfo,
    pub entry_point: String,
    pub stage: naga::ShaderStage,
    pub label: String,
    /// Source text retained for graphics debuggers (`/Zi`).
    pub debug_source: Option<String>,
}

/// WGSL compiler backend built on naga's front-end and validator.
///
/// Accepts the argument vocabulary produced by the flag table. Optimization,
/// packing and flow-control hints have no naga equivalent and are recorded
/// only in the debug log.
pub struct NagaBackend {
    vocabulary: HashSet<&'static str>,
}

impl NagaBackend {
    pub fn new() -> Self {
        Self {
            vocabulary: flags::argument_vocabulary().collect(),
        }
    }

    fn fail(message: impl Into<String>) -> OperationResult<CompiledShader> {
        OperationResult::failure(StatusCode::E_FAIL, Some(DiagnosticBlob::utf8(message)))
    }
}

impl Default for NagaBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn naga_stage(stage: ProfileStage) -> Option<naga::ShaderStage> {
    match stage {
        ProfileStage::Vertex => Some(naga::ShaderStage::Vertex),
        ProfileStage::Pixel => Some(naga::ShaderStage::Fragment),
        ProfileStage::Compute => Some(naga::ShaderStage::Compute),
        _ => None,
    }
}

impl CompilerBackend for NagaBackend {
    type Binary = CompiledShader;

    fn compile(
        &self,
        source: &SourceBlob,
        source_name: &str,
        entry_point: &str,
        profile: &str,
        arguments: &[&str],
    ) -> Result<OperationResult<CompiledShader>, StatusCode> {
        if let Some(unknown) = arguments.iter().find(|a| !self.vocabulary.contains(*a)) {
            return Ok(Self::fail(format!("error: unknown argument '{unknown}'")));
        }
        let debug = arguments.contains(&"/Zi");
        log::debug!("naga backend arguments for {source_name}: {arguments:?}");

        let Ok(profile) = profile.parse::<TargetProfile>() else {
            return Err(StatusCode::E_INVALIDARG);
        };
        let Some(stage) = naga_stage(profile.stage) else {
            return Ok(Self::fail(format!(
                "error: target profile '{profile}' has no WGSL stage"
            )));
        };

        let Some(text) = source.as_str() else {
            return Ok(Self::fail(format!("{source_name}: source is not valid UTF-8")));
        };

        let module = match naga::front::wgsl::parse_str(text) {
            Ok(module) => module,
            Err(e) => return Ok(Self::fail(e.emit_to_string_with_path(text, source_name))),
        };

        let info = match Validator::new(ValidationFlags::all(), Capabilities::all()).validate(&module) {
            Ok(info) => info,
            Err(e) => return Ok(Self::fail(e.emit_to_string_with_path(text, source_name))),
        };

        let found = module
            .entry_points
            .iter()
            .any(|ep| ep.name == entry_point && ep.stage == stage);
        if !found {
            return Ok(Self::fail(format!(
                "{source_name}: missing {stage:?} entry point '{entry_point}'"
            )));
        }

        Ok(OperationResult::success(CompiledShader {
            module,
            info,
            entry_point: entry_point.to_string(),
            stage,
            label: format!("{source_name}:{entry_point}"),
            debug_source: debug.then(|| text.to_string()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::TextEncoding;

    const TRIANGLE: &str = r#"
struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec4<f32>) -> VsOut {
    var out: VsOut;
    out.position = vec4<f32>(position, 1.0);
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

    fn blob(text: &str) -> SourceBlob {
        SourceBlob {
            bytes: text.as_bytes().to_vec(),
            encoding: Some(TextEncoding::Utf8),
        }
    }

    #[test]
    fn compiles_vertex_and_pixel_entry_points() {
        let backend = NagaBackend::new();

        let vs = backend
            .compile(&blob(TRIANGLE), "shaders.wgsl", "vs_main", "vs_6_0", &[])
            .unwrap();
        assert!(vs.status.is_success());
        assert_eq!(vs.result.unwrap().stage, naga::ShaderStage::Vertex);

        let ps = backend
            .compile(&blob(TRIANGLE), "shaders.wgsl", "fs_main", "ps_6_0", &["/Zi", "-Qembed_debug"])
            .unwrap();
        let ps = ps.result.unwrap();
        assert_eq!(ps.stage, naga::ShaderStage::Fragment);
        assert!(ps.debug_source.is_some());
    }

    #[test]
    fn wrong_stage_for_entry_point_fails() {
        let out = NagaBackend::new()
            .compile(&blob(TRIANGLE), "shaders.wgsl", "vs_main", "ps_6_0", &[])
            .unwrap();
        assert!(!out.status.is_success());
        assert!(out.errors.is_some());
    }

    #[test]
    fn syntax_error_reports_utf8_diagnostic() {
        let out = NagaBackend::new()
            .compile(&blob("fn broken( {"), "bad.wgsl", "vs_main", "vs_6_0", &[])
            .unwrap();
        assert_eq!(out.status, StatusCode::E_FAIL);
        let errors = out.errors.unwrap();
        assert_eq!(errors.encoding, Some(TextEncoding::Utf8));
        assert!(!errors.bytes.is_empty());
    }

    #[test]
    fn unknown_argument_is_rejected() {
        let out = NagaBackend::new()
            .compile(&blob(TRIANGLE), "shaders.wgsl", "vs_main", "vs_6_0", &["/Gpp"])
            .unwrap();
        assert!(!out.status.is_success());
    }
}
