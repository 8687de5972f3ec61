//! Shader compilation.
//!
//! Accepts legacy flag-based compile requests and drives an argument-based
//! compiler backend:
//! - unsupported request parameters are rejected before any file is read
//! - legacy flags map to backend tokens through a static ordered table
//! - target profiles below shader model 6 are upgraded in place
//! - backend diagnostics are decoded best-effort, keeping the status code

mod compiler;
mod error;
mod flags;
mod naga_backend;
mod profile;

pub use compiler::{
    decode_diagnostic, CompileRequest, CompilerBackend, DiagnosticBlob, IncludeHandler,
    OperationResult, ShaderCompiler, ShaderMacro, SourceBlob, TextEncoding,
    UNKNOWN_COMPILATION_ERROR,
};
pub use error::{CompileError, StatusCode, UnsupportedParameter};
pub use flags::{to_arguments, CompileFlags, FlagArgument, FLAG_ARGUMENTS};
pub use naga_backend::{CompiledShader, NagaBackend};
pub use profile::{
    upgrade_in_place, ParseProfileError, ProfileStage, TargetProfile, MIN_SHADER_MODEL_MAJOR,
};
