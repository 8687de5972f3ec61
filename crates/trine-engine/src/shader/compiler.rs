use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use super::error::{CompileError, StatusCode, UnsupportedParameter};
use super::flags::{self, CompileFlags};
use super::profile;

/// Message used whenever backend diagnostics cannot be decoded.
pub const UNKNOWN_COMPILATION_ERROR: &str = "Unknown shader compilation error";

/// A `NAME=VALUE` preprocessor definition.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ShaderMacro {
    pub name: String,
    pub definition: String,
}

/// Resolves `#include` directives for a compile request.
pub trait IncludeHandler {
    fn open(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Legacy-style compile request.
///
/// Only `source_path`, `entry_point`, `target_profile` and `flags` are
/// translated; the remaining fields exist so callers ported from the flag
/// interface get an explicit rejection rather than silent loss.
pub struct CompileRequest {
    pub source_path: PathBuf,
    pub entry_point: String,
    pub target_profile: String,
    pub flags: CompileFlags,
    pub secondary_flags: u32,
    pub defines: Option<Vec<ShaderMacro>>,
    pub include_handler: Option<Box<dyn IncludeHandler>>,
    pub capture_error_blob: bool,
}

impl CompileRequest {
    pub fn new(
        source_path: impl Into<PathBuf>,
        entry_point: impl Into<String>,
        target_profile: impl Into<String>,
        flags: CompileFlags,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            entry_point: entry_point.into(),
            target_profile: target_profile.into(),
            flags,
            secondary_flags: 0,
            defines: None,
            include_handler: None,
            capture_error_blob: false,
        }
    }

    fn check_supported(&self) -> Result<(), UnsupportedParameter> {
        if self.defines.is_some() {
            return Err(UnsupportedParameter::MacroDefinitions);
        }
        if self.include_handler.is_some() {
            return Err(UnsupportedParameter::IncludeHandler);
        }
        if self.capture_error_blob {
            return Err(UnsupportedParameter::ErrorBlobCapture);
        }
        if self.secondary_flags != 0 {
            return Err(UnsupportedParameter::SecondaryFlags(self.secondary_flags));
        }
        Ok(())
    }
}

impl fmt::Debug for CompileRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileRequest")
            .field("source_path", &self.source_path)
            .field("entry_point", &self.entry_point)
            .field("target_profile", &self.target_profile)
            .field("flags", &self.flags)
            .field("secondary_flags", &self.secondary_flags)
            .field("defines", &self.defines)
            .field("include_handler", &self.include_handler.is_some())
            .field("capture_error_blob", &self.capture_error_blob)
            .finish()
    }
}

/// Text encoding tag attached to a backend buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TextEncoding {
    Utf8,
    Utf16,
    /// A code page other than UTF-8/UTF-16.
    CodePage(u32),
}

/// Raw shader source as loaded by the backend.
#[derive(Debug, Clone)]
pub struct SourceBlob {
    pub bytes: Vec<u8>,
    pub encoding: Option<TextEncoding>,
}

impl SourceBlob {
    pub fn as_str(&self) -> Option<&str> {
        match self.encoding {
            Some(TextEncoding::Utf8) | None => std::str::from_utf8(&self.bytes).ok(),
            _ => None,
        }
    }
}

/// Diagnostic buffer returned by a failing compilation.
///
/// `encoding == None` means the backend could not tell.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticBlob {
    pub bytes: Vec<u8>,
    pub encoding: Option<TextEncoding>,
}

impl DiagnosticBlob {
    pub fn utf8(text: impl Into<String>) -> Self {
        let mut bytes = text.into().into_bytes();
        bytes.push(0);
        Self {
            bytes,
            encoding: Some(TextEncoding::Utf8),
        }
    }
}

/// Decodes a diagnostic buffer, falling back to [`UNKNOWN_COMPILATION_ERROR`].
pub fn decode_diagnostic(blob: Option<&DiagnosticBlob>) -> String {
    let Some(blob) = blob else {
        return UNKNOWN_COMPILATION_ERROR.to_string();
    };
    if blob.bytes.is_empty() || blob.encoding != Some(TextEncoding::Utf8) {
        return UNKNOWN_COMPILATION_ERROR.to_string();
    }

    let bytes = blob.bytes.strip_suffix(&[0]).unwrap_or(&blob.bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => UNKNOWN_COMPILATION_ERROR.to_string(),
    }
}

/// Outcome of a single backend compilation.
#[derive(Debug)]
pub struct OperationResult<T> {
    pub status: StatusCode,
    pub result: Option<T>,
    pub errors: Option<DiagnosticBlob>,
}

impl<T> OperationResult<T> {
    pub fn success(result: T) -> Self {
        Self {
            status: StatusCode::OK,
            result: Some(result),
            errors: None,
        }
    }

    pub fn failure(status: StatusCode, errors: Option<DiagnosticBlob>) -> Self {
        Self {
            status,
            result: None,
            errors,
        }
    }
}

/// Argument-driven shader compiler.
pub trait CompilerBackend {
    type Binary;

    /// Loads source text. The default reads the file as UTF-8.
    fn load_source(&self, path: &Path) -> io::Result<SourceBlob> {
        Ok(SourceBlob {
            bytes: std::fs::read(path)?,
            encoding: Some(TextEncoding::Utf8),
        })
    }

    /// Runs one compilation.
    ///
    /// `Err` means the backend could not be invoked; a compile error is an
    /// `Ok` result with a failing status.
    fn compile(
        &self,
        source: &SourceBlob,
        source_name: &str,
        entry_point: &str,
        profile: &str,
        arguments: &[&str],
    ) -> Result<OperationResult<Self::Binary>, StatusCode>;
}

/// Adapter from legacy compile requests to a [`CompilerBackend`].
///
/// Construct once and pass by reference to every compile call.
pub struct ShaderCompiler<B> {
    backend: B,
}

impl<B: CompilerBackend> ShaderCompiler<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn compile(&self, request: &CompileRequest) -> Result<B::Binary, CompileError> {
        request.check_supported().map_err(CompileError::Unsupported)?;

        let mut profile = request.target_profile.clone();
        profile::upgrade_in_place(&mut profile)?;

        let source = self
            .backend
            .load_source(&request.source_path)
            .map_err(|source| CompileError::Source {
                path: request.source_path.clone(),
                source,
            })?;

        let arguments = flags::to_arguments(request.flags);
        let source_name = request.source_path.to_string_lossy();

        log::debug!(
            "compiling {source_name}:{} for {profile} with {arguments:?}",
            request.entry_point
        );

        let outcome = self
            .backend
            .compile(
                &source,
                &source_name,
                &request.entry_point,
                &profile,
                &arguments,
            )
            .map_err(|status| CompileError::Backend { status })?;

        if outcome.status.is_success() {
            return outcome.result.ok_or(CompileError::Backend {
                status: StatusCode::E_FAIL,
            });
        }

        let message = decode_diagnostic(outcome.errors.as_ref());
        log::error!("{message}");
        Err(CompileError::Compilation {
            status: outcome.status,
            message,
        })
    }
}
