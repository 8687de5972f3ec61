use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::profile::ParseProfileError;

/// Status code reported by a compiler backend.
///
/// Negative values are failures, mirroring COM-style result codes.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct StatusCode(pub i32);

impl StatusCode {
    pub const OK: Self = Self(0);
    pub const E_FAIL: Self = Self(0x8000_4005_u32 as i32);
    pub const E_INVALIDARG: Self = Self(0x8007_0057_u32 as i32);

    pub fn is_success(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Debug for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatusCode({self})")
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0 as u32)
    }
}

/// Compile-request parameters the adapter refuses to translate.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UnsupportedParameter {
    MacroDefinitions,
    IncludeHandler,
    ErrorBlobCapture,
    SecondaryFlags(u32),
}

impl fmt::Display for UnsupportedParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MacroDefinitions => f.write_str("macro definitions"),
            Self::IncludeHandler => f.write_str("custom include handler"),
            Self::ErrorBlobCapture => f.write_str("error blob capture"),
            Self::SecondaryFlags(bits) => write!(f, "secondary flags {bits:#x}"),
        }
    }
}

/// Shader compilation failure.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The request uses a parameter the adapter does not support.
    #[error("unsupported configuration: {0}")]
    Unsupported(UnsupportedParameter),

    #[error(transparent)]
    InvalidProfile(#[from] ParseProfileError),

    #[error("failed to load shader source {}", path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backend could not run the compilation at all.
    #[error("shader backend invocation failed ({status})")]
    Backend { status: StatusCode },

    /// The backend ran and reported a failing status.
    #[error("shader compilation failed ({status}): {message}")]
    Compilation { status: StatusCode, message: String },
}

impl CompileError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Backend { status } | Self::Compilation { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}
