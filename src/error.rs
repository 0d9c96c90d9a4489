//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;

/// Errors produced by the driftview crate.
#[derive(Debug)]
pub enum DriftError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// Failed to load or parse a mesh file.
    MeshLoad(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML config parsing/serialization failure.
    ConfigParse(String),
    /// A vertex attribute name could not be resolved against a program.
    UnknownAttribute {
        /// The attribute name that was looked up.
        name: String,
        /// Label of the program the lookup ran against.
        program: String,
    },
    /// A buffer update exceeded the capacity fixed at creation time.
    BufferOverrun {
        /// Label of the offending buffer.
        label: String,
        /// End of the requested write range in bytes.
        needed: u64,
        /// Capacity fixed at creation in bytes.
        capacity: u64,
    },
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for DriftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::MeshLoad(msg) => write!(f, "mesh load error: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ConfigParse(msg) => {
                write!(f, "config parse error: {msg}")
            }
            Self::UnknownAttribute { name, program } => {
                write!(f, "attribute `{name}` not found in program `{program}`")
            }
            Self::BufferOverrun {
                label,
                needed,
                capacity,
            } => {
                write!(
                    f,
                    "write of {needed} bytes exceeds capacity {capacity} of buffer `{label}`"
                )
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for DriftError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for DriftError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for DriftError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
