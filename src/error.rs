//! Comprehensive error handling for the voxel rendering engine core
//!
//! This module provides a unified error type so GPU/descriptor/lighting/mesh
//! failures never need an `unwrap()` in library code.

use std::error::Error as StdError;
use std::fmt;
use std::sync::{MutexGuard, PoisonError, RwLockReadGuard, RwLockWriteGuard};

use crate::gpu::descriptor_heap::HeapType;

/// Main error type for the engine core
#[derive(Debug)]
pub enum EngineError {
    // Descriptor heap / bindless resource errors
    HeapExhausted {
        heap_type: HeapType,
        capacity: u32,
    },
    InsufficientSpace {
        heap_type: HeapType,
        requested: u32,
        available: u32,
    },
    InvalidAllocation {
        heap_type: HeapType,
        index: u32,
    },
    InvalidHandle {
        heap_type: HeapType,
        index: u32,
    },
    ResourceAlreadyRegistered,
    BindlessCapacityExceeded {
        max_capacity: u32,
    },

    // World / chunk errors
    ChunkNotLoaded {
        pos: (i32, i32, i32),
    },
    InvalidBlockIterator {
        reason: String,
    },
    LightPropagationError {
        reason: String,
    },
    MeshBuildAborted {
        chunk_pos: (i32, i32, i32),
    },

    // Shadow render target errors (spec: out-of-range / use-before-create are fatal)
    ShadowTargetOutOfRange {
        index: usize,
        capacity: usize,
    },
    ShadowTargetNotCreated {
        index: usize,
    },

    // GPU backend errors (treated as fatal per the error handling design)
    DeviceNotFound,
    BufferCreationFailed {
        size: u64,
        usage: String,
    },
    GpuOperationFailed {
        operation: String,
        error: String,
    },

    // Threading errors
    LockPoisoned {
        resource: String,
    },
    ChannelClosed {
        name: String,
    },

    // Configuration errors
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },

    // System / IO errors
    IoError {
        path: String,
        error: String,
    },
    Utf8Error {
        context: String,
    },

    // Generic fallback for unexpected errors
    Internal {
        message: String,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::HeapExhausted { heap_type, capacity } => write!(
                f,
                "descriptor heap exhausted: {:?} heap at capacity {}",
                heap_type, capacity
            ),
            EngineError::InsufficientSpace {
                heap_type,
                requested,
                available,
            } => write!(
                f,
                "insufficient space in {:?} heap: requested {}, available {}",
                heap_type, requested, available
            ),
            EngineError::InvalidAllocation { heap_type, index } => write!(
                f,
                "invalid allocation in {:?} heap at index {}",
                heap_type, index
            ),
            EngineError::InvalidHandle { heap_type, index } => write!(
                f,
                "invalid descriptor handle: {:?} heap, index {}",
                heap_type, index
            ),
            EngineError::ResourceAlreadyRegistered => {
                write!(f, "resource is already registered with the bindless manager")
            }
            EngineError::BindlessCapacityExceeded { max_capacity } => write!(
                f,
                "bindless resource manager exceeded max capacity {}",
                max_capacity
            ),

            EngineError::ChunkNotLoaded { pos } => {
                write!(f, "chunk not loaded at position {:?}", pos)
            }
            EngineError::InvalidBlockIterator { reason } => {
                write!(f, "invalid block iterator: {}", reason)
            }
            EngineError::LightPropagationError { reason } => {
                write!(f, "light propagation error: {}", reason)
            }
            EngineError::MeshBuildAborted { chunk_pos } => {
                write!(f, "mesh build aborted for chunk {:?}", chunk_pos)
            }

            EngineError::ShadowTargetOutOfRange { index, capacity } => write!(
                f,
                "shadow render target index {} out of range for capacity {}",
                index, capacity
            ),
            EngineError::ShadowTargetNotCreated { index } => write!(
                f,
                "shadow render target {} accessed before GetOrCreate",
                index
            ),

            EngineError::DeviceNotFound => write!(f, "GPU device not found"),
            EngineError::BufferCreationFailed { size, usage } => {
                write!(f, "buffer creation failed: size={}, usage={}", size, usage)
            }
            EngineError::GpuOperationFailed { operation, error } => {
                write!(f, "GPU operation '{}' failed: {}", operation, error)
            }

            EngineError::LockPoisoned { resource } => {
                write!(f, "lock poisoned for resource: {}", resource)
            }
            EngineError::ChannelClosed { name } => write!(f, "channel closed: {}", name),

            EngineError::InvalidConfig {
                field,
                value,
                reason,
            } => write!(f, "invalid config: {} = {} ({})", field, value, reason),

            EngineError::IoError { path, error } => write!(f, "IO error for {}: {}", path, error),
            EngineError::Utf8Error { context } => write!(f, "UTF-8 error in {}", context),

            EngineError::Internal { message } => write!(f, "internal error: {}", message),
        }
    }
}

impl StdError for EngineError {}

/// Type alias for Results in this engine
pub type EngineResult<T> = Result<T, EngineError>;

impl From<std::io::Error> for EngineError {
    fn from(error: std::io::Error) -> Self {
        EngineError::IoError {
            path: String::new(),
            error: error.to_string(),
        }
    }
}

impl From<std::str::Utf8Error> for EngineError {
    fn from(_: std::str::Utf8Error) -> Self {
        EngineError::Utf8Error {
            context: "unknown".to_string(),
        }
    }
}

impl<T> From<PoisonError<MutexGuard<'_, T>>> for EngineError {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        EngineError::LockPoisoned {
            resource: "mutex".to_string(),
        }
    }
}

impl<T> From<PoisonError<RwLockReadGuard<'_, T>>> for EngineError {
    fn from(_: PoisonError<RwLockReadGuard<'_, T>>) -> Self {
        EngineError::LockPoisoned {
            resource: "rwlock_read".to_string(),
        }
    }
}

impl<T> From<PoisonError<RwLockWriteGuard<'_, T>>> for EngineError {
    fn from(_: PoisonError<RwLockWriteGuard<'_, T>>) -> Self {
        EngineError::LockPoisoned {
            resource: "rwlock_write".to_string(),
        }
    }
}

impl<T> From<std::sync::mpsc::SendError<T>> for EngineError {
    fn from(_: std::sync::mpsc::SendError<T>) -> Self {
        EngineError::ChannelClosed {
            name: "mpsc".to_string(),
        }
    }
}

impl From<std::sync::mpsc::RecvError> for EngineError {
    fn from(_: std::sync::mpsc::RecvError) -> Self {
        EngineError::ChannelClosed {
            name: "mpsc".to_string(),
        }
    }
}

impl<T> From<crossbeam_channel::SendError<T>> for EngineError {
    fn from(_: crossbeam_channel::SendError<T>) -> Self {
        EngineError::ChannelClosed {
            name: "crossbeam".to_string(),
        }
    }
}

impl From<crossbeam_channel::RecvError> for EngineError {
    fn from(_: crossbeam_channel::RecvError) -> Self {
        EngineError::ChannelClosed {
            name: "crossbeam".to_string(),
        }
    }
}

/// Convert Option to Result with context
pub trait OptionExt<T> {
    fn ok_or_engine<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> EngineError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_engine<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> EngineError,
    {
        self.ok_or_else(f)
    }
}

/// Extension trait for adding context to errors
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> EngineResult<T>;
    fn with_context<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: Into<EngineError>,
{
    fn context(self, msg: &str) -> EngineResult<T> {
        self.map_err(|_| EngineError::Internal {
            message: msg.to_string(),
        })
    }

    fn with_context<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|_| EngineError::Internal { message: f() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::HeapExhausted {
            heap_type: HeapType::CbvSrvUav,
            capacity: 1000,
        };
        assert_eq!(
            err.to_string(),
            "descriptor heap exhausted: CbvSrvUav heap at capacity 1000"
        );
    }

    #[test]
    fn test_option_ext() {
        let opt: Option<i32> = None;
        let result = opt.ok_or_engine(|| EngineError::Internal {
            message: "test".to_string(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_error_context() {
        let result: Result<i32, std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        let with_context = result.context("loading config");
        assert!(with_context.is_err());
    }
}
