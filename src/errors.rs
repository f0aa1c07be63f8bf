//! Error Types
//!
//! This module defines the error types used throughout the harness.
//!
//! # Overview
//!
//! The main error type [`RenderError`] covers all failure modes including:
//! - GPU initialization failures
//! - Shader compilation and program linking errors
//! - Texture decoding and I/O errors
//!
//! Two conditions are deliberately *not* errors: a missing asset file resolves
//! to a documented fallback (embedded shader source, procedural texture) and is
//! reported through the log, and a uniform name the active program does not
//! declare makes the corresponding setter a silent no-op.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, RenderError>`.
//!
//! ```rust,ignore
//! use ixion::errors::{RenderError, Result};
//!
//! fn load_scene() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::device::ShaderStage;

/// The main error type for the rendering harness.
///
/// This enum covers all possible error conditions that can occur
/// while bringing a scene up or tearing it down. Each variant provides
/// specific context about what went wrong.
#[derive(Error, Debug)]
pub enum RenderError {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// The window surface could not be created or configured.
    #[error("Surface error: {0}")]
    SurfaceCreateFailed(String),

    /// Window system error.
    #[error("Window system error: {0}")]
    WindowError(#[from] raw_window_handle::HandleError),

    /// Event loop error (winit).
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    // ========================================================================
    // Shader Errors
    // ========================================================================
    /// A shader stage failed to compile. Fatal to program construction.
    #[error("{stage} shader failed to compile:\n{log}")]
    ShaderCompile {
        /// Which stage rejected its source.
        stage: ShaderStage,
        /// The backend's diagnostic log, verbatim.
        log: String,
    },

    /// Compiled stages failed to link into a program.
    #[error("shader program failed to link:\n{log}")]
    ShaderLink {
        /// The backend's diagnostic log, verbatim.
        log: String,
    },

    // ========================================================================
    // Image & Texture Errors
    // ========================================================================
    /// Image decoding error. The file existed but its contents are unusable,
    /// so there is no fallback.
    #[error("Image decode error: {0}")]
    ImageDecodeError(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error on a file that exists. A file that is simply absent is
    /// not an error; callers fall back and log instead.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        RenderError::ImageDecodeError(err.to_string())
    }
}

/// Alias for `Result<T, RenderError>`.
pub type Result<T> = std::result::Result<T, RenderError>;
