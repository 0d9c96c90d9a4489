//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, fixed-capacity buffer
//! management, and CPU-side shader program building.

/// Fixed-capacity GPU buffers with usage patterns and bounded writes.
pub mod buffer;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL compile/link checking and vertex attribute reflection.
pub mod shader;
