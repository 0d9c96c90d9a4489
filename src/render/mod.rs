//! Render passes and shared GPU bindings.
//!
//! Both passes read the same camera uniform at bind group 0; the mesh pass
//! adds its model transform at group 1. Passes whose shader program failed
//! to link are created anyway and simply skip their draw calls, so one bad
//! shader never takes the whole viewer down.

/// Rotating flat-shaded mesh pass.
pub mod mesh;
/// Jittering point-cloud pass.
pub mod particles;

use crate::camera::{Camera, CameraUniform};
use crate::error::DriftError;
use crate::gpu::buffer::{FixedBuffer, UsagePattern};
use crate::gpu::render_context::RenderContext;

/// The view-projection uniform shared by every pipeline.
pub struct CameraBinding {
    uniform: CameraUniform,
    buffer: FixedBuffer,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl CameraBinding {
    /// Upload the camera's current matrix and build the shared bind group.
    pub fn new(context: &RenderContext, camera: &Camera) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(camera);

        let buffer = FixedBuffer::with_data(
            &context.device,
            "Camera Buffer",
            UsagePattern::Uniform,
            &[uniform],
        );

        let layout = context.device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            },
        );

        let bind_group =
            context
                .device
                .create_bind_group(&wgpu::BindGroupDescriptor {
                    layout: &layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.buffer().as_entire_binding(),
                    }],
                    label: Some("Camera Bind Group"),
                });

        Self {
            uniform,
            buffer,
            layout,
            bind_group,
        }
    }

    /// Refresh the GPU copy after a camera change (window resize).
    pub fn update(
        &mut self,
        queue: &wgpu::Queue,
        camera: &Camera,
    ) -> Result<(), DriftError> {
        self.uniform.update_view_proj(camera);
        self.buffer.write_region(queue, 0, &[self.uniform])
    }

    /// Layout every pipeline includes at group 0.
    #[must_use]
    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Bind group set once per pass before either draw.
    #[must_use]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
