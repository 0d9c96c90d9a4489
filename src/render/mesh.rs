//! Triangle pass drawing the spinning flat-shaded mesh.
//!
//! One static vertex buffer holds every position followed by every normal;
//! the two regions are bound as separate vertex slots. The model transform
//! is the only per-frame upload.

use glam::{Mat4, Vec3};

use crate::error::DriftError;
use crate::geometry::Mesh;
use crate::gpu::buffer::{FixedBuffer, UsagePattern};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader::ShaderProgram;

/// Accumulates the mesh's spin and produces its model matrix.
///
/// The transform composes rotation then scale, so the scale acts in the
/// rotated frame's local space and the matrix never carries a translation.
#[derive(Debug, Clone)]
pub struct MeshSpin {
    axis: Vec3,
    step_deg: f32,
    scale: f32,
    angle_deg: f32,
}

impl MeshSpin {
    /// Spin about `axis` by `step_deg` degrees per frame, with a uniform
    /// `scale` applied in the rotated frame.
    #[must_use]
    pub fn new(axis: Vec3, step_deg: f32, scale: f32) -> Self {
        Self {
            axis,
            step_deg,
            scale,
            angle_deg: 0.0,
        }
    }

    /// Advance one frame and return the new model matrix.
    pub fn step(&mut self) -> Mat4 {
        self.angle_deg = (self.angle_deg + self.step_deg) % 360.0;
        self.matrix()
    }

    /// The model matrix at the current accumulated angle.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_axis_angle(
            self.axis.normalize_or_zero(),
            self.angle_deg.to_radians(),
        ) * Mat4::from_scale(Vec3::splat(self.scale))
    }

    /// Accumulated rotation in degrees, wrapped to [0, 360).
    #[must_use]
    pub fn angle_deg(&self) -> f32 {
        self.angle_deg
    }
}

/// GPU uniform buffer holding the mesh model matrix.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    /// Model (rotate then scale) matrix.
    pub model: [[f32; 4]; 4],
}

impl ModelUniform {
    /// Pack a matrix into the GPU layout (column-major).
    #[must_use]
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self {
            model: matrix.to_cols_array_2d(),
        }
    }
}

/// Pipeline, static geometry, and model uniform for the mesh.
pub struct MeshPass {
    pipeline: Option<wgpu::RenderPipeline>,
    vertex_buffer: FixedBuffer,
    normals_offset: u64,
    vertex_count: u32,
    model_buffer: FixedBuffer,
    model_bind_group: wgpu::BindGroup,
}

impl MeshPass {
    /// Upload the mesh once and build the pipeline.
    ///
    /// Positions land at the start of the vertex buffer with normals packed
    /// directly after them. A program that failed to link yields a pass
    /// without a pipeline; its draws are no-ops.
    pub fn new(
        context: &RenderContext,
        program: &ShaderProgram,
        camera_layout: &wgpu::BindGroupLayout,
        mesh: &Mesh,
    ) -> Result<Self, DriftError> {
        let mut vertex_data = mesh.position_data();
        vertex_data.extend(mesh.normal_data());
        let normals_offset =
            (mesh.vertex_count() * size_of::<[f32; 3]>()) as u64;

        let vertex_buffer = FixedBuffer::with_data(
            &context.device,
            "Mesh Vertex Buffer",
            UsagePattern::StaticVertex,
            &vertex_data,
        );

        let model_buffer = FixedBuffer::with_data(
            &context.device,
            "Mesh Model Buffer",
            UsagePattern::Uniform,
            &[ModelUniform::from_matrix(Mat4::IDENTITY)],
        );

        let model_layout = context.device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                label: Some("Mesh Model Bind Group Layout"),
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

        let model_bind_group =
            context
                .device
                .create_bind_group(&wgpu::BindGroupDescriptor {
                    layout: &model_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: model_buffer.buffer().as_entire_binding(),
                    }],
                    label: Some("Mesh Model Bind Group"),
                });

        let pipeline =
            build_pipeline(context, program, camera_layout, &model_layout)?;

        Ok(Self {
            pipeline,
            vertex_buffer,
            normals_offset,
            vertex_count: mesh.vertex_count() as u32,
            model_buffer,
            model_bind_group,
        })
    }

    /// Upload a new model transform for the next draw.
    pub fn set_transform(
        &self,
        queue: &wgpu::Queue,
        transform: Mat4,
    ) -> Result<(), DriftError> {
        self.model_buffer.write_region(
            queue,
            0,
            &[ModelUniform::from_matrix(transform)],
        )
    }

    /// Record the triangle draw, binding the position and normal regions as
    /// separate vertex slots. No-op for an empty mesh or a failed program.
    pub fn draw<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        camera_bind_group: &'a wgpu::BindGroup,
    ) {
        let Some(pipeline) = &self.pipeline else {
            return;
        };
        if self.vertex_count == 0 {
            return;
        }
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, camera_bind_group, &[]);
        render_pass.set_bind_group(1, &self.model_bind_group, &[]);
        render_pass.set_vertex_buffer(
            0,
            self.vertex_buffer.buffer().slice(..self.normals_offset),
        );
        render_pass.set_vertex_buffer(
            1,
            self.vertex_buffer.buffer().slice(self.normals_offset..),
        );
        render_pass.draw(0..self.vertex_count, 0..1);
    }

    /// Number of mesh vertices drawn per frame.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// True when the shader program linked and draws will execute.
    pub fn is_active(&self) -> bool {
        self.pipeline.is_some()
    }
}

fn build_pipeline(
    context: &RenderContext,
    program: &ShaderProgram,
    camera_layout: &wgpu::BindGroupLayout,
    model_layout: &wgpu::BindGroupLayout,
) -> Result<Option<wgpu::RenderPipeline>, DriftError> {
    let Some((vs_module, fs_module)) = program.create_modules(&context.device)
    else {
        return Ok(None);
    };

    let position_attributes = [wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        shader_location: program.attribute_location("position")?,
    }];
    let normal_attributes = [wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        shader_location: program.attribute_location("normal")?,
    }];
    let stride = size_of::<[f32; 3]>() as wgpu::BufferAddress;
    let vertex_layouts = [
        wgpu::VertexBufferLayout {
            array_stride: stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &position_attributes,
        },
        wgpu::VertexBufferLayout {
            array_stride: stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &normal_attributes,
        },
    ];

    let pipeline_layout = context.device.create_pipeline_layout(
        &wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[camera_layout, model_layout],
            push_constant_ranges: &[],
        },
    );

    let pipeline = context.device.create_render_pipeline(
        &wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vs_module,
                entry_point: Some(program.vertex_entry()),
                buffers: &vertex_layouts,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fs_module,
                entry_point: Some(program.fragment_entry()),
                targets: &[Some(wgpu::ColorTargetState {
                    format: context.format(),
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        },
    );
    Ok(Some(pipeline))
}
