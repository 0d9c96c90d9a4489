//! Point-primitive pass drawing the jittering particle cloud.
//!
//! The vertex buffer mirrors [`Particle`] records byte for byte and is
//! overwritten in full every frame, since the simulator touches every
//! particle every frame.

use crate::error::DriftError;
use crate::gpu::buffer::{FixedBuffer, UsagePattern};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader::ShaderProgram;
use crate::particles::Particle;

/// Pipeline and stream buffer for the particle cloud.
pub struct ParticlePass {
    pipeline: Option<wgpu::RenderPipeline>,
    vertex_buffer: FixedBuffer,
    count: u32,
}

impl ParticlePass {
    /// Create the pass, sizing the stream buffer to the initial cloud.
    ///
    /// A program that failed to link yields a pass without a pipeline; its
    /// draws are no-ops. Attribute names that the linked program does not
    /// expose are a hard error.
    pub fn new(
        context: &RenderContext,
        program: &ShaderProgram,
        camera_layout: &wgpu::BindGroupLayout,
        particles: &[Particle],
    ) -> Result<Self, DriftError> {
        let vertex_buffer = FixedBuffer::with_data(
            &context.device,
            "Particle Vertex Buffer",
            UsagePattern::StreamVertex,
            particles,
        );
        let pipeline = build_pipeline(context, program, camera_layout)?;
        Ok(Self {
            pipeline,
            vertex_buffer,
            count: particles.len() as u32,
        })
    }

    /// Push the whole particle array into the stream buffer.
    ///
    /// # Errors
    ///
    /// Returns [`DriftError::BufferOverrun`] if the cloud outgrew the
    /// capacity fixed at creation; counts are fixed at startup so this
    /// signals a caller bug.
    pub fn upload(
        &self,
        queue: &wgpu::Queue,
        particles: &[Particle],
    ) -> Result<(), DriftError> {
        self.vertex_buffer.write_region(queue, 0, particles)
    }

    /// Record the point draw. Caller binds nothing beforehand; the pass
    /// sets its own pipeline, camera group, and vertex buffer.
    pub fn draw<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        camera_bind_group: &'a wgpu::BindGroup,
    ) {
        let Some(pipeline) = &self.pipeline else {
            return;
        };
        if self.count == 0 {
            return;
        }
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, camera_bind_group, &[]);
        render_pass
            .set_vertex_buffer(0, self.vertex_buffer.buffer().slice(..));
        render_pass.draw(0..self.count, 0..1);
    }

    /// Number of particles drawn per frame.
    pub fn count(&self) -> u32 {
        self.count
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
) -> Result<Option<wgpu::RenderPipeline>, DriftError> {
    let Some((vs_module, fs_module)) = program.create_modules(&context.device)
    else {
        return Ok(None);
    };

    let attributes = [
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: std::mem::offset_of!(Particle, position) as u64,
            shader_location: program.attribute_location("position")?,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: std::mem::offset_of!(Particle, color) as u64,
            shader_location: program.attribute_location("color")?,
        },
    ];
    let vertex_layout = wgpu::VertexBufferLayout {
        array_stride: size_of::<Particle>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &attributes,
    };

    let pipeline_layout = context.device.create_pipeline_layout(
        &wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Pipeline Layout"),
            bind_group_layouts: &[camera_layout],
            push_constant_ranges: &[],
        },
    );

    let pipeline = context.device.create_render_pipeline(
        &wgpu::RenderPipelineDescriptor {
            label: Some("Particle Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vs_module,
                entry_point: Some(program.vertex_entry()),
                buffers: &[vertex_layout],
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
                topology: wgpu::PrimitiveTopology::PointList,
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
