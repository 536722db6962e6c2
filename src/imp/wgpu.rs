// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
[Backend] over a wgpu device and queue.

wgpu reports most failures through the device's error callback rather than at the call site,
so creation here only rejects what we can see up front: zero sizes and sizes beyond the
device limits.
*/
use crate::imp::{
    Backend, BindGroupEntry, BindingKind, BindingResource, Blend, BufferDescriptor, BufferUsages,
    Error, IndexFormat, LayoutEntry, PipelineDescriptor, RenderPassEncoder, Stage, TexelLayout,
    TextureDescriptor, TextureFormat, TextureUsages, VertexFormat,
};
use std::borrow::Cow;

impl TextureFormat {
    pub const fn wgpu_format(self) -> wgpu::TextureFormat {
        match self {
            TextureFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
            TextureFormat::Rgba8UnormSrgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            TextureFormat::Bgra8Unorm => wgpu::TextureFormat::Bgra8Unorm,
            TextureFormat::Bgra8UnormSrgb => wgpu::TextureFormat::Bgra8UnormSrgb,
        }
    }
}

impl BufferUsages {
    pub fn wgpu_usage(self) -> wgpu::BufferUsages {
        let mut usage = wgpu::BufferUsages::empty();
        if self.contains(BufferUsages::COPY_DST) {
            usage |= wgpu::BufferUsages::COPY_DST;
        }
        if self.contains(BufferUsages::VERTEX) {
            usage |= wgpu::BufferUsages::VERTEX;
        }
        if self.contains(BufferUsages::INDEX) {
            usage |= wgpu::BufferUsages::INDEX;
        }
        if self.contains(BufferUsages::UNIFORM) {
            usage |= wgpu::BufferUsages::UNIFORM;
        }
        usage
    }
}

impl TextureUsages {
    pub fn wgpu_usage(self) -> wgpu::TextureUsages {
        let mut usage = wgpu::TextureUsages::empty();
        if self.contains(TextureUsages::COPY_DST) {
            usage |= wgpu::TextureUsages::COPY_DST;
        }
        if self.contains(TextureUsages::TEXTURE_BINDING) {
            usage |= wgpu::TextureUsages::TEXTURE_BINDING;
        }
        if self.contains(TextureUsages::RENDER_ATTACHMENT) {
            usage |= wgpu::TextureUsages::RENDER_ATTACHMENT;
        }
        usage
    }
}

impl IndexFormat {
    const fn wgpu_format(self) -> wgpu::IndexFormat {
        match self {
            IndexFormat::Uint16 => wgpu::IndexFormat::Uint16,
            IndexFormat::Uint32 => wgpu::IndexFormat::Uint32,
        }
    }
}

impl Stage {
    const fn wgpu_stages(self) -> wgpu::ShaderStages {
        match self {
            Stage::Vertex => wgpu::ShaderStages::VERTEX,
            Stage::Fragment => wgpu::ShaderStages::FRAGMENT,
        }
    }
}

impl BindingKind {
    const fn wgpu_binding_type(self) -> wgpu::BindingType {
        match self {
            BindingKind::UniformBuffer => wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            BindingKind::FilteringSampler => {
                wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
            }
            BindingKind::Texture2D => wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
        }
    }
}

impl VertexFormat {
    const fn wgpu_format(self) -> wgpu::VertexFormat {
        match self {
            VertexFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
            VertexFormat::Unorm8x4 => wgpu::VertexFormat::Unorm8x4,
        }
    }
}

impl Blend {
    const fn wgpu_blend(self) -> Option<wgpu::BlendState> {
        match self {
            Blend::AlphaBlending => Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                    operation: wgpu::BlendOperation::Add,
                },
            }),
            Blend::Replace => Some(wgpu::BlendState::REPLACE),
        }
    }
}

/// A wgpu device and its queue.  Both are cheap to clone.
#[derive(Debug, Clone)]
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl WgpuBackend {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self { device, queue }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

impl Backend for WgpuBackend {
    type Buffer = wgpu::Buffer;
    type Texture = wgpu::Texture;
    type TextureView = wgpu::TextureView;
    type Sampler = wgpu::Sampler;
    type ShaderModule = wgpu::ShaderModule;
    type BindGroupLayout = wgpu::BindGroupLayout;
    type PipelineLayout = wgpu::PipelineLayout;
    type RenderPipeline = wgpu::RenderPipeline;
    type BindGroup = wgpu::BindGroup;

    fn create_buffer(&self, descriptor: &BufferDescriptor<'_>) -> Result<wgpu::Buffer, Error> {
        let max = self.device.limits().max_buffer_size;
        if descriptor.size == 0 || descriptor.size > max {
            return Err(Error::creation_failed(
                descriptor.label,
                format!("buffer size {} outside 1..={}", descriptor.size, max),
            ));
        }
        Ok(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(descriptor.label),
            size: descriptor.size,
            usage: descriptor.usage.wgpu_usage(),
            mapped_at_creation: descriptor.mapped_at_creation,
        }))
    }

    fn destroy_buffer(&self, buffer: wgpu::Buffer) {
        buffer.destroy();
    }

    fn write_buffer(&self, buffer: &wgpu::Buffer, offset: u64, data: &[u8]) {
        self.queue.write_buffer(buffer, offset, data);
    }

    fn create_texture(&self, descriptor: &TextureDescriptor<'_>) -> Result<wgpu::Texture, Error> {
        let max = self.device.limits().max_texture_dimension_2d;
        if descriptor.width == 0
            || descriptor.height == 0
            || descriptor.width > max
            || descriptor.height > max
        {
            return Err(Error::creation_failed(
                descriptor.label,
                format!(
                    "texture size {}x{} outside 1..={}",
                    descriptor.width, descriptor.height, max
                ),
            ));
        }
        Ok(self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(descriptor.label),
            size: wgpu::Extent3d {
                width: descriptor.width,
                height: descriptor.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: descriptor.mip_level_count,
            sample_count: descriptor.sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: descriptor.format.wgpu_format(),
            usage: descriptor.usage.wgpu_usage(),
            view_formats: &[],
        }))
    }

    fn destroy_texture(&self, texture: wgpu::Texture) {
        texture.destroy();
    }

    fn write_texture(&self, texture: &wgpu::Texture, data: &[u8], layout: TexelLayout) {
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(layout.bytes_per_row),
                rows_per_image: Some(layout.height),
            },
            wgpu::Extent3d {
                width: layout.width,
                height: layout.height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn create_view(&self, texture: &wgpu::Texture, label: &str) -> Result<wgpu::TextureView, Error> {
        Ok(texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            ..Default::default()
        }))
    }

    fn release_view(&self, view: wgpu::TextureView) {
        drop(view);
    }

    fn create_sampler(&self, label: &str) -> Result<wgpu::Sampler, Error> {
        Ok(self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        }))
    }

    fn release_sampler(&self, sampler: wgpu::Sampler) {
        drop(sampler);
    }

    fn create_shader_module(&self, label: &str, wgsl: &str) -> Result<wgpu::ShaderModule, Error> {
        if wgsl.trim().is_empty() {
            return Err(Error::creation_failed(label, "empty shader source"));
        }
        Ok(self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(wgsl)),
            }))
    }

    fn release_shader_module(&self, module: wgpu::ShaderModule) {
        drop(module);
    }

    fn create_bind_group_layout(
        &self,
        label: &str,
        entries: &[LayoutEntry],
    ) -> Result<wgpu::BindGroupLayout, Error> {
        let entries: Vec<wgpu::BindGroupLayoutEntry> = entries
            .iter()
            .map(|e| wgpu::BindGroupLayoutEntry {
                binding: e.binding,
                visibility: e.stage.wgpu_stages(),
                ty: e.kind.wgpu_binding_type(),
                count: None, //not array
            })
            .collect();
        Ok(self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries: &entries,
            }))
    }

    fn release_bind_group_layout(&self, layout: wgpu::BindGroupLayout) {
        drop(layout);
    }

    fn create_pipeline_layout(
        &self,
        label: &str,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
    ) -> Result<wgpu::PipelineLayout, Error> {
        Ok(self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts,
                push_constant_ranges: &[],
            }))
    }

    fn release_pipeline_layout(&self, layout: wgpu::PipelineLayout) {
        drop(layout);
    }

    fn create_render_pipeline(
        &self,
        descriptor: &PipelineDescriptor<'_, Self>,
    ) -> Result<wgpu::RenderPipeline, Error> {
        let attributes: Vec<wgpu::VertexAttribute> = descriptor
            .attributes
            .iter()
            .map(|a| wgpu::VertexAttribute {
                format: a.format.wgpu_format(),
                offset: a.offset,
                shader_location: a.location,
            })
            .collect();
        let vertex_buffers = [wgpu::VertexBufferLayout {
            array_stride: descriptor.vertex_stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes,
        }];
        let targets = [Some(wgpu::ColorTargetState {
            format: descriptor.target_format.wgpu_format(),
            blend: descriptor.blend.wgpu_blend(),
            write_mask: wgpu::ColorWrites::ALL,
        })];
        Ok(self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(descriptor.label),
                layout: Some(descriptor.layout),
                vertex: wgpu::VertexState {
                    module: descriptor.module,
                    entry_point: Some(descriptor.vertex_entry),
                    compilation_options: Default::default(),
                    buffers: &vertex_buffers,
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Cw,
                    cull_mode: None,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: descriptor.module,
                    entry_point: Some(descriptor.fragment_entry),
                    compilation_options: Default::default(),
                    targets: &targets,
                }),
                multiview: None,
                cache: None,
            }))
    }

    fn release_render_pipeline(&self, pipeline: wgpu::RenderPipeline) {
        drop(pipeline);
    }

    fn create_bind_group(
        &self,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        entries: &[BindGroupEntry<'_, Self>],
    ) -> Result<wgpu::BindGroup, Error> {
        let entries: Vec<wgpu::BindGroupEntry<'_>> = entries
            .iter()
            .map(|e| wgpu::BindGroupEntry {
                binding: e.binding,
                resource: match e.resource {
                    BindingResource::Buffer(buffer) => buffer.as_entire_binding(),
                    BindingResource::Sampler(sampler) => wgpu::BindingResource::Sampler(sampler),
                    BindingResource::TextureView(view) => {
                        wgpu::BindingResource::TextureView(view)
                    }
                },
            })
            .collect();
        Ok(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &entries,
        }))
    }

    fn release_bind_group(&self, bind_group: wgpu::BindGroup) {
        drop(bind_group);
    }
}

impl RenderPassEncoder<WgpuBackend> for wgpu::RenderPass<'_> {
    fn set_pipeline(&mut self, pipeline: &wgpu::RenderPipeline) {
        wgpu::RenderPass::set_pipeline(self, pipeline);
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &wgpu::Buffer, size: u64) {
        wgpu::RenderPass::set_vertex_buffer(self, slot, buffer.slice(0..size));
    }

    fn set_index_buffer(&mut self, buffer: &wgpu::Buffer, format: IndexFormat, size: u64) {
        wgpu::RenderPass::set_index_buffer(self, buffer.slice(0..size), format.wgpu_format());
    }

    fn set_bind_group(&mut self, index: u32, bind_group: &wgpu::BindGroup) {
        wgpu::RenderPass::set_bind_group(self, index, bind_group, &[]);
    }

    fn set_scissor_rect(&mut self, x: u32, y: u32, width: u32, height: u32) {
        wgpu::RenderPass::set_scissor_rect(self, x, y, width, height);
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        base_vertex: i32,
        first_instance: u32,
    ) {
        wgpu::RenderPass::draw_indexed(
            self,
            first_index..first_index + index_count,
            base_vertex,
            first_instance..first_instance + instance_count,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usages_convert() {
        assert_eq!(
            (BufferUsages::VERTEX | BufferUsages::COPY_DST).wgpu_usage(),
            wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST
        );
        assert_eq!(
            (BufferUsages::UNIFORM | BufferUsages::COPY_DST).wgpu_usage(),
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST
        );
        assert_eq!(
            TextureUsages::all().wgpu_usage(),
            wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::RENDER_ATTACHMENT
        );
    }

    #[test]
    fn vertex_formats_match_draw_vert() {
        assert_eq!(VertexFormat::Float32x2.wgpu_format().size(), 8);
        assert_eq!(VertexFormat::Unorm8x4.wgpu_format().size(), 4);
        assert_eq!(IndexFormat::Uint16.wgpu_format(), wgpu::IndexFormat::Uint16);
    }

    #[test]
    fn straight_alpha_blending() {
        let blend = Blend::AlphaBlending.wgpu_blend().unwrap();
        assert_eq!(blend.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(blend.alpha.src_factor, wgpu::BlendFactor::One);
        assert_eq!(Blend::Replace.wgpu_blend(), Some(wgpu::BlendState::REPLACE));
    }
}
