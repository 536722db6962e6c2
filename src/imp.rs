// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
The seam between the renderer and whatever GPU API actually does the work.

The renderer only ever talks to a [Backend] (resource creation/destruction and queue writes)
and a [RenderPassEncoder] (the command recording surface).  Two backends ship with the crate:

* `wgpu` (feature `backend_wgpu`, on by default), over a `wgpu::Device`/`wgpu::Queue` pair.
* [recording], which hands out numbered handles and logs every call.  It backs the tests and
  is useful for hosts that want to inspect a frame without a GPU.
*/
use std::fmt::Debug;
use std::hash::Hash;

mod error;
pub mod recording;
#[cfg(feature = "backend_wgpu")]
pub mod wgpu;

pub use error::Error;

bitflags::bitflags! {
    /// How a buffer will be used.  Mirrors the subset of WebGPU usages the renderer needs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsages: u32 {
        const COPY_DST = 1 << 0;
        const VERTEX = 1 << 1;
        const INDEX = 1 << 2;
        const UNIFORM = 1 << 3;
    }
}

bitflags::bitflags! {
    /// How a texture will be used.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsages: u32 {
        const COPY_DST = 1 << 0;
        const TEXTURE_BINDING = 1 << 1;
        const RENDER_ATTACHMENT = 1 << 2;
    }
}

/// Backend-neutral texture formats.  All of them are 4 bytes per texel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TextureFormat {
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    Bgra8UnormSrgb,
}

impl TextureFormat {
    pub const fn bytes_per_texel(self) -> u32 {
        4
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    Uint16,
    Uint32,
}

impl IndexFormat {
    pub const fn byte_size(self) -> usize {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

/// Shader stage a binding is visible to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Vertex,
    Fragment,
}

/// The kinds of bindings the renderer declares in its bind group layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    UniformBuffer,
    FilteringSampler,
    /// 2-D, float, filterable, not multisampled.
    Texture2D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutEntry {
    pub binding: u32,
    pub stage: Stage,
    pub kind: BindingKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDescriptor<'a> {
    pub label: &'a str,
    pub size: u64,
    pub usage: BufferUsages,
    pub mapped_at_creation: bool,
}

/// Always 2-D.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDescriptor<'a> {
    pub label: &'a str,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub usage: TextureUsages,
    pub mip_level_count: u32,
    pub sample_count: u32,
}

/// Layout of the bytes handed to [Backend::write_texture].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TexelLayout {
    pub bytes_per_row: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    Float32x2,
    Unorm8x4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub format: VertexFormat,
    pub offset: u64,
    pub location: u32,
}

/// Blending for the single color target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Blend {
    /// `src * src_alpha + dst * (1 - src_alpha)`; alpha accumulates `src + dst * (1 - src_alpha)`.
    AlphaBlending,
    Replace,
}

pub struct PipelineDescriptor<'a, B: Backend + ?Sized> {
    pub label: &'a str,
    pub layout: &'a B::PipelineLayout,
    pub module: &'a B::ShaderModule,
    pub vertex_entry: &'a str,
    pub fragment_entry: &'a str,
    pub vertex_stride: u64,
    pub attributes: &'a [VertexAttribute],
    pub target_format: TextureFormat,
    pub blend: Blend,
}

pub enum BindingResource<'a, B: Backend + ?Sized> {
    Buffer(&'a B::Buffer),
    Sampler(&'a B::Sampler),
    TextureView(&'a B::TextureView),
}

pub struct BindGroupEntry<'a, B: Backend + ?Sized> {
    pub binding: u32,
    pub resource: BindingResource<'a, B>,
}

/**
Capability interface over a WebGPU-family device and queue.

Creation methods return [Error] when the backend hands back nothing usable.  Release methods
take the handle by value; callers release each handle exactly once.

Texture and view handles are compared and hashed by identity so the texture registry can key
its caches on them.
*/
pub trait Backend {
    type Buffer: Debug;
    type Texture: Debug + Clone + Eq + Hash;
    type TextureView: Debug + Clone + Eq + Hash;
    type Sampler: Debug;
    type ShaderModule: Debug;
    type BindGroupLayout: Debug;
    type PipelineLayout: Debug;
    type RenderPipeline: Debug;
    type BindGroup: Debug;

    fn create_buffer(&self, descriptor: &BufferDescriptor<'_>) -> Result<Self::Buffer, Error>;
    fn destroy_buffer(&self, buffer: Self::Buffer);
    /// Queues a write of `data` at `offset`.  `data.len()` must be a multiple of 4.
    fn write_buffer(&self, buffer: &Self::Buffer, offset: u64, data: &[u8]);

    fn create_texture(&self, descriptor: &TextureDescriptor<'_>) -> Result<Self::Texture, Error>;
    fn destroy_texture(&self, texture: Self::Texture);
    fn write_texture(&self, texture: &Self::Texture, data: &[u8], layout: TexelLayout);
    /// Creates a default (full, single-mip) view.
    fn create_view(&self, texture: &Self::Texture, label: &str) -> Result<Self::TextureView, Error>;
    fn release_view(&self, view: Self::TextureView);

    /// Linear min/mag filtering, clamp-to-edge addressing.
    fn create_sampler(&self, label: &str) -> Result<Self::Sampler, Error>;
    fn release_sampler(&self, sampler: Self::Sampler);

    fn create_shader_module(&self, label: &str, wgsl: &str) -> Result<Self::ShaderModule, Error>;
    fn release_shader_module(&self, module: Self::ShaderModule);

    fn create_bind_group_layout(
        &self,
        label: &str,
        entries: &[LayoutEntry],
    ) -> Result<Self::BindGroupLayout, Error>;
    fn release_bind_group_layout(&self, layout: Self::BindGroupLayout);

    fn create_pipeline_layout(
        &self,
        label: &str,
        bind_group_layouts: &[&Self::BindGroupLayout],
    ) -> Result<Self::PipelineLayout, Error>;
    fn release_pipeline_layout(&self, layout: Self::PipelineLayout);

    fn create_render_pipeline(
        &self,
        descriptor: &PipelineDescriptor<'_, Self>,
    ) -> Result<Self::RenderPipeline, Error>;
    fn release_render_pipeline(&self, pipeline: Self::RenderPipeline);

    fn create_bind_group(
        &self,
        label: &str,
        layout: &Self::BindGroupLayout,
        entries: &[BindGroupEntry<'_, Self>],
    ) -> Result<Self::BindGroup, Error>;
    fn release_bind_group(&self, bind_group: Self::BindGroup);
}

/// The command recording surface of a render pass.
pub trait RenderPassEncoder<B: Backend> {
    fn set_pipeline(&mut self, pipeline: &B::RenderPipeline);
    /// Binds the first `size` bytes of `buffer`.
    fn set_vertex_buffer(&mut self, slot: u32, buffer: &B::Buffer, size: u64);
    /// Binds the first `size` bytes of `buffer`.
    fn set_index_buffer(&mut self, buffer: &B::Buffer, format: IndexFormat, size: u64);
    fn set_bind_group(&mut self, index: u32, bind_group: &B::BindGroup);
    fn set_scissor_rect(&mut self, x: u32, y: u32, width: u32, height: u32);
    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        base_vertex: i32,
        first_instance: u32,
    );
}
