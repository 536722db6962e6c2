/*! gui_passes draws an immediate-mode UI (Dear ImGui and friends) into WebGPU-family render passes.

An immediate-mode UI library produces, once per frame, a list of vertex and index buffers plus a
sequence of draw commands with clip rectangles and texture ids.  gui_passes is the layer between
that output and the GPU:

| Piece                  | Lives in                  | Responsibility                                                         |
|------------------------|---------------------------|------------------------------------------------------------------------|
| Frame state            | [images::frame]           | Two-state machine deciding when to begin, finalize and draw UI frames  |
| GPU resource cache     | [images::ResourceCache]   | Geometry buffers that only grow, uniform, pipeline, font atlas texture |
| Texture registry       | [bindings::TextureRegistry] | Texture views ⇄ bind groups ⇄ [bindings::TextureId]s              |
| Draw list translator   | [images::DrawListTranslator] | Uploads and the per-command state changes and indexed draws        |

[images::Renderer] ties them together and is what most hosts use.

# Backends

The renderer talks to the GPU only through the [Backend] and [RenderPassEncoder] traits.
With the `backend_wgpu` feature (on by default) [WgpuBackend] implements them over a
`wgpu::Device`/`wgpu::Queue` pair, and `wgpu::RenderPass` is a [RenderPassEncoder].

[recording::RecordingBackend] is an in-memory backend that records every call.  The crate's
tests use it, and it is handy for inspecting a frame without a GPU.

# The UI library

gui_passes does not link a UI library.  The host implements [ui::UiContext] over its library
and converts the library's draw data into [ui::DrawData].  The vertex layout is Dear ImGui's,
so for most libraries the conversion is a copy.

# Non-features

There is no window or surface management, no shader compilation beyond handing WGSL to the
backend, and no support for user draw callbacks.  Frames that contain one are rejected.
*/

pub mod bindings;
mod bittricks;
pub mod images;
mod imp;
pub mod ui;

pub use imp::{
    Backend, BindGroupEntry, BindingKind, BindingResource, Blend, BufferDescriptor, BufferUsages,
    Error, IndexFormat, LayoutEntry, PipelineDescriptor, RenderPassEncoder, Stage, TexelLayout,
    TextureDescriptor, TextureFormat, TextureUsages, VertexAttribute, VertexFormat,
};

pub use imp::recording;

#[cfg(feature = "backend_wgpu")]
pub use imp::wgpu::WgpuBackend;

pub use bindings::TextureId;
pub use images::{RenderError, Renderer};
