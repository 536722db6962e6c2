// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
An in-memory [Backend] that records every call.

Handles are plain numbers handed out in creation order.  Clones of a [RecordingBackend] share
one log, so a test can hand one clone to the renderer and inspect the other.

```
use gui_passes::recording::{Call, RecordingBackend};
use gui_passes::{Backend, BufferDescriptor, BufferUsages};

let backend = RecordingBackend::new();
let buffer = backend
    .create_buffer(&BufferDescriptor {
        label: "scratch",
        size: 64,
        usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
    .unwrap();
backend.destroy_buffer(buffer);
assert_eq!(backend.release_count(buffer), 1);
assert!(matches!(backend.calls()[0], Call::CreateBuffer { size: 64, .. }));
```
*/
use crate::imp::{
    Backend, BindGroupEntry, BindingResource, BufferDescriptor, BufferUsages, Error, IndexFormat,
    LayoutEntry, PipelineDescriptor, RenderPassEncoder, TexelLayout, TextureDescriptor,
    TextureFormat,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A recorded resource.  The number is unique across all resource kinds of one backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateBuffer {
        handle: Handle,
        label: String,
        size: u64,
        usage: BufferUsages,
    },
    DestroyBuffer(Handle),
    WriteBuffer {
        buffer: Handle,
        offset: u64,
        data: Vec<u8>,
    },
    CreateTexture {
        handle: Handle,
        label: String,
        width: u32,
        height: u32,
        format: TextureFormat,
    },
    DestroyTexture(Handle),
    WriteTexture {
        texture: Handle,
        layout: TexelLayout,
        len: usize,
    },
    CreateView {
        handle: Handle,
        texture: Handle,
    },
    ReleaseView(Handle),
    CreateSampler(Handle),
    ReleaseSampler(Handle),
    CreateShaderModule {
        handle: Handle,
        label: String,
    },
    ReleaseShaderModule(Handle),
    CreateBindGroupLayout {
        handle: Handle,
        label: String,
        entries: Vec<LayoutEntry>,
    },
    ReleaseBindGroupLayout(Handle),
    CreatePipelineLayout {
        handle: Handle,
        layouts: Vec<Handle>,
    },
    ReleasePipelineLayout(Handle),
    CreateRenderPipeline {
        handle: Handle,
        label: String,
        vertex_stride: u64,
    },
    ReleaseRenderPipeline(Handle),
    CreateBindGroup {
        handle: Handle,
        label: String,
        layout: Handle,
        resources: Vec<Handle>,
    },
    ReleaseBindGroup(Handle),
}

#[derive(Debug, Default)]
struct State {
    next_handle: u64,
    calls: Vec<Call>,
    live: HashSet<Handle>,
    releases: HashMap<Handle, usize>,
    failing_labels: Vec<String>,
}

impl State {
    fn allocate(&mut self, label: &str) -> Result<Handle, Error> {
        if self.failing_labels.iter().any(|f| label.contains(f.as_str())) {
            return Err(Error::creation_failed(label, "injected failure"));
        }
        self.next_handle += 1;
        let handle = Handle(self.next_handle);
        self.live.insert(handle);
        Ok(handle)
    }
    fn release(&mut self, handle: Handle, call: Call) {
        self.live.remove(&handle);
        *self.releases.entry(handle).or_insert(0) += 1;
        self.calls.push(call);
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    state: Arc<Mutex<State>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Future creations whose label contains `fragment` fail with [Error::ResourceCreationFailed].
    pub fn fail_labels_containing(&self, fragment: &str) {
        self.state().failing_labels.push(fragment.to_string());
    }

    pub fn clear_failures(&self) {
        self.state().failing_labels.clear();
    }

    /// How many times `handle` was destroyed or released.
    pub fn release_count(&self, handle: Handle) -> usize {
        self.state().releases.get(&handle).copied().unwrap_or(0)
    }

    /// Handles created and not yet released.
    pub fn live_handles(&self) -> HashSet<Handle> {
        self.state().live.clone()
    }

    pub fn is_live(&self, handle: Handle) -> bool {
        self.state().live.contains(&handle)
    }

    /// Handles of every bind group created so far.
    pub fn created_bind_groups(&self) -> Vec<Handle> {
        self.state()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::CreateBindGroup { handle, .. } => Some(*handle),
                _ => None,
            })
            .collect()
    }

    /// Payloads of every write to `buffer`, in order.
    pub fn writes_to(&self, buffer: Handle) -> Vec<(u64, Vec<u8>)> {
        self.state()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::WriteBuffer {
                    buffer: b,
                    offset,
                    data,
                } if *b == buffer => Some((*offset, data.clone())),
                _ => None,
            })
            .collect()
    }

    /// Size and usage a buffer was created with.
    pub fn buffer_info(&self, buffer: Handle) -> Option<(u64, BufferUsages)> {
        self.state().calls.iter().find_map(|c| match c {
            Call::CreateBuffer {
                handle, size, usage, ..
            } if *handle == buffer => Some((*size, *usage)),
            _ => None,
        })
    }

    fn create(&self, label: &str, call: impl FnOnce(Handle) -> Call) -> Result<Handle, Error> {
        let mut state = self.state();
        let handle = state.allocate(label)?;
        state.calls.push(call(handle));
        Ok(handle)
    }
}

impl Backend for RecordingBackend {
    type Buffer = Handle;
    type Texture = Handle;
    type TextureView = Handle;
    type Sampler = Handle;
    type ShaderModule = Handle;
    type BindGroupLayout = Handle;
    type PipelineLayout = Handle;
    type RenderPipeline = Handle;
    type BindGroup = Handle;

    fn create_buffer(&self, descriptor: &BufferDescriptor<'_>) -> Result<Handle, Error> {
        if descriptor.size == 0 {
            return Err(Error::creation_failed(descriptor.label, "zero-sized buffer"));
        }
        self.create(descriptor.label, |handle| Call::CreateBuffer {
            handle,
            label: descriptor.label.to_string(),
            size: descriptor.size,
            usage: descriptor.usage,
        })
    }

    fn destroy_buffer(&self, buffer: Handle) {
        self.state().release(buffer, Call::DestroyBuffer(buffer));
    }

    fn write_buffer(&self, buffer: &Handle, offset: u64, data: &[u8]) {
        self.state().calls.push(Call::WriteBuffer {
            buffer: *buffer,
            offset,
            data: data.to_vec(),
        });
    }

    fn create_texture(&self, descriptor: &TextureDescriptor<'_>) -> Result<Handle, Error> {
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(Error::creation_failed(descriptor.label, "zero-sized texture"));
        }
        self.create(descriptor.label, |handle| Call::CreateTexture {
            handle,
            label: descriptor.label.to_string(),
            width: descriptor.width,
            height: descriptor.height,
            format: descriptor.format,
        })
    }

    fn destroy_texture(&self, texture: Handle) {
        self.state().release(texture, Call::DestroyTexture(texture));
    }

    fn write_texture(&self, texture: &Handle, data: &[u8], layout: TexelLayout) {
        self.state().calls.push(Call::WriteTexture {
            texture: *texture,
            layout,
            len: data.len(),
        });
    }

    fn create_view(&self, texture: &Handle, label: &str) -> Result<Handle, Error> {
        self.create(label, |handle| Call::CreateView {
            handle,
            texture: *texture,
        })
    }

    fn release_view(&self, view: Handle) {
        self.state().release(view, Call::ReleaseView(view));
    }

    fn create_sampler(&self, label: &str) -> Result<Handle, Error> {
        self.create(label, Call::CreateSampler)
    }

    fn release_sampler(&self, sampler: Handle) {
        self.state().release(sampler, Call::ReleaseSampler(sampler));
    }

    fn create_shader_module(&self, label: &str, _wgsl: &str) -> Result<Handle, Error> {
        self.create(label, |handle| Call::CreateShaderModule {
            handle,
            label: label.to_string(),
        })
    }

    fn release_shader_module(&self, module: Handle) {
        self.state().release(module, Call::ReleaseShaderModule(module));
    }

    fn create_bind_group_layout(
        &self,
        label: &str,
        entries: &[LayoutEntry],
    ) -> Result<Handle, Error> {
        self.create(label, |handle| Call::CreateBindGroupLayout {
            handle,
            label: label.to_string(),
            entries: entries.to_vec(),
        })
    }

    fn release_bind_group_layout(&self, layout: Handle) {
        self.state()
            .release(layout, Call::ReleaseBindGroupLayout(layout));
    }

    fn create_pipeline_layout(
        &self,
        label: &str,
        bind_group_layouts: &[&Handle],
    ) -> Result<Handle, Error> {
        self.create(label, |handle| Call::CreatePipelineLayout {
            handle,
            layouts: bind_group_layouts.iter().map(|h| **h).collect(),
        })
    }

    fn release_pipeline_layout(&self, layout: Handle) {
        self.state()
            .release(layout, Call::ReleasePipelineLayout(layout));
    }

    fn create_render_pipeline(
        &self,
        descriptor: &PipelineDescriptor<'_, Self>,
    ) -> Result<Handle, Error> {
        self.create(descriptor.label, |handle| Call::CreateRenderPipeline {
            handle,
            label: descriptor.label.to_string(),
            vertex_stride: descriptor.vertex_stride,
        })
    }

    fn release_render_pipeline(&self, pipeline: Handle) {
        self.state()
            .release(pipeline, Call::ReleaseRenderPipeline(pipeline));
    }

    fn create_bind_group(
        &self,
        label: &str,
        layout: &Handle,
        entries: &[BindGroupEntry<'_, Self>],
    ) -> Result<Handle, Error> {
        let resources = entries
            .iter()
            .map(|e| match e.resource {
                BindingResource::Buffer(h)
                | BindingResource::Sampler(h)
                | BindingResource::TextureView(h) => *h,
            })
            .collect();
        self.create(label, |handle| Call::CreateBindGroup {
            handle,
            label: label.to_string(),
            layout: *layout,
            resources,
        })
    }

    fn release_bind_group(&self, bind_group: Handle) {
        self.state()
            .release(bind_group, Call::ReleaseBindGroup(bind_group));
    }
}

/// A command issued against a [RecordingPass].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassCommand {
    SetPipeline(Handle),
    SetVertexBuffer {
        slot: u32,
        buffer: Handle,
        size: u64,
    },
    SetIndexBuffer {
        buffer: Handle,
        format: IndexFormat,
        size: u64,
    },
    SetBindGroup {
        index: u32,
        bind_group: Handle,
    },
    SetScissorRect {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    DrawIndexed {
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        base_vertex: i32,
        first_instance: u32,
    },
}

/// A render pass that keeps the commands issued against it.
#[derive(Debug, Default)]
pub struct RecordingPass {
    pub commands: Vec<PassCommand>,
}

impl RecordingPass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the draw commands, in order.
    pub fn draws(&self) -> Vec<PassCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, PassCommand::DrawIndexed { .. }))
            .copied()
            .collect()
    }
}

impl RenderPassEncoder<RecordingBackend> for RecordingPass {
    fn set_pipeline(&mut self, pipeline: &Handle) {
        self.commands.push(PassCommand::SetPipeline(*pipeline));
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &Handle, size: u64) {
        self.commands.push(PassCommand::SetVertexBuffer {
            slot,
            buffer: *buffer,
            size,
        });
    }

    fn set_index_buffer(&mut self, buffer: &Handle, format: IndexFormat, size: u64) {
        self.commands.push(PassCommand::SetIndexBuffer {
            buffer: *buffer,
            format,
            size,
        });
    }

    fn set_bind_group(&mut self, index: u32, bind_group: &Handle) {
        self.commands.push(PassCommand::SetBindGroup {
            index,
            bind_group: *bind_group,
        });
    }

    fn set_scissor_rect(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.commands.push(PassCommand::SetScissorRect {
            x,
            y,
            width,
            height,
        });
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        base_vertex: i32,
        first_instance: u32,
    ) {
        self.commands.push(PassCommand::DrawIndexed {
            index_count,
            instance_count,
            first_index,
            base_vertex,
            first_instance,
        });
    }
}
