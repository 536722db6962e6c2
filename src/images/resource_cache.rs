// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Long-lived GPU objects owned by a renderer.

The cache holds:

* the vertex and index buffers, which only ever grow,
* a 64-byte uniform buffer for the projection matrix,
* the sampler, shader module, both bind group layouts, the pipeline layout and pipeline,
* the main bind group (uniform + sampler),
* the font atlas texture with its view and bind group, replaced together.

Every object lives in an `Option` so teardown can `take` it; releasing twice is a no-op.
*/
use crate::bittricks::round_up_to;
use crate::images::config::RendererConfig;
use crate::images::RenderError;
use crate::imp::{
    self, Backend, BindGroupEntry, BindingKind, BindingResource, Blend, BufferDescriptor,
    BufferUsages, LayoutEntry, PipelineDescriptor, Stage, TexelLayout, TextureDescriptor,
    TextureFormat, TextureUsages, VertexAttribute, VertexFormat,
};
use crate::ui::DrawVert;

/// Size of the uniform buffer: one column-major 4x4 `f32` matrix.
pub const UNIFORM_SIZE: u64 = 64;

/// Vertex attributes of [DrawVert].
pub const VERTEX_ATTRIBUTES: [VertexAttribute; 3] = [
    VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: 0,
        location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: 8,
        location: 1,
    },
    VertexAttribute {
        format: VertexFormat::Unorm8x4,
        offset: 16,
        location: 2,
    },
];

const COMMON_LAYOUT: [LayoutEntry; 2] = [
    LayoutEntry {
        binding: 0,
        stage: Stage::Vertex,
        kind: BindingKind::UniformBuffer,
    },
    LayoutEntry {
        binding: 1,
        stage: Stage::Fragment,
        kind: BindingKind::FilteringSampler,
    },
];

const TEXTURE_LAYOUT: [LayoutEntry; 1] = [LayoutEntry {
    binding: 0,
    stage: Stage::Fragment,
    kind: BindingKind::Texture2D,
}];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

impl BufferKind {
    /// Usage flags the buffer is created with; kept across reallocation.
    pub fn usage(self) -> BufferUsages {
        match self {
            BufferKind::Vertex => BufferUsages::VERTEX | BufferUsages::COPY_DST,
            BufferKind::Index => BufferUsages::INDEX | BufferUsages::COPY_DST,
        }
    }

    fn label(self) -> &'static str {
        match self {
            BufferKind::Vertex => "vertex buffer",
            BufferKind::Index => "index buffer",
        }
    }
}

/**
Capacity policy for the geometry buffers.

When a frame needs more than the current capacity, the buffer is reallocated at
`round_up_to(ceil(required * factor), alignment)` bytes.

```
use gui_passes::images::BufferGrowth;
let growth = BufferGrowth::default();
assert_eq!(growth.capacity_for(80), 128);
assert_eq!(growth.capacity_for(12), 64);
```
*/
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferGrowth {
    /// Multiplier applied to the required size.  Values below 1 are treated as 1.
    pub factor: f64,
    pub alignment: u64,
}

impl Default for BufferGrowth {
    fn default() -> Self {
        BufferGrowth {
            factor: 1.5,
            alignment: 64,
        }
    }
}

impl BufferGrowth {
    pub fn capacity_for(&self, required: u64) -> u64 {
        let factor = if self.factor.is_finite() {
            self.factor.max(1.0)
        } else {
            1.0
        };
        let scaled = (required as f64 * factor).ceil() as u64;
        round_up_to(scaled.max(required), self.alignment)
    }
}

#[derive(Debug)]
struct GrowableBuffer<B: Backend> {
    kind: BufferKind,
    buffer: Option<B::Buffer>,
    capacity: u64,
}

impl<B: Backend> GrowableBuffer<B> {
    fn new(kind: BufferKind) -> Self {
        Self {
            kind,
            buffer: None,
            capacity: 0,
        }
    }

    fn release(&mut self, backend: &B) {
        if let Some(buffer) = self.buffer.take() {
            backend.destroy_buffer(buffer);
        }
        self.capacity = 0;
    }
}

#[derive(Debug)]
struct FontResources<B: Backend> {
    texture: B::Texture,
    view: B::TextureView,
    bind_group: B::BindGroup,
    width: u32,
    height: u32,
}

impl<B: Backend> FontResources<B> {
    fn release(self, backend: &B) {
        backend.release_bind_group(self.bind_group);
        backend.release_view(self.view);
        backend.destroy_texture(self.texture);
    }
}

/// The objects created once at startup.
#[derive(Debug)]
struct DeviceObjects<B: Backend> {
    uniform: Option<B::Buffer>,
    sampler: Option<B::Sampler>,
    shader: Option<B::ShaderModule>,
    common_layout: Option<B::BindGroupLayout>,
    texture_layout: Option<B::BindGroupLayout>,
    pipeline_layout: Option<B::PipelineLayout>,
    pipeline: Option<B::RenderPipeline>,
    main_bind_group: Option<B::BindGroup>,
}

impl<B: Backend> DeviceObjects<B> {
    fn empty() -> Self {
        Self {
            uniform: None,
            sampler: None,
            shader: None,
            common_layout: None,
            texture_layout: None,
            pipeline_layout: None,
            pipeline: None,
            main_bind_group: None,
        }
    }

    /// Creates every object in dependency order.  On failure, whatever was created so far is
    /// left in place for [Self::release].
    fn fill(&mut self, backend: &B, config: &RendererConfig) -> Result<(), imp::Error> {
        let uniform = &*self.uniform.insert(backend.create_buffer(&BufferDescriptor {
            label: &config.label_for("uniform buffer"),
            size: UNIFORM_SIZE,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })?);
        let sampler = &*self
            .sampler
            .insert(backend.create_sampler(&config.label_for("sampler"))?);
        let shader = &*self.shader.insert(
            backend.create_shader_module(&config.label_for("shader"), config.shader.wgsl_code())?,
        );
        let common_layout = &*self.common_layout.insert(
            backend.create_bind_group_layout(&config.label_for("common layout"), &COMMON_LAYOUT)?,
        );
        let texture_layout = &*self.texture_layout.insert(
            backend.create_bind_group_layout(&config.label_for("texture layout"), &TEXTURE_LAYOUT)?,
        );
        let pipeline_layout = &*self.pipeline_layout.insert(backend.create_pipeline_layout(
            &config.label_for("pipeline layout"),
            &[common_layout, texture_layout],
        )?);
        self.pipeline = Some(backend.create_render_pipeline(&PipelineDescriptor {
            label: &config.label_for("pipeline"),
            layout: pipeline_layout,
            module: shader,
            vertex_entry: &config.shader.vertex_entry,
            fragment_entry: &config.shader.fragment_entry,
            vertex_stride: std::mem::size_of::<DrawVert>() as u64,
            attributes: &VERTEX_ATTRIBUTES,
            target_format: config.render_target_format,
            blend: Blend::AlphaBlending,
        })?);
        self.main_bind_group = Some(backend.create_bind_group(
            &config.label_for("main bind group"),
            common_layout,
            &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::Buffer(uniform),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(sampler),
                },
            ],
        )?);
        Ok(())
    }

    /// Releases in reverse creation order.
    fn release(&mut self, backend: &B) {
        if let Some(bind_group) = self.main_bind_group.take() {
            backend.release_bind_group(bind_group);
        }
        if let Some(pipeline) = self.pipeline.take() {
            backend.release_render_pipeline(pipeline);
        }
        if let Some(layout) = self.pipeline_layout.take() {
            backend.release_pipeline_layout(layout);
        }
        if let Some(layout) = self.texture_layout.take() {
            backend.release_bind_group_layout(layout);
        }
        if let Some(layout) = self.common_layout.take() {
            backend.release_bind_group_layout(layout);
        }
        if let Some(shader) = self.shader.take() {
            backend.release_shader_module(shader);
        }
        if let Some(sampler) = self.sampler.take() {
            backend.release_sampler(sampler);
        }
        if let Some(uniform) = self.uniform.take() {
            backend.destroy_buffer(uniform);
        }
    }
}

/// Owns the renderer's long-lived GPU objects.
#[derive(Debug)]
pub struct ResourceCache<B: Backend> {
    objects: DeviceObjects<B>,
    vertex: GrowableBuffer<B>,
    index: GrowableBuffer<B>,
    font: Option<FontResources<B>>,
    growth: BufferGrowth,
    label: String,
    released: bool,
}

impl<B: Backend> ResourceCache<B> {
    /// Creates the device objects.  If any creation fails, the ones already created are
    /// released before the error is returned.
    pub fn new(backend: &B, config: &RendererConfig) -> Result<Self, imp::Error> {
        let mut objects = DeviceObjects::empty();
        if let Err(e) = objects.fill(backend, config) {
            logwise::error_sync!(
                "Can't create renderer resources: {e}",
                e = logwise::privacy::LogIt(&e)
            );
            objects.release(backend);
            return Err(e);
        }
        Ok(Self {
            objects,
            vertex: GrowableBuffer::new(BufferKind::Vertex),
            index: GrowableBuffer::new(BufferKind::Index),
            font: None,
            growth: config.growth,
            label: config.label.clone(),
            released: false,
        })
    }

    fn geometry(&self, kind: BufferKind) -> &GrowableBuffer<B> {
        match kind {
            BufferKind::Vertex => &self.vertex,
            BufferKind::Index => &self.index,
        }
    }

    /// Current capacity in bytes.  Zero until the first frame with geometry.
    pub fn capacity(&self, kind: BufferKind) -> u64 {
        self.geometry(kind).capacity
    }

    /**
    Makes sure the `kind` buffer holds at least `required` bytes.

    Returns whether the buffer was reallocated.  The new buffer is created before the old one
    is destroyed, so a failed reallocation leaves the previous buffer in place.
    */
    pub fn ensure_capacity(
        &mut self,
        backend: &B,
        kind: BufferKind,
        required: u64,
    ) -> Result<bool, RenderError> {
        if self.released {
            return Err(RenderError::Released);
        }
        let growth = self.growth;
        let label = format!("{} {}", self.label, kind.label());
        let slot = match kind {
            BufferKind::Vertex => &mut self.vertex,
            BufferKind::Index => &mut self.index,
        };
        if required == 0 || (slot.buffer.is_some() && required <= slot.capacity) {
            return Ok(false);
        }
        let capacity = growth.capacity_for(required);
        let buffer = backend.create_buffer(&BufferDescriptor {
            label: &label,
            size: capacity,
            usage: slot.kind.usage(),
            mapped_at_creation: false,
        })?;
        if let Some(old) = slot.buffer.replace(buffer) {
            backend.destroy_buffer(old);
        }
        logwise::trace_sync!(
            "grew {what} from {old} to {new} bytes",
            what = kind.label(),
            old = slot.capacity,
            new = capacity
        );
        slot.capacity = capacity;
        Ok(true)
    }

    /**
    Replaces the font atlas texture, its view and its bind group.

    `pixels` is tightly packed RGBA8, `width * 4` bytes per row.  The new objects are created
    before the old ones are released.
    */
    pub fn rebuild_font_texture(
        &mut self,
        backend: &B,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        if self.released {
            return Err(RenderError::Released);
        }
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() < expected {
            return Err(RenderError::InvalidFontAtlas {
                width,
                height,
                len: pixels.len(),
            });
        }
        let texture_layout = self
            .objects
            .texture_layout
            .as_ref()
            .ok_or(RenderError::Released)?;
        let texture = backend.create_texture(&TextureDescriptor {
            label: &format!("{} font atlas", self.label),
            width,
            height,
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            mip_level_count: 1,
            sample_count: 1,
        })?;
        backend.write_texture(
            &texture,
            &pixels[..expected],
            TexelLayout {
                bytes_per_row: width * 4,
                width,
                height,
            },
        );
        let view = match backend.create_view(&texture, &format!("{} font atlas view", self.label)) {
            Ok(view) => view,
            Err(e) => {
                backend.destroy_texture(texture);
                return Err(e.into());
            }
        };
        let bind_group = match backend.create_bind_group(
            &format!("{} font bind group", self.label),
            texture_layout,
            &[BindGroupEntry {
                binding: 0,
                resource: BindingResource::TextureView(&view),
            }],
        ) {
            Ok(bind_group) => bind_group,
            Err(e) => {
                backend.release_view(view);
                backend.destroy_texture(texture);
                return Err(e.into());
            }
        };
        let fresh = FontResources {
            texture,
            view,
            bind_group,
            width,
            height,
        };
        if let Some(old) = self.font.replace(fresh) {
            old.release(backend);
        }
        logwise::info_sync!(
            "rebuilt font atlas at {width}x{height}",
            width = width,
            height = height
        );
        Ok(())
    }

    /// Size of the current font atlas, if one has been built.
    pub fn font_size(&self) -> Option<(u32, u32)> {
        self.font.as_ref().map(|f| (f.width, f.height))
    }

    pub fn buffer(&self, kind: BufferKind) -> Result<&B::Buffer, RenderError> {
        self.geometry(kind)
            .buffer
            .as_ref()
            .ok_or(RenderError::Released)
    }

    pub fn uniform(&self) -> Result<&B::Buffer, RenderError> {
        self.objects.uniform.as_ref().ok_or(RenderError::Released)
    }

    pub fn pipeline(&self) -> Result<&B::RenderPipeline, RenderError> {
        self.objects.pipeline.as_ref().ok_or(RenderError::Released)
    }

    pub fn main_bind_group(&self) -> Result<&B::BindGroup, RenderError> {
        self.objects
            .main_bind_group
            .as_ref()
            .ok_or(RenderError::Released)
    }

    /// The layout texture bind groups are created against.
    pub fn texture_layout(&self) -> Result<&B::BindGroupLayout, RenderError> {
        self.objects
            .texture_layout
            .as_ref()
            .ok_or(RenderError::Released)
    }

    /// `None` before the first font atlas upload.
    pub fn font_bind_group(&self) -> Option<&B::BindGroup> {
        self.font.as_ref().map(|f| &f.bind_group)
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Releases every object exactly once.  Later calls do nothing.
    pub fn release_all(&mut self, backend: &B) {
        if let Some(font) = self.font.take() {
            font.release(backend);
        }
        self.vertex.release(backend);
        self.index.release(backend);
        self.objects.release(backend);
        self.released = true;
    }
}
