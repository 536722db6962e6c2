// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::bindings::{RegistryError, TextureId, TextureRegistry};
use crate::images::config::RendererConfig;
use crate::images::frame::{FrameAction, FrameController, FrameEvent, FrameState};
use crate::images::resource_cache::{BufferKind, ResourceCache};
use crate::images::translator::{resolve_texture, DrawListTranslator, FrameStats};
use crate::imp::{self, Backend, RenderPassEncoder};
use crate::ui::UiContext;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    #[error("Can't create GPU resource: {0}")]
    ResourceCreationFailed(#[from] imp::Error),
    #[error("Unknown texture binding {0}")]
    UnknownBinding(TextureId),
    #[error("Draw list {list}, command {command} uses a user callback, which this renderer does not support")]
    UnsupportedDrawFeature { list: usize, command: usize },
    #[error("Draw list {list} draws {elements} indices but holds only {indices}")]
    IndexRangeExceeded {
        list: usize,
        elements: u64,
        indices: usize,
    },
    #[error("Font atlas of {width}x{height} can't be built from {len} bytes")]
    InvalidFontAtlas { width: u32, height: u32, len: usize },
    #[error("The renderer's GPU resources were already released")]
    Released,
}

impl From<RegistryError> for RenderError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::UnknownBinding(id) => RenderError::UnknownBinding(id),
            RegistryError::Backend(e) => RenderError::ResourceCreationFailed(e),
        }
    }
}

/**
Draws an immediate-mode UI into render passes of a [Backend].

The renderer owns the UI context, the GPU resources the UI needs and the registry of textures
the UI may reference.  A host drives it once per displayed frame:

```
use gui_passes::images::{Renderer, RendererConfig};
use gui_passes::recording::{RecordingBackend, RecordingPass};
use gui_passes::ui::{DisplayMetrics, DrawData, FontAtlas, UiContext};
use gui_passes::bindings::TextureId;
use gui_passes::TextureFormat;

#[derive(Default)]
struct Blank {
    data: DrawData,
    atlas: Vec<u8>,
}

impl UiContext for Blank {
    fn set_display_metrics(&mut self, metrics: DisplayMetrics) {
        self.data.display_size = metrics.display_size;
        self.data.framebuffer_scale = metrics.framebuffer_scale;
    }
    fn new_frame(&mut self) {}
    fn finalize_frame(&mut self) -> &DrawData {
        &self.data
    }
    fn font_atlas_dirty(&self) -> bool {
        self.atlas.is_empty()
    }
    fn font_atlas(&mut self) -> FontAtlas<'_> {
        self.atlas = vec![255; 4];
        FontAtlas { pixels: &self.atlas, width: 1, height: 1 }
    }
    fn set_font_atlas_id(&mut self, _id: TextureId) {}
}

let backend = RecordingBackend::new();
let config = RendererConfig::new(TextureFormat::Bgra8Unorm);
let mut renderer = Renderer::new(backend, Blank::default(), config, 800, 600).unwrap();
renderer.update(1.0 / 60.0).unwrap();
let mut pass = RecordingPass::new();
let stats = renderer.render(&mut pass).unwrap();
assert_eq!(stats.draw_calls, 0);
```
*/
#[derive(Debug)]
pub struct Renderer<B: Backend, U: UiContext> {
    backend: B,
    ui: U,
    frame: FrameController,
    cache: ResourceCache<B>,
    registry: TextureRegistry<B>,
    translator: DrawListTranslator,
    released: bool,
}

impl<B: Backend, U: UiContext> Renderer<B, U> {
    /**
    Creates the renderer's GPU resources.

    `width`/`height` are the physical size of the surface being drawn to.
    */
    pub fn new(
        backend: B,
        ui: U,
        config: RendererConfig,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let cache = ResourceCache::new(&backend, &config)?;
        logwise::info_sync!(
            "Created renderer for {width}x{height}",
            width = width,
            height = height
        );
        Ok(Self {
            backend,
            ui,
            frame: FrameController::new(width, height),
            cache,
            registry: TextureRegistry::new(config.binding_id_base),
            translator: DrawListTranslator::new(),
            released: false,
        })
    }

    /**
    Starts a UI frame.

    A frame left open by a previous `update` is finalized and discarded first.  The font atlas is
    built before the first frame and rebuilt whenever the UI reports it dirty.
    */
    pub fn update(&mut self, delta_seconds: f32) -> Result<(), RenderError> {
        if self.released {
            return Err(RenderError::Released);
        }
        if self.frame.transition(FrameEvent::Update) == FrameAction::FinalizeAndOpen {
            logwise::trace_sync!("discarding a frame that was never rendered");
            self.ui.finalize_frame();
        }
        if self.cache.font_bind_group().is_none() || self.ui.font_atlas_dirty() {
            if let Err(e) = self.rebuild_font_texture() {
                self.frame.abandon();
                return Err(e);
            }
        }
        self.ui
            .set_display_metrics(self.frame.metrics(delta_seconds));
        self.ui.new_frame();
        Ok(())
    }

    /**
    Finalizes the open frame and records it into `pass`.

    Without an open frame this does nothing.
    */
    pub fn render<P: RenderPassEncoder<B>>(&mut self, pass: &mut P) -> Result<FrameStats, RenderError> {
        if self.released {
            return Err(RenderError::Released);
        }
        match self.frame.transition(FrameEvent::Render) {
            FrameAction::FinalizeAndDraw => {
                let draw_data = self.ui.finalize_frame();
                self.translator.translate(
                    &self.backend,
                    &mut self.cache,
                    &self.registry,
                    draw_data,
                    pass,
                )
            }
            _ => {
                logwise::warn_sync!("render called without a frame in progress");
                Ok(FrameStats::default())
            }
        }
    }

    /// The surface was resized to `width`x`height` physical pixels.
    pub fn window_resized(&mut self, width: u32, height: u32) {
        self.frame.resize(width, height);
    }

    pub fn set_scale_factor(&mut self, scale_factor: f32) {
        self.frame.set_scale_factor(scale_factor);
    }

    /// Uploads the UI library's current font atlas and hands it [TextureId::FONT_ATLAS].
    pub fn rebuild_font_texture(&mut self) -> Result<(), RenderError> {
        if self.released {
            return Err(RenderError::Released);
        }
        let atlas = self.ui.font_atlas();
        self.cache
            .rebuild_font_texture(&self.backend, atlas.pixels, atlas.width, atlas.height)?;
        self.ui.set_font_atlas_id(TextureId::FONT_ATLAS);
        Ok(())
    }

    /// The id UI widgets use to draw `view`.  The view stays owned by the caller.
    pub fn get_or_create_binding(&mut self, view: &B::TextureView) -> Result<TextureId, RenderError> {
        let layout = self.cache.texture_layout()?;
        Ok(self
            .registry
            .get_or_create_binding(&self.backend, layout, view)?)
    }

    /// The id UI widgets use to draw `texture`, through a view the renderer creates and owns.
    pub fn get_or_create_texture_binding(
        &mut self,
        texture: &B::Texture,
    ) -> Result<TextureId, RenderError> {
        let layout = self.cache.texture_layout()?;
        Ok(self
            .registry
            .get_or_create_texture_binding(&self.backend, layout, texture)?)
    }

    pub fn release_binding(&mut self, view: &B::TextureView) {
        self.registry.release_view(&self.backend, view);
    }

    pub fn release_texture_binding(&mut self, texture: &B::Texture) {
        self.registry.release_texture(&self.backend, texture);
    }

    /// The bind group behind `id`.
    pub fn resolve_binding(&self, id: TextureId) -> Result<&B::BindGroup, RenderError> {
        resolve_texture(&self.cache, &self.registry, id)
    }

    /// Current geometry buffer capacity in bytes.
    pub fn buffer_capacity(&self, kind: BufferKind) -> u64 {
        self.cache.capacity(kind)
    }

    /**
    Releases every GPU object the renderer owns, including cached texture bindings.

    Caller-supplied views are left alone.  Afterwards most operations fail with
    [RenderError::Released].  Calling this again does nothing; it also runs on drop.
    */
    pub fn release_all(&mut self) {
        if self.released {
            return;
        }
        self.registry.clear(&self.backend);
        self.cache.release_all(&self.backend);
        self.released = true;
        logwise::info_sync!("Released renderer resources");
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn frame_state(&self) -> FrameState {
        self.frame.state()
    }
}

impl<B: Backend, U: UiContext> Drop for Renderer<B, U> {
    fn drop(&mut self) {
        self.release_all();
    }
}
