use crate::bindings::TextureId;
use crate::ui::DrawData;

/// Metrics pushed into the UI library at the start of each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMetrics {
    /// Logical size (physical size divided by the device scale factor).
    pub display_size: [f32; 2],
    pub framebuffer_scale: [f32; 2],
    pub delta_seconds: f32,
}

/// The UI library's rasterized font atlas, tightly packed RGBA8.
#[derive(Debug, Clone, Copy)]
pub struct FontAtlas<'a> {
    pub pixels: &'a [u8],
    pub width: u32,
    pub height: u32,
}

/**
What the renderer needs from an immediate-mode UI library.

The renderer drives the calls in this order each tick:

1. [finalize_frame](Self::finalize_frame) if a frame was left open,
2. [font_atlas](Self::font_atlas) + [set_font_atlas_id](Self::set_font_atlas_id) if
   [font_atlas_dirty](Self::font_atlas_dirty),
3. [set_display_metrics](Self::set_display_metrics), then [new_frame](Self::new_frame).

and later [finalize_frame](Self::finalize_frame) once more to obtain the draw data to render.
*/
pub trait UiContext {
    fn set_display_metrics(&mut self, metrics: DisplayMetrics);
    fn new_frame(&mut self);
    /// Ends the current frame and returns its draw data.
    fn finalize_frame(&mut self) -> &DrawData;
    fn font_atlas_dirty(&self) -> bool;
    fn font_atlas(&mut self) -> FontAtlas<'_>;
    /// Tells the library which id refers to its atlas.  Implementations clear the dirty flag here.
    fn set_font_atlas_id(&mut self, id: TextureId);
}
