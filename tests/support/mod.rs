// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! A scripted UI context and helpers shared by the integration tests.
#![allow(dead_code)]

use gui_passes::bindings::TextureId;
use gui_passes::images::{Renderer, RendererConfig};
use gui_passes::recording::{Call, Handle, RecordingBackend};
use gui_passes::ui::{DisplayMetrics, DrawCmd, DrawData, DrawList, DrawVert, FontAtlas, UiContext};
use gui_passes::TextureFormat;
use std::collections::VecDeque;

/// Replays queued draw lists, one entry per `new_frame`.
#[derive(Debug)]
pub struct ScriptedUi {
    pub frames: VecDeque<Vec<DrawList>>,
    pub current: DrawData,
    pub metrics: Vec<DisplayMetrics>,
    pub log: Vec<&'static str>,
    pub atlas: Vec<u8>,
    pub atlas_size: (u32, u32),
    pub atlas_dirty: bool,
    pub font_id: Option<TextureId>,
}

impl ScriptedUi {
    pub fn new() -> Self {
        ScriptedUi {
            frames: VecDeque::new(),
            current: DrawData::default(),
            metrics: Vec::new(),
            log: Vec::new(),
            atlas: vec![0xff; 2 * 2 * 4],
            atlas_size: (2, 2),
            atlas_dirty: true,
            font_id: None,
        }
    }

    pub fn with_frame(mut self, lists: Vec<DrawList>) -> Self {
        self.frames.push_back(lists);
        self
    }
}

impl UiContext for ScriptedUi {
    fn set_display_metrics(&mut self, metrics: DisplayMetrics) {
        self.metrics.push(metrics);
        self.current.display_size = metrics.display_size;
        self.current.framebuffer_scale = metrics.framebuffer_scale;
    }

    fn new_frame(&mut self) {
        self.log.push("new_frame");
        self.current.draw_lists = self.frames.pop_front().unwrap_or_default();
    }

    fn finalize_frame(&mut self) -> &DrawData {
        self.log.push("finalize");
        &self.current
    }

    fn font_atlas_dirty(&self) -> bool {
        self.atlas_dirty
    }

    fn font_atlas(&mut self) -> FontAtlas<'_> {
        FontAtlas {
            pixels: &self.atlas,
            width: self.atlas_size.0,
            height: self.atlas_size.1,
        }
    }

    fn set_font_atlas_id(&mut self, id: TextureId) {
        self.font_id = Some(id);
        self.atlas_dirty = false;
    }
}

/// A list of `vertices` vertices whose commands draw `counts` indices each.
pub fn list(vertices: usize, counts: &[u32], texture_id: TextureId) -> DrawList {
    let vtx = (0..vertices)
        .map(|i| DrawVert::new([i as f32, i as f32], [0.0, 0.0], 0xffff_ffff))
        .collect();
    let total: u32 = counts.iter().sum();
    let idx = (0..total)
        .map(|i| (i as usize % vertices.max(1)) as u16)
        .collect();
    let commands = counts
        .iter()
        .map(|&elem_count| DrawCmd::Elements {
            clip_rect: [0.0, 0.0, 10_000.0, 10_000.0],
            texture_id,
            elem_count,
        })
        .collect();
    DrawList::new(vtx, idx, commands)
}

pub fn renderer(
    backend: &RecordingBackend,
    ui: ScriptedUi,
    width: u32,
    height: u32,
) -> Renderer<RecordingBackend, ScriptedUi> {
    Renderer::new(
        backend.clone(),
        ui,
        RendererConfig::new(TextureFormat::Bgra8Unorm),
        width,
        height,
    )
    .unwrap()
}

/// Buffers created with a label containing `fragment`, oldest first.
pub fn buffers_labelled(backend: &RecordingBackend, fragment: &str) -> Vec<Handle> {
    backend
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::CreateBuffer { handle, label, .. } if label.contains(fragment) => Some(handle),
            _ => None,
        })
        .collect()
}

/// Bind groups created with a label containing `fragment`, oldest first.
pub fn bind_groups_labelled(backend: &RecordingBackend, fragment: &str) -> Vec<Handle> {
    backend
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::CreateBindGroup { handle, label, .. } if label.contains(fragment) => Some(handle),
            _ => None,
        })
        .collect()
}

pub fn pipeline(backend: &RecordingBackend) -> Handle {
    backend
        .calls()
        .into_iter()
        .find_map(|c| match c {
            Call::CreateRenderPipeline { handle, .. } => Some(handle),
            _ => None,
        })
        .unwrap()
}

pub fn texture(backend: &RecordingBackend, label: &str) -> Handle {
    use gui_passes::{Backend, TextureDescriptor, TextureUsages};
    backend
        .create_texture(&TextureDescriptor {
            label,
            width: 8,
            height: 8,
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            mip_level_count: 1,
            sample_count: 1,
        })
        .unwrap()
}
