// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Draw lists as produced by the UI library once per frame.
//!
//! The layout matches Dear ImGui's `ImDrawData`: an ordered set of command lists, each with its
//! own vertex and 16-bit index buffer plus a sequence of draw commands.
use crate::bindings::TextureId;

/// One UI vertex.
///
/// 20 bytes: position and texture coordinate in logical pixels / normalized uv, colour packed as
/// RGBA8 (`0xAABBGGRR` when read as a little-endian `u32`).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawVert {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub col: u32,
}

impl DrawVert {
    pub const fn new(pos: [f32; 2], uv: [f32; 2], col: u32) -> Self {
        Self { pos, uv, col }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Draw `elem_count` indices with `texture_id` bound, clipped to `clip_rect`
    /// (`[min_x, min_y, max_x, max_y]` in logical pixels).
    Elements {
        clip_rect: [f32; 4],
        texture_id: TextureId,
        elem_count: u32,
    },
    /// A command carrying a user callback pointer.  The renderer rejects non-null ones and skips
    /// null ones.
    Callback { callback: usize },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DrawList {
    pub vtx_buffer: Vec<DrawVert>,
    pub idx_buffer: Vec<u16>,
    pub commands: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new(vtx_buffer: Vec<DrawVert>, idx_buffer: Vec<u16>, commands: Vec<DrawCmd>) -> Self {
        Self {
            vtx_buffer,
            idx_buffer,
            commands,
        }
    }
}

/**
A finished frame.

`display_pos`/`display_size` are the logical rectangle the UI covers; `framebuffer_scale`
converts logical to physical pixels.
*/
#[derive(Debug, Clone, PartialEq)]
pub struct DrawData {
    pub display_pos: [f32; 2],
    pub display_size: [f32; 2],
    pub framebuffer_scale: [f32; 2],
    pub draw_lists: Vec<DrawList>,
}

impl Default for DrawData {
    fn default() -> Self {
        Self {
            display_pos: [0.0, 0.0],
            display_size: [0.0, 0.0],
            framebuffer_scale: [1.0, 1.0],
            draw_lists: Vec::new(),
        }
    }
}

impl DrawData {
    pub fn total_vtx_count(&self) -> usize {
        self.draw_lists.iter().map(|l| l.vtx_buffer.len()).sum()
    }

    pub fn total_idx_count(&self) -> usize {
        self.draw_lists.iter().map(|l| l.idx_buffer.len()).sum()
    }

    /// Physical size of the surface the frame is drawn into.
    pub fn framebuffer_size(&self) -> [f32; 2] {
        [
            self.display_size[0] * self.framebuffer_scale[0],
            self.display_size[1] * self.framebuffer_scale[1],
        ]
    }
}
