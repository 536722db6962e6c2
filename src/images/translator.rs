// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Turns one frame of UI draw data into uploads and render pass commands.

Per frame:

1. Reject the frame if any command is a non-null user callback, names a texture that can't be
   resolved, or a list's commands draw more indices than the list holds.  Nothing is uploaded
   or recorded in that case, even for frames that would otherwise draw nothing.
2. Grow the vertex and index buffers as needed.
3. Concatenate every list's vertices and indices, in list order, and upload each array with a
   single write.  The index bytes are zero-padded to the copy alignment.
4. Upload the projection for the frame's display rectangle.
5. Bind buffers, pipeline and the main bind group, then for each command bind its texture
   (if any), set the scissor and draw.
*/
use crate::bindings::{TextureId, TextureRegistry};
use crate::bittricks::align_copy_len;
use crate::images::projection::ui_projection;
use crate::images::resource_cache::{BufferKind, ResourceCache};
use crate::images::RenderError;
use crate::imp::{Backend, IndexFormat, RenderPassEncoder};
use crate::ui::{DrawCmd, DrawData};

/// Counters for one translated frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub draw_calls: u32,
    pub vertex_count: u32,
    pub index_count: u32,
}

/// A scissor rectangle in framebuffer pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScissorRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/**
Converts a clip rectangle `[x1, y1, x2, y2]` in UI coordinates to framebuffer pixels.

The rectangle is offset by `display_pos`, scaled by `scale`, then clamped to
`0..framebuffer`.  Empty results have zero width or height.
*/
pub fn scissor_rect(
    clip_rect: [f32; 4],
    display_pos: [f32; 2],
    scale: [f32; 2],
    framebuffer: [u32; 2],
) -> ScissorRect {
    let fb_w = framebuffer[0] as f32;
    let fb_h = framebuffer[1] as f32;
    let min_x = ((clip_rect[0] - display_pos[0]) * scale[0]).clamp(0.0, fb_w);
    let min_y = ((clip_rect[1] - display_pos[1]) * scale[1]).clamp(0.0, fb_h);
    let max_x = ((clip_rect[2] - display_pos[0]) * scale[0]).clamp(0.0, fb_w);
    let max_y = ((clip_rect[3] - display_pos[1]) * scale[1]).clamp(0.0, fb_h);
    ScissorRect {
        x: min_x as u32,
        y: min_y as u32,
        width: (max_x - min_x).max(0.0) as u32,
        height: (max_y - min_y).max(0.0) as u32,
    }
}

/// Resolves a command's texture to a bind group.  The font atlas id maps to the font bind group.
pub(crate) fn resolve_texture<'a, B: Backend>(
    cache: &'a ResourceCache<B>,
    registry: &'a TextureRegistry<B>,
    id: TextureId,
) -> Result<&'a B::BindGroup, RenderError> {
    if id == TextureId::FONT_ATLAS {
        cache
            .font_bind_group()
            .ok_or(RenderError::UnknownBinding(id))
    } else {
        Ok(registry.resolve(id)?)
    }
}

/// Host-side scratch space, reused between frames.
#[derive(Debug, Default)]
pub struct DrawListTranslator {
    vertex_bytes: Vec<u8>,
    index_bytes: Vec<u8>,
}

impl DrawListTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    fn validate<B: Backend>(
        cache: &ResourceCache<B>,
        registry: &TextureRegistry<B>,
        draw_data: &DrawData,
    ) -> Result<(), RenderError> {
        for (list_index, list) in draw_data.draw_lists.iter().enumerate() {
            let mut elements: u64 = 0;
            for (command_index, command) in list.commands.iter().enumerate() {
                match *command {
                    // a null callback carries nothing to run
                    DrawCmd::Callback { callback: 0 } => {}
                    DrawCmd::Callback { .. } => {
                        return Err(RenderError::UnsupportedDrawFeature {
                            list: list_index,
                            command: command_index,
                        });
                    }
                    DrawCmd::Elements {
                        texture_id,
                        elem_count,
                        ..
                    } => {
                        elements += u64::from(elem_count);
                        if !texture_id.is_null() {
                            resolve_texture(cache, registry, texture_id)?;
                        }
                    }
                }
            }
            if elements > list.idx_buffer.len() as u64 {
                return Err(RenderError::IndexRangeExceeded {
                    list: list_index,
                    elements,
                    indices: list.idx_buffer.len(),
                });
            }
        }
        Ok(())
    }

    /**
    Records `draw_data` into `pass`.

    Frames are checked first.  Valid empty frames and frames with a non-positive framebuffer then
    record nothing.  On error nothing has been uploaded or recorded.
    */
    pub fn translate<B: Backend, P: RenderPassEncoder<B>>(
        &mut self,
        backend: &B,
        cache: &mut ResourceCache<B>,
        registry: &TextureRegistry<B>,
        draw_data: &DrawData,
        pass: &mut P,
    ) -> Result<FrameStats, RenderError> {
        if let Err(e) = Self::validate(cache, registry, draw_data) {
            logwise::error_sync!(
                "Can't render frame: {e}",
                e = logwise::privacy::LogIt(&e)
            );
            return Err(e);
        }
        let framebuffer = draw_data.framebuffer_size();
        if framebuffer[0] <= 0.0 || framebuffer[1] <= 0.0 {
            logwise::trace_sync!("skipping frame with an empty framebuffer");
            return Ok(FrameStats::default());
        }
        let vertex_count = draw_data.total_vtx_count();
        let index_count = draw_data.total_idx_count();
        if vertex_count == 0 || index_count == 0 {
            return Ok(FrameStats::default());
        }

        let perf = logwise::perfwarn_begin!("DrawListTranslator::translate");

        self.vertex_bytes.clear();
        self.index_bytes.clear();
        for list in &draw_data.draw_lists {
            self.vertex_bytes
                .extend_from_slice(bytemuck::cast_slice(&list.vtx_buffer));
            self.index_bytes
                .extend_from_slice(bytemuck::cast_slice(&list.idx_buffer));
        }
        let index_len = self.index_bytes.len();
        self.index_bytes.resize(align_copy_len(index_len), 0);

        cache.ensure_capacity(backend, BufferKind::Vertex, self.vertex_bytes.len() as u64)?;
        cache.ensure_capacity(backend, BufferKind::Index, self.index_bytes.len() as u64)?;

        let vertex_buffer = cache.buffer(BufferKind::Vertex)?;
        let index_buffer = cache.buffer(BufferKind::Index)?;
        backend.write_buffer(vertex_buffer, 0, &self.vertex_bytes);
        backend.write_buffer(index_buffer, 0, &self.index_bytes);
        let projection = ui_projection(draw_data.display_pos, draw_data.display_size);
        backend.write_buffer(cache.uniform()?, 0, bytemuck::cast_slice(&projection));

        pass.set_vertex_buffer(0, vertex_buffer, self.vertex_bytes.len() as u64);
        pass.set_index_buffer(index_buffer, IndexFormat::Uint16, index_len as u64);
        pass.set_pipeline(cache.pipeline()?);
        pass.set_bind_group(0, cache.main_bind_group()?);

        let framebuffer = [framebuffer[0] as u32, framebuffer[1] as u32];
        let mut stats = FrameStats {
            draw_calls: 0,
            vertex_count: vertex_count as u32,
            index_count: index_count as u32,
        };
        let mut index_offset: u32 = 0;
        let mut vertex_offset: i32 = 0;
        for list in &draw_data.draw_lists {
            for command in &list.commands {
                let DrawCmd::Elements {
                    clip_rect,
                    texture_id,
                    elem_count,
                } = *command
                else {
                    continue;
                };
                if !texture_id.is_null() {
                    pass.set_bind_group(1, resolve_texture(cache, registry, texture_id)?);
                }
                let scissor = scissor_rect(
                    clip_rect,
                    draw_data.display_pos,
                    draw_data.framebuffer_scale,
                    framebuffer,
                );
                pass.set_scissor_rect(scissor.x, scissor.y, scissor.width, scissor.height);
                pass.draw_indexed(elem_count, 1, index_offset, vertex_offset, 0);
                stats.draw_calls += 1;
                index_offset += elem_count;
            }
            vertex_offset += list.vtx_buffer.len() as i32;
        }
        drop(perf);
        logwise::trace_sync!(
            "recorded {draws} draws for {vertices} vertices",
            draws = stats.draw_calls,
            vertices = stats.vertex_count
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scissor_is_offset_then_scaled() {
        let r = scissor_rect([10.0, 10.0, 110.0, 60.0], [0.0, 0.0], [2.0, 2.0], [1000, 1000]);
        assert_eq!(
            r,
            ScissorRect {
                x: 20,
                y: 20,
                width: 200,
                height: 100
            }
        );
        // scaling before subtracting would give x = 25
        let r = scissor_rect([15.0, 15.0, 25.0, 25.0], [5.0, 5.0], [2.0, 2.0], [1000, 1000]);
        assert_eq!((r.x, r.y, r.width, r.height), (20, 20, 20, 20));
    }

    #[test]
    fn scissor_is_clamped() {
        let r = scissor_rect([-10.0, -10.0, 500.0, 500.0], [0.0, 0.0], [1.0, 1.0], [100, 50]);
        assert_eq!((r.x, r.y, r.width, r.height), (0, 0, 100, 50));
        let inverted = scissor_rect([50.0, 50.0, 10.0, 10.0], [0.0, 0.0], [1.0, 1.0], [100, 100]);
        assert_eq!((inverted.width, inverted.height), (0, 0));
        let outside = scissor_rect([200.0, 0.0, 300.0, 10.0], [0.0, 0.0], [1.0, 1.0], [100, 100]);
        assert_eq!((outside.x, outside.width), (100, 0));
    }
}
