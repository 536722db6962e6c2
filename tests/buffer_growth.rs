// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Geometry buffer capacity across frames of varying size.
#[cfg(target_arch = "wasm32")]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

mod support;

use gui_passes::bindings::TextureId;
use gui_passes::images::{BufferGrowth, BufferKind, Renderer, RendererConfig};
use gui_passes::recording::{RecordingBackend, RecordingPass};
use gui_passes::{BufferUsages, TextureFormat};
use support::{ScriptedUi, buffers_labelled, list, renderer};

fn draw_frame(
    renderer: &mut Renderer<RecordingBackend, ScriptedUi>,
    vertices: usize,
    indices: u32,
) {
    renderer
        .ui_mut()
        .frames
        .push_back(vec![list(vertices, &[indices], TextureId::NULL)]);
    renderer.update(0.016).unwrap();
    renderer.render(&mut RecordingPass::new()).unwrap();
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn capacity_grows_by_policy_and_never_shrinks() {
    let backend = RecordingBackend::new();
    let mut renderer = renderer(&backend, ScriptedUi::new(), 256, 256);

    // (vertices, bytes required, capacity afterwards)
    let steps = [
        (4, 80, 128),
        (6, 120, 128),
        (7, 140, 256),
        (3, 60, 256),
        (20, 400, 640),
        (1, 20, 640),
    ];
    let mut max_required = 0;
    for (vertices, required, capacity) in steps {
        draw_frame(&mut renderer, vertices, 3);
        max_required = max_required.max(required);
        let actual = renderer.buffer_capacity(BufferKind::Vertex);
        assert_eq!(actual, capacity, "after {vertices} vertices");
        assert!(actual >= max_required);
    }
    assert_eq!(buffers_labelled(&backend, "vertex buffer").len(), 3);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn reallocation_keeps_usage_and_releases_the_old_buffer() {
    let backend = RecordingBackend::new();
    let mut renderer = renderer(&backend, ScriptedUi::new(), 256, 256);
    draw_frame(&mut renderer, 4, 6);
    draw_frame(&mut renderer, 4, 600);

    let index_buffers = buffers_labelled(&backend, "index buffer");
    assert_eq!(index_buffers.len(), 2);
    assert_eq!(backend.release_count(index_buffers[0]), 1);
    assert!(backend.is_live(index_buffers[1]));
    assert_eq!(
        backend.buffer_info(index_buffers[0]),
        Some((64, BufferUsages::INDEX | BufferUsages::COPY_DST))
    );
    assert_eq!(
        backend.buffer_info(index_buffers[1]),
        Some((1856, BufferUsages::INDEX | BufferUsages::COPY_DST))
    );
    for vertex in buffers_labelled(&backend, "vertex buffer") {
        assert_eq!(
            backend.buffer_info(vertex).map(|(_, usage)| usage),
            Some(BufferUsages::VERTEX | BufferUsages::COPY_DST)
        );
    }
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn growth_policy_is_configurable() {
    let backend = RecordingBackend::new();
    let config = RendererConfig::new(TextureFormat::Bgra8Unorm).with_growth(BufferGrowth {
        factor: 2.0,
        alignment: 256,
    });
    let mut renderer = Renderer::new(backend.clone(), ScriptedUi::new(), config, 64, 64).unwrap();
    draw_frame(&mut renderer, 10, 3);
    assert_eq!(renderer.buffer_capacity(BufferKind::Vertex), 512);
    draw_frame(&mut renderer, 13, 3);
    assert_eq!(renderer.buffer_capacity(BufferKind::Vertex), 512);
    draw_frame(&mut renderer, 13, 200);
    assert_eq!(renderer.buffer_capacity(BufferKind::Index), 1024);
}
