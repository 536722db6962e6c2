// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Texture binding bookkeeping as seen through the renderer.
#[cfg(target_arch = "wasm32")]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

mod support;

use gui_passes::bindings::TextureId;
use gui_passes::images::{Renderer, RendererConfig};
use gui_passes::recording::{Call, PassCommand, RecordingBackend, RecordingPass};
use gui_passes::{Backend, RenderError, TextureFormat};
use support::{ScriptedUi, list, renderer, texture};

fn view_count(backend: &RecordingBackend) -> usize {
    backend
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::CreateView { .. }))
        .count()
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn registration_is_idempotent() {
    let backend = RecordingBackend::new();
    let t = texture(&backend, "image");
    let view = backend.create_view(&t, "image view").unwrap();
    let mut renderer = renderer(&backend, ScriptedUi::new(), 100, 100);
    let before = backend.created_bind_groups().len();

    let first = renderer.get_or_create_binding(&view).unwrap();
    let second = renderer.get_or_create_binding(&view).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, TextureId::new(100));
    assert_eq!(backend.created_bind_groups().len(), before + 1);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn released_ids_stop_resolving_and_are_not_reused() {
    let backend = RecordingBackend::new();
    let t = texture(&backend, "image");
    let view = backend.create_view(&t, "image view").unwrap();
    let mut renderer = renderer(&backend, ScriptedUi::new(), 100, 100);

    let id = renderer.get_or_create_binding(&view).unwrap();
    let bind_group = *renderer.resolve_binding(id).unwrap();
    renderer.release_binding(&view);
    assert_eq!(backend.release_count(bind_group), 1);
    assert_eq!(backend.release_count(view), 0);
    assert!(matches!(
        renderer.resolve_binding(id),
        Err(RenderError::UnknownBinding(x)) if x == id
    ));

    let again = renderer.get_or_create_binding(&view).unwrap();
    assert!(again > id);
    assert!(renderer.resolve_binding(again).is_ok());

    // releasing twice is harmless
    renderer.release_binding(&view);
    renderer.release_binding(&view);
    assert_eq!(backend.release_count(view), 0);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn raw_textures_get_one_owned_view() {
    let backend = RecordingBackend::new();
    let t = texture(&backend, "image");
    let mut renderer = renderer(&backend, ScriptedUi::new(), 100, 100);

    let views_before = view_count(&backend);
    let id = renderer.get_or_create_texture_binding(&t).unwrap();
    assert_eq!(renderer.get_or_create_texture_binding(&t).unwrap(), id);
    assert_eq!(view_count(&backend), views_before + 1);

    let auto_view = backend
        .calls()
        .into_iter()
        .find_map(|c| match c {
            Call::CreateView { handle, texture } if texture == t => Some(handle),
            _ => None,
        })
        .unwrap();
    renderer.release_texture_binding(&t);
    assert_eq!(backend.release_count(auto_view), 1);
    assert_eq!(backend.release_count(t), 0);
    assert!(renderer.resolve_binding(id).is_err());
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn registered_textures_are_bound_for_their_commands() {
    let backend = RecordingBackend::new();
    let t = texture(&backend, "image");
    let mut renderer = renderer(&backend, ScriptedUi::new(), 100, 100);
    let id = renderer.get_or_create_texture_binding(&t).unwrap();
    let bind_group = *renderer.resolve_binding(id).unwrap();

    renderer.ui_mut().frames.push_back(vec![
        list(4, &[6], id),
        list(4, &[6], TextureId::NULL),
        list(4, &[6], TextureId::FONT_ATLAS),
    ]);
    renderer.update(0.016).unwrap();
    let font = *renderer.resolve_binding(TextureId::FONT_ATLAS).unwrap();
    let mut pass = RecordingPass::new();
    renderer.render(&mut pass).unwrap();

    let texture_binds: Vec<_> = pass
        .commands
        .iter()
        .filter_map(|c| match c {
            PassCommand::SetBindGroup {
                index: 1,
                bind_group,
            } => Some(*bind_group),
            _ => None,
        })
        .collect();
    // the null id leaves the previous texture bound
    assert_eq!(texture_binds, vec![bind_group, font]);
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn binding_ids_start_at_the_configured_base() {
    let backend = RecordingBackend::new();
    let t = texture(&backend, "image");
    let config = RendererConfig::new(TextureFormat::Rgba8Unorm).with_binding_id_base(500);
    let mut renderer = Renderer::new(backend.clone(), ScriptedUi::new(), config, 10, 10).unwrap();
    assert_eq!(
        renderer.get_or_create_texture_binding(&t).unwrap(),
        TextureId::new(500)
    );
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn failed_bind_group_creation_is_reported() {
    let backend = RecordingBackend::new();
    let t = texture(&backend, "image");
    let mut renderer = renderer(&backend, ScriptedUi::new(), 100, 100);
    backend.fail_labels_containing("texture #100");
    assert!(matches!(
        renderer.get_or_create_texture_binding(&t),
        Err(RenderError::ResourceCreationFailed(_))
    ));
    backend.clear_failures();
    assert_eq!(
        renderer.get_or_create_texture_binding(&t).unwrap(),
        TextureId::new(100)
    );
}

#[test]
#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
fn bindings_are_unavailable_after_release_all() {
    let backend = RecordingBackend::new();
    let t = texture(&backend, "image");
    let mut renderer = renderer(&backend, ScriptedUi::new(), 100, 100);
    let id = renderer.get_or_create_texture_binding(&t).unwrap();
    renderer.release_all();
    assert!(matches!(
        renderer.resolve_binding(id),
        Err(RenderError::UnknownBinding(_))
    ));
    assert!(matches!(
        renderer.get_or_create_texture_binding(&t),
        Err(RenderError::Released)
    ));
}
