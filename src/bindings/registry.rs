// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Maps texture views to bind groups and hands out [TextureId]s for them.
//!
//! The registry keeps three indices:
//!
//! - view → id, so registering the same view twice is idempotent,
//! - id → [ResourceSetInfo], so the draw list translator can find the bind group for an id,
//! - texture → view, for views the registry creates itself when given a raw texture.
//!
//! Views handed in by the caller stay the caller's ([ViewOwnership::Borrowed]); views the
//! registry creates are released by the registry ([ViewOwnership::Owned]).
//!
//! # Example
//!
//! ```
//! use gui_passes::bindings::TextureRegistry;
//! use gui_passes::recording::RecordingBackend;
//! use gui_passes::{Backend, LayoutEntry, Stage, BindingKind};
//!
//! let backend = RecordingBackend::new();
//! let layout = backend
//!     .create_bind_group_layout(
//!         "texture",
//!         &[LayoutEntry { binding: 0, stage: Stage::Fragment, kind: BindingKind::Texture2D }],
//!     )
//!     .unwrap();
//! let mut registry = TextureRegistry::<RecordingBackend>::new(100);
//! let texture = backend.create_texture(&gui_passes::TextureDescriptor {
//!     label: "image",
//!     width: 4,
//!     height: 4,
//!     format: gui_passes::TextureFormat::Rgba8Unorm,
//!     usage: gui_passes::TextureUsages::TEXTURE_BINDING,
//!     mip_level_count: 1,
//!     sample_count: 1,
//! }).unwrap();
//! let view = backend.create_view(&texture, "image view").unwrap();
//!
//! let id = registry.get_or_create_binding(&backend, &layout, &view).unwrap();
//! assert_eq!(id.raw(), 100);
//! assert_eq!(registry.get_or_create_binding(&backend, &layout, &view).unwrap(), id);
//! assert!(registry.resolve(id).is_ok());
//! ```
use crate::bindings::TextureId;
use crate::imp::{self, Backend, BindGroupEntry, BindingResource};
use std::collections::HashMap;

/// Who is responsible for releasing a cached view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewOwnership {
    /// Supplied by the caller.  Never released by the registry.
    Borrowed,
    /// Created by the registry from a raw texture.  Released with its binding.
    Owned,
}

/// A binding id together with the bind group it stands for.
#[derive(Debug)]
pub struct ResourceSetInfo<B: Backend> {
    pub id: TextureId,
    pub bind_group: B::BindGroup,
    view: B::TextureView,
    ownership: ViewOwnership,
}

impl<B: Backend> ResourceSetInfo<B> {
    pub fn ownership(&self) -> ViewOwnership {
        self.ownership
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("Unknown texture binding {0}")]
    UnknownBinding(TextureId),
    #[error("Can't create texture binding: {0}")]
    Backend(#[from] imp::Error),
}

#[derive(Debug)]
pub struct TextureRegistry<B: Backend> {
    by_view: HashMap<B::TextureView, TextureId>,
    by_id: HashMap<TextureId, ResourceSetInfo<B>>,
    auto_views: HashMap<B::Texture, B::TextureView>,
    base: u64,
    next_id: u64,
}

impl<B: Backend> TextureRegistry<B> {
    /// `base` is the first id handed out.  It must be above the reserved ids.
    pub fn new(base: u64) -> Self {
        let base = base.max(TextureId::FONT_ATLAS.raw() + 1);
        Self {
            by_view: HashMap::new(),
            by_id: HashMap::new(),
            auto_views: HashMap::new(),
            base,
            next_id: base,
        }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn contains_view(&self, view: &B::TextureView) -> bool {
        self.by_view.contains_key(view)
    }

    /// The id of `view`, if it is registered.
    pub fn id_of(&self, view: &B::TextureView) -> Option<TextureId> {
        self.by_view.get(view).copied()
    }

    /**
    Returns the binding id for `view`, creating a bind group for it on first use.

    `layout` is the single-texture layout the bind group is created against.
    */
    pub fn get_or_create_binding(
        &mut self,
        backend: &B,
        layout: &B::BindGroupLayout,
        view: &B::TextureView,
    ) -> Result<TextureId, RegistryError> {
        self.bind_view(backend, layout, view, ViewOwnership::Borrowed)
    }

    /**
    Like [Self::get_or_create_binding], but for a raw texture.

    A default view is created (once per texture) and owned by the registry.
    */
    pub fn get_or_create_texture_binding(
        &mut self,
        backend: &B,
        layout: &B::BindGroupLayout,
        texture: &B::Texture,
    ) -> Result<TextureId, RegistryError> {
        if let Some(view) = self.auto_views.get(texture) {
            let view = view.clone();
            return self.bind_view(backend, layout, &view, ViewOwnership::Owned);
        }
        let view = backend.create_view(texture, "gui_passes auto view")?;
        match self.bind_view(backend, layout, &view, ViewOwnership::Owned) {
            Ok(id) => {
                self.auto_views.insert(texture.clone(), view);
                Ok(id)
            }
            Err(e) => {
                backend.release_view(view);
                Err(e)
            }
        }
    }

    fn bind_view(
        &mut self,
        backend: &B,
        layout: &B::BindGroupLayout,
        view: &B::TextureView,
        ownership: ViewOwnership,
    ) -> Result<TextureId, RegistryError> {
        if let Some(id) = self.by_view.get(view) {
            return Ok(*id);
        }
        let id = TextureId::new(self.next_id);
        let label = format!("gui_passes texture {id}");
        let bind_group = backend.create_bind_group(
            &label,
            layout,
            &[BindGroupEntry {
                binding: 0,
                resource: BindingResource::TextureView(view),
            }],
        )?;
        self.next_id += 1;
        self.by_view.insert(view.clone(), id);
        self.by_id.insert(
            id,
            ResourceSetInfo {
                id,
                bind_group,
                view: view.clone(),
                ownership,
            },
        );
        logwise::trace_sync!("registered texture binding {id}", id = id.raw());
        Ok(id)
    }

    /// Forgets `view` and releases its bind group.  Unknown views are ignored.
    pub fn release_view(&mut self, backend: &B, view: &B::TextureView) {
        let Some(id) = self.by_view.remove(view) else {
            return;
        };
        if let Some(info) = self.by_id.remove(&id) {
            if info.ownership == ViewOwnership::Owned {
                self.auto_views.retain(|_, v| v != &info.view);
            }
            Self::release_info(backend, info);
        }
    }

    /// Forgets the view created for `texture`, releasing it and its bind group.
    /// Unknown textures are ignored.
    pub fn release_texture(&mut self, backend: &B, texture: &B::Texture) {
        let Some(view) = self.auto_views.remove(texture) else {
            return;
        };
        match self.by_view.remove(&view) {
            Some(id) => {
                if let Some(info) = self.by_id.remove(&id) {
                    Self::release_info(backend, info);
                }
            }
            None => backend.release_view(view),
        }
    }

    /// The bind group for `id`.
    pub fn resolve(&self, id: TextureId) -> Result<&B::BindGroup, RegistryError> {
        self.by_id
            .get(&id)
            .map(|info| &info.bind_group)
            .ok_or(RegistryError::UnknownBinding(id))
    }

    /// Releases every bind group and owned view and resets ids to the base.
    pub fn clear(&mut self, backend: &B) {
        let released = self.by_id.len();
        self.by_view.clear();
        self.auto_views.clear();
        for (_, info) in self.by_id.drain() {
            Self::release_info(backend, info);
        }
        self.next_id = self.base;
        if released > 0 {
            logwise::info_sync!("released {n} texture bindings", n = released);
        }
    }

    fn release_info(backend: &B, info: ResourceSetInfo<B>) {
        backend.release_bind_group(info.bind_group);
        if info.ownership == ViewOwnership::Owned {
            backend.release_view(info.view);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imp::recording::{Handle, RecordingBackend};
    use crate::imp::{BindingKind, LayoutEntry, Stage, TextureDescriptor, TextureFormat, TextureUsages};

    fn setup() -> (RecordingBackend, Handle, TextureRegistry<RecordingBackend>) {
        let backend = RecordingBackend::new();
        let layout = backend
            .create_bind_group_layout(
                "texture layout",
                &[LayoutEntry {
                    binding: 0,
                    stage: Stage::Fragment,
                    kind: BindingKind::Texture2D,
                }],
            )
            .unwrap();
        (backend, layout, TextureRegistry::new(100))
    }

    fn texture(backend: &RecordingBackend) -> Handle {
        backend
            .create_texture(&TextureDescriptor {
                label: "t",
                width: 2,
                height: 2,
                format: TextureFormat::Rgba8Unorm,
                usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
                mip_level_count: 1,
                sample_count: 1,
            })
            .unwrap()
    }

    #[test]
    fn ids_start_at_base_and_increase() {
        let (backend, layout, mut registry) = setup();
        let t = texture(&backend);
        let a = backend.create_view(&t, "a").unwrap();
        let b = backend.create_view(&t, "b").unwrap();
        let id_a = registry.get_or_create_binding(&backend, &layout, &a).unwrap();
        let id_b = registry.get_or_create_binding(&backend, &layout, &b).unwrap();
        assert_eq!(id_a, TextureId::new(100));
        assert_eq!(id_b, TextureId::new(101));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn base_never_collides_with_reserved_ids() {
        let registry = TextureRegistry::<RecordingBackend>::new(0);
        assert_eq!(registry.next_id, 2);
    }

    #[test]
    fn borrowed_views_are_not_released() {
        let (backend, layout, mut registry) = setup();
        let t = texture(&backend);
        let view = backend.create_view(&t, "v").unwrap();
        let id = registry.get_or_create_binding(&backend, &layout, &view).unwrap();
        let bind_group = *registry.resolve(id).unwrap();
        registry.release_view(&backend, &view);
        assert_eq!(backend.release_count(bind_group), 1);
        assert_eq!(backend.release_count(view), 0);
        assert!(matches!(
            registry.resolve(id),
            Err(RegistryError::UnknownBinding(x)) if x == id
        ));
    }

    #[test]
    fn texture_views_are_created_once_and_owned() {
        let (backend, layout, mut registry) = setup();
        let t = texture(&backend);
        let first = registry
            .get_or_create_texture_binding(&backend, &layout, &t)
            .unwrap();
        let second = registry
            .get_or_create_texture_binding(&backend, &layout, &t)
            .unwrap();
        assert_eq!(first, second);
        let views: Vec<_> = backend
            .calls()
            .into_iter()
            .filter(|c| matches!(c, crate::imp::recording::Call::CreateView { .. }))
            .collect();
        assert_eq!(views.len(), 1);
        assert_eq!(registry.auto_views.len(), 1);
        let view = *registry.auto_views.get(&t).unwrap();
        assert_eq!(registry.by_id[&first].ownership(), ViewOwnership::Owned);

        registry.release_texture(&backend, &t);
        assert_eq!(backend.release_count(view), 1);
        assert!(registry.is_empty());
        assert!(registry.resolve(first).is_err());
    }

    #[test]
    fn failed_bind_group_releases_auto_view() {
        let (backend, layout, mut registry) = setup();
        let t = texture(&backend);
        backend.fail_labels_containing("gui_passes texture");
        assert!(registry
            .get_or_create_texture_binding(&backend, &layout, &t)
            .is_err());
        assert!(registry.auto_views.is_empty());
        let live_views = backend
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                crate::imp::recording::Call::CreateView { handle, .. } => Some(handle),
                _ => None,
            })
            .filter(|h| backend.is_live(*h))
            .count();
        assert_eq!(live_views, 0);
    }

    #[test]
    fn unknown_releases_are_ignored() {
        let (backend, _layout, mut registry) = setup();
        let t = texture(&backend);
        let view = backend.create_view(&t, "v").unwrap();
        backend.clear_calls();
        registry.release_view(&backend, &view);
        registry.release_texture(&backend, &t);
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn clear_resets_counter() {
        let (backend, layout, mut registry) = setup();
        let t = texture(&backend);
        let view = backend.create_view(&t, "v").unwrap();
        registry.get_or_create_binding(&backend, &layout, &view).unwrap();
        registry.get_or_create_texture_binding(&backend, &layout, &t).unwrap();
        registry.clear(&backend);
        assert!(registry.is_empty());
        assert_eq!(backend.release_count(view), 0);
        let again = registry.get_or_create_binding(&backend, &layout, &view).unwrap();
        assert_eq!(again, TextureId::new(100));
    }
}
