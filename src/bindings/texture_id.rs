// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use std::fmt::Display;

/**
An opaque texture handle the host passes to UI widgets.

Ids are assigned by the renderer.  Two values are reserved: [TextureId::NULL] ("keep whatever is
bound") and [TextureId::FONT_ATLAS], which the renderer hands to the UI library for its font
atlas.  Registry ids start above both.
*/
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TextureId(u64);

impl TextureId {
    pub const NULL: TextureId = TextureId(0);
    pub const FONT_ATLAS: TextureId = TextureId(1);

    pub const fn new(raw: u64) -> Self {
        TextureId(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for TextureId {
    fn from(raw: u64) -> Self {
        TextureId(raw)
    }
}

impl From<TextureId> for u64 {
    fn from(id: TextureId) -> Self {
        id.0
    }
}

impl Display for TextureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            TextureId::NULL => write!(f, "#null"),
            TextureId::FONT_ATLAS => write!(f, "#font-atlas"),
            TextureId(raw) => write!(f, "#{}", raw),
        }
    }
}
