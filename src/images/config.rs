// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::images::resource_cache::BufferGrowth;
use crate::images::shader::ShaderSource;
use crate::imp::TextureFormat;

/// First id handed out by the texture registry.
pub const DEFAULT_BINDING_ID_BASE: u64 = 100;

/**
Construction-time settings for a [Renderer](crate::images::Renderer).

```
use gui_passes::images::{BufferGrowth, RendererConfig};
use gui_passes::TextureFormat;

let config = RendererConfig::new(TextureFormat::Bgra8Unorm)
    .with_growth(BufferGrowth { factor: 2.0, alignment: 256 })
    .with_label("overlay");
assert_eq!(config.binding_id_base, 100);
```
*/
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Format of the render target the pipeline draws into.
    pub render_target_format: TextureFormat,
    pub growth: BufferGrowth,
    pub binding_id_base: u64,
    pub shader: ShaderSource,
    /// Prefix for every GPU object label.
    pub label: String,
}

impl RendererConfig {
    pub fn new(render_target_format: TextureFormat) -> Self {
        RendererConfig {
            render_target_format,
            growth: BufferGrowth::default(),
            binding_id_base: DEFAULT_BINDING_ID_BASE,
            shader: ShaderSource::default(),
            label: "gui_passes".to_string(),
        }
    }

    pub fn with_growth(mut self, growth: BufferGrowth) -> Self {
        self.growth = growth;
        self
    }

    pub fn with_binding_id_base(mut self, base: u64) -> Self {
        self.binding_id_base = base;
        self
    }

    pub fn with_shader(mut self, shader: ShaderSource) -> Self {
        self.shader = shader;
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub(crate) fn label_for(&self, what: &str) -> String {
        format!("{} {}", self.label, what)
    }
}
