/*! The rendering component of gui_passes */

pub use renderer::{RenderError, Renderer};

mod renderer;

pub mod config;
pub mod frame;
pub mod projection;
pub mod resource_cache;
pub mod shader;
pub mod translator;

pub use config::RendererConfig;
pub use frame::{FrameAction, FrameEvent, FrameState};
pub use resource_cache::{BufferGrowth, BufferKind, ResourceCache};
pub use translator::{DrawListTranslator, FrameStats, ScissorRect};
