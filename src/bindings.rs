/*! Binding ids and the registry that turns texture views into bind groups. */

mod texture_id;
pub mod registry;

pub use texture_id::TextureId;
pub use registry::{RegistryError, TextureRegistry, ViewOwnership};
