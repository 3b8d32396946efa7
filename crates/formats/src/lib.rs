pub mod manifest;
pub mod scene_loader;

pub use manifest::*;
pub use scene_loader::*;
