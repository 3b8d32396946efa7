pub mod document;
pub mod entity;
pub mod host;
pub mod selector;
pub mod visibility;

pub use document::*;
pub use entity::*;
pub use host::*;
pub use selector::*;
pub use visibility::*;
