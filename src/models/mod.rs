pub mod concept;
pub mod entity;
pub mod enums;
pub mod mapping;

pub use concept::*;
pub use entity::*;
pub use enums::*;
pub use mapping::*;
