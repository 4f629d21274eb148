//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod grouping;
pub mod merge;
pub mod seed;

pub use entities::*;
pub use error::DomainError;
pub use grouping::{group_by_status, StatusGroup, StatusGroups};
pub use merge::{lenient_list, merge_images, LenientList, TreeFields, TreeRecord};
