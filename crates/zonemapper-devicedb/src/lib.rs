//! Zone Mapper Device Registry
//!
//! Read-only view of the host's device and entity registries, used to fill
//! the device picker and to suggest X/Y tracking pairs.

pub mod error;
pub mod model;
pub mod registry;
pub mod source;
pub mod suggest;

pub use error::{RegistryError, RegistryResult};
pub use model::{DeviceEntry, EntityEntry};
pub use registry::DeviceRegistry;
pub use source::{RegistrySource, StaticRegistrySource};
pub use suggest::{guess_y_sibling, suggest_pairs};
