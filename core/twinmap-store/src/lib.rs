//! Storage side of twinmap.
//!
//! - [`TwinStore`]: the operations a digital twin graph store offers
//! - [`InMemoryTwinStore`]: a store held in process memory
//! - [`TwinRepository`]: typed save/load/delete over any store, mapping
//!   values with `twinmap_model`

mod config;
mod error;
mod memory;
mod repository;
mod store;

pub use config::RepositoryConfig;
pub use error::{RepositoryError, RepositoryResult, StoreError, StoreResult};
pub use memory::InMemoryTwinStore;
pub use repository::TwinRepository;
pub use store::{ModelData, TwinStore};
