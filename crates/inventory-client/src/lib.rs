//! # Inventory Client
//!
//! [`TagClient`](tag_reconciler::TagClient) implementations for the remote
//! resource inventory.
//!
//! - [`HttpInventoryClient`] posts tag mutations to the inventory's JSON API
//!   using a blocking reqwest client.
//! - [`InMemoryInventory`] keeps tags in process memory; the CLI uses it for
//!   dry runs and tests use it to observe call order.

mod error;
mod http;
mod memory;

pub use error::{InventoryError, InventoryResult};
pub use http::HttpInventoryClient;
pub use memory::{InMemoryInventory, InventoryCall};
