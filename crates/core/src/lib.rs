// Itemflow Core
//
// Item domain types and the collaborators the batch engine depends on.
//
// Key design decisions:
// - Persistence is behind the async ItemStore trait so the engine never knows the backend
// - InMemoryItemStore backs the CLI and the test suites
// - Validation only guards the plain save path (ItemService); the engine never validates
// - Telemetry setup lives here so every binary logs the same way

pub mod item;
pub mod memory;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod validation;

// Re-exports for convenience
pub use item::{status, Item, ItemId};
pub use memory::InMemoryItemStore;
pub use service::{ItemService, ServiceError};
pub use store::{ItemStore, StoreError};
pub use validation::{is_valid_email, validate_item, ValidationError};
