//! Domain enums
//!
//! Shared between the server and its clients (via API). Persisted entities
//! live in `pos-server::db::models`; the enums they carry live here.

pub mod bill;
pub mod product;
pub mod subscription;
pub mod table;

// Re-exports
pub use bill::*;
pub use product::*;
pub use subscription::*;
pub use table::*;
