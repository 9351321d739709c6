//! Database Models

// Serde helpers
pub mod serde_helpers;

// Billing
pub mod bill;
pub mod held_order;

// Location
pub mod dining_table;

// Catalog
pub mod product;
pub mod restaurant;

// Subscription
pub mod subscription;

// Re-exports
pub use bill::{
    Bill, BillChanges, BillFilter, BillPatch, LineItem, PaymentMethodBucket, PaymentMethodUpdate,
    StatusBucket,
};
pub use dining_table::{
    DiningTable, DiningTableBulkCreate, DiningTableCreate, DiningTableStatusUpdate,
};
pub use held_order::{HeldOrder, HeldOrderCreate};
pub use product::{
    Product, ProductCreate, ProductUpdate, ProductVariant, PublicMenuItem, StockUpdate,
};
pub use restaurant::{Restaurant, RestaurantUpsert};
pub use subscription::{PaymentRef, Subscription};
