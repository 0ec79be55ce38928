//! The product database: a single actuarial parameter (C2) composed into a
//! keyed, index-bound collection (C3), loaded from a product-definition
//! file.

pub mod entity;
pub mod keys;
pub mod loader;
pub mod product_db;

pub use entity::DatabaseEntity;
pub use keys::DatabaseKey;
pub use product_db::{FromF64Exact, ProductDatabase};
