//! Data access for each table. Functions take any SQLite executor so they run
//! against the pool or inside an open transaction.

pub mod contacts;
pub mod products;
pub mod purchase_orders;
pub mod vendors;
