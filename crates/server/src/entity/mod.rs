//! SeaORM entities for the durable data model.

pub mod identity;
pub mod menu_item;
pub mod restaurant;
