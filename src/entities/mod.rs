//! SeaORM entities.

pub mod prelude;

pub mod documents;
