pub mod curve;
pub mod generator;
pub mod store;
