pub mod dataset;
pub mod store;
