pub mod indexer;
pub mod inverted;
pub mod registry;
