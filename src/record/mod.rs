pub mod bulk;
pub mod model;
