pub mod sink;
pub mod visualize;
