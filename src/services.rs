pub mod aggregator;
pub mod rotation;
