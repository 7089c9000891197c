pub mod members;
pub mod schedule;
