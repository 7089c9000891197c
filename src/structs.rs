pub mod jobs;
pub mod members;
pub mod schedule;
