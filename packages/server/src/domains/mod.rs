// Business domains
pub mod events;
pub mod jobs;
