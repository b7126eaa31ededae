pub mod branch;
pub mod config;
pub mod error;
pub mod git;
pub mod processor;
pub mod publisher;
pub mod reconcile;
pub mod working_copy;
