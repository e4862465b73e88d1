// Job List Update API - Core
//
// This crate provides the backend for syncing job postings from the JobsGlobal
// feed into Postgres and maintaining their semantic embeddings. The reindex
// engine in kernel/ drives both the post-sync refresh and the administrative
// full reindex.

pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
