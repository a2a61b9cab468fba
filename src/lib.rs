pub mod brain;
pub mod cli;
pub mod config;
pub mod conventions;
pub mod discovery;
pub mod error;
pub mod evidence;
pub mod exit;
pub mod graph;
pub mod pipeline;
pub mod profile;
pub mod render;
pub mod reporting;
pub mod rules;
pub mod snapshot;
pub mod storage;
pub mod structure;
pub mod utils;
pub mod workflows;
