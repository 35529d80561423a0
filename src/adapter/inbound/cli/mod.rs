//! CLI module graph.

pub mod bucket;
pub mod command;
pub mod config;
pub mod output;
pub mod retrieve;
pub mod run;
