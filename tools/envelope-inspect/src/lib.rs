//! Library half of `envelope-inspect`: configuration and subcommands.

pub mod commands;
pub mod config;
