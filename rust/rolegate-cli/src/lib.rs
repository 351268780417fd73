//! The `rolegate` command line tool: a thin administrative client that issues
//! access-control instructions and bulk reads against a store on disk.

pub mod cli;
pub mod command;
pub mod config;
pub mod keys;
