//! saurieng: durian orchard tracker
//!
//! Gardens are named grids; each planted cell holds one tree record with
//! photos and harvest logs. Served over HTTP and usable from the CLI.
//!
//! Layers, inner to outer:
//! - `domain`: entities, upsert-merge rules, grouping, seed data
//! - `application`: services over an injected store
//! - `infrastructure`: store adapters, filesystem, DI container
//! - `server` / `cli`: the two outer surfaces

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod server;
pub mod util;
