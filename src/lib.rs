//! Workstation provisioning engine.
//!
//! Brings a fresh macOS, Ubuntu, Fedora or Windows machine to a
//! ready-to-code state through a fixed sequence of numbered, idempotent
//! steps, then checks the result with a verification battery.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: the embedded TOML defaults and user overrides
//! - **[`actions`]**: idempotent `check + apply` primitives (packages, tools, managed files)
//! - **[`steps`]**: numbered units of work wired to actions, and the full [`steps::catalog`]
//! - **[`commands`]**: subcommand orchestration (`run`, `verify`, `steps`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod actions;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod fetch;
pub mod logging;
pub mod operations;
pub mod platform;
pub mod prompt;
pub mod runner;
pub mod skip_state;
pub mod steps;
pub mod verify;
