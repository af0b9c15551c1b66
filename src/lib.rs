//! Dotfiles installer.
//!
//! Links every entry of a dotfiles store (`<root>/data/home`) into `$HOME`,
//! and the entries of its `.config` directory into `$HOME/.config`. Anything
//! already occupying a link path is moved to a timestamped backup first;
//! nothing is ever deleted.
//!
//! The public API is organised into layers:
//!
//! - **[`reconcile`]**: make one path a symlink to one target, with backup
//!   and restore
//! - **[`operations`]**: the filesystem calls the reconciler makes, behind a
//!   mockable trait
//! - **[`tasks`]**: named units of work (link home, link config, shell hook,
//!   tools) built on the layers above
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod operations;
pub mod reconcile;
pub mod shell;
pub mod tasks;
pub mod tools;
