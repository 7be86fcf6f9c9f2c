//! `nvg`: directional focus navigation for Linux desktops.
//!
//! A single invocation decides whether a keystroke moves focus inside the
//! currently focused application (editor splits, multiplexer panes,
//! terminal splits) or between windows of the host window manager, then
//! performs exactly one such action. See [cli::Cli] for the entry point.
#![warn(missing_docs)]

pub mod backend;
pub mod cli;
pub mod debug;
pub mod detector;
pub mod direction;
pub mod error;
pub mod hooks;
pub mod msgpack;
pub mod proc;
pub mod resolver;
pub mod sockio;
pub mod types;
