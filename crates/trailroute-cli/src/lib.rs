//! Trailroute CLI library.
//!
//! Output formatting and terminal helpers shared by the `trailroute-cli`
//! binary's subcommands.

pub mod output;
pub mod terminal;
