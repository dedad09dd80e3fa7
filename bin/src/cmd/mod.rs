//! CLI subcommand modules.
//!
//! This module contains the implementations for all tsmom CLI subcommands.

pub(crate) mod estimators;
pub(crate) mod portfolio;
pub(crate) mod simulate;
pub(crate) mod sweep;
