//! Command handlers and terminal output for the `curio` binary

pub mod commands;
pub mod display;
