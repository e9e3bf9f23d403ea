// Command line interface: argument parsing, command handlers and console output
mod args;
mod commands;
mod display;

pub use args::Cli;
pub use commands::run;
