pub mod args;
pub mod commands;

pub use args::{Cli, Commands, GenerateArgs};
pub use commands::{run, RunOutcome};
