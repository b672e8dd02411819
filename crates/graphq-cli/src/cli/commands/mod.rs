//! CLI command handlers. Each command is in its own file.

mod completions;
mod run;
mod sample;
mod show_config;

pub use completions::run_completions;
pub use run::{run_batch, RunArgs};
pub use sample::run_sample;
pub use show_config::run_show_config;
