//! CLI command implementations.

mod config;
mod doctor;
mod history;
mod run;
mod serve;
mod trigger;

pub use config::run_config;
pub use doctor::run_doctor;
pub use history::run_history;
pub use run::run_analyze;
pub use serve::{router, run_serve};
pub use trigger::{run_trigger, trigger_inputs};
