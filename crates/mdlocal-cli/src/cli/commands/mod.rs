//! CLI command handlers, one per file.

mod config;
mod refs;
mod run;
mod scan;

pub use config::run_config;
pub use refs::run_refs;
pub use run::run_localize;
#[cfg(test)]
pub use run::format_summary;
pub use scan::run_scan;
