//! Rendering of packaging results, saved project lists and messages.
//!
//! `--json` selects machine-readable output and ignores `--verbose` and
//! `--quiet`. Each result, warning or error is printed as its own JSON
//! document on stdout.

mod formatter;
mod human;
mod json;

pub use formatter::OutputFormatter;

use human::HumanFormatter;
use json::JsonFormatter;

/// Picks the formatter for the global `--json`, `--verbose` and `--quiet` flags.
pub fn create_formatter(json: bool, verbose: bool, quiet: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(HumanFormatter::new(verbose, quiet))
    }
}
