//! Output mode flags and printing helpers shared by all commands.
//!
//! Global flags are set once by `main` through environment variables so
//! every command can check them without threading them through.

use serde::Serialize;

pub const JSON_ENV: &str = "MOCKCRAFT_JSON";
pub const QUIET_ENV: &str = "MOCKCRAFT_QUIET";

fn flag(key: &str) -> bool {
    std::env::var(key).map(|v| v == "1").unwrap_or(false)
}

pub fn is_json() -> bool {
    flag(JSON_ENV)
}

pub fn is_quiet() -> bool {
    flag(QUIET_ENV)
}

/// Pretty-print a value as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("  Error: failed to serialize output: {e}"),
    }
}

/// Print a human-readable line unless `--quiet` or `--json` is active.
pub fn say(line: impl AsRef<str>) {
    if !is_quiet() && !is_json() {
        println!("{}", line.as_ref());
    }
}
