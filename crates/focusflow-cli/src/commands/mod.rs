pub mod config;
pub mod insight;
pub mod settings;
pub mod stats;
pub mod timer;

/// Pretty-print a value as JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
