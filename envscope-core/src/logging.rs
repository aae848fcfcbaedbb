//! Structured logging using **tracing**.
//!
//! Skipped files, walk errors and scan timings are emitted as tracing
//! events from the core. The subscriber writes JSON to stderr so stdout
//! stays reserved for reports and generated templates.

/// Initializes the global tracing collector (subscriber).
///
/// Call *once* at the start of the process. Safe to call again: later calls
/// are ignored instead of panicking.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=envscope_core=warn`)
pub fn init_structured_logging() {
    let _ = tracing_subscriber::fmt()
        .json() // Output logs in JSON format
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr) // Keeps stdout clean for tool output
        .try_init();
}
