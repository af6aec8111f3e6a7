//! Binary entrypoint for the Mitraa terminal chat client.

use std::process::ExitCode;

use mitraa_chat::start_mitraa;

/// Run an interactive chat session against the configured backend.
fn main() -> ExitCode {
    start_mitraa::run()
}
