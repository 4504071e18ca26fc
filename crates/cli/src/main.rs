use std::process::ExitCode;

fn main() -> ExitCode {
    abmdesk_cli::run()
}
