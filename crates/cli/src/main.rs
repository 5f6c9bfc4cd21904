use std::process::ExitCode;

fn main() -> ExitCode {
    sitterfied_cli::run()
}
