// Entrypoint for the CLI application.
// - Keeps `main` small: parse, dispatch and turn the outcome into an exit
//   code. See `cli::run`.

use std::process::ExitCode;

fn main() -> ExitCode {
    ExitCode::from(shortify::run(std::env::args_os()))
}
