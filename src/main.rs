//! Binary entry point for the `bonsai` benchmark tool.
//!
//! Parses the argument vector, dispatches to the library's run loop, and
//! exits with its status code. All resources are released by RAII.

use bonsai_tries::cli::{parse_args_from, run, usage};

fn main() {
    let exe = std::env::args().next().unwrap_or_else(|| "bonsai".to_owned());
    let argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match parse_args_from(&argv) {
        Ok(cmd) => cmd,
        Err(err) => {
            eprintln!("bonsai: {err}");
            eprintln!("usage: {}", usage(&exe));
            std::process::exit(1);
        }
    };

    std::process::exit(run(cmd));
}
