use std::env::args;

use icingaplugin::{CheckResult, CRITICAL, OK, UNKNOWN};

// Usage: cargo run --example simple -- haaa
//        cargo run --example simple -- itsfine

fn main() {
    // Grab the first argument
    let arg = args().nth(1).expect("provide an argument");

    // Check logic goes here
    let result = match arg.as_ref() {
        "itsfine" => CheckResult::new(OK).with_message("Everything is fine :-)"),
        "haaa" => CheckResult::new(CRITICAL).with_message("Something went terribly wrong!"),
        _ => CheckResult::new(UNKNOWN).with_message("unexpected argument"),
    };

    // Prints the status line and exits with the matching exit code
    result.print_and_exit();
}
