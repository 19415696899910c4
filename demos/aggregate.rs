use icingaplugin::{CheckResult, ResultAggregator, CRITICAL, OK, WARNING};

// A check probing several mount points and reporting the worst outcome.
//
// Usage: cargo run --example aggregate

fn main() {
    let mut agg = ResultAggregator::new();

    agg.add(CheckResult::new(OK).with_message("/ at 40%"));
    agg.add(CheckResult::new(CRITICAL).with_message("/var at 97%"));
    agg.add(CheckResult::new(WARNING).with_message("/home at 85%"));
    agg.add(CheckResult::new(OK).with_message("/boot at 12%"));

    // Prints "CRIT: /var at 97% WARN: /home at 85% OK: / at 40%, /boot at 12%"
    // and exits with an exit code of 2
    agg.reduce(None).print_and_exit();
}
