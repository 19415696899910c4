use std::env::args;

use icingaplugin::{classify, CheckResult, MetricValue, Range, Unit};

// Usage: cargo run --example metric -- <value>

fn main() {
    // Grab the first argument
    let value: f64 = args()
        .nth(1)
        .expect("provide an argument")
        .parse()
        .expect("argument should be a number");

    let warning: Range = "0:80".parse().unwrap();
    let critical: Range = "0:90".parse().unwrap();

    let severity = classify(value, Some(&warning), Some(&critical));

    let mut result =
        CheckResult::new(severity).with_message(format!("disk usage is {}%", value));

    result.set_metric(
        MetricValue::new("usage", value.to_string())
            .expect("value is numeric")
            .with_unit(Unit::Percent)
            .with_warn(warning)
            .with_crit(critical),
    );

    // Prints status, perfdata, and exits
    result.print_and_exit();
}
