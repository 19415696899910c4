use clap::Parser;

use icingaplugin::{CheckOptions, CheckResult, MetricValue};

// A full check with the standard command line options.
//
// Usage: cargo run --example check_users --features clap -- -w 0:40 -c 0:60

#[derive(Parser)]
struct Args {
    #[command(flatten)]
    common: CheckOptions,
}

fn main() {
    let args = Args::parse();

    // A real check would query the system here.
    let users = 27;

    let severity = args.common.classify(users as f64);

    let mut metric = MetricValue::new("users", users.to_string()).expect("count is numeric");
    metric.set_warn(args.common.warning.clone());
    metric.set_crit(args.common.critical.clone());

    let mut result =
        CheckResult::new(severity).with_message(format!("{} users logged in", users));
    result.set_metric(metric);

    result.print_and_exit();
}
