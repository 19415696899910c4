use crate::{classify, Range, RangeFormatError, Severity};

/// The standard command line options every check understands, ready to be
/// embedded into a check specific argument struct:
///
/// ```rust
/// use clap::Parser;
/// use icingaplugin::CheckOptions;
///
/// #[derive(Parser)]
/// struct CheckLoadArgs {
///     #[command(flatten)]
///     common: CheckOptions,
///
///     /// Use the 15 minute average instead of the 1 minute one.
///     #[arg(long)]
///     long_average: bool,
/// }
///
/// let args = CheckLoadArgs::parse_from(["check_load", "-w", "10:20", "-vv"]);
/// assert_eq!(args.common.verbosity, 2);
/// ```
///
/// The warning and critical ranges are parsed while the command line is
/// parsed, so a malformed range surfaces as a usage error before any check
/// logic runs.
#[derive(Debug, Clone, clap::Args)]
pub struct CheckOptions {
    /// Host this check targets, if applicable.
    #[arg(short = 'H', long)]
    pub hostname: Option<String>,

    /// Range in which the measured value is considered a warning.
    #[arg(short, long, value_parser = parse_range)]
    pub warning: Option<Range>,

    /// Range in which the measured value is considered critical.
    #[arg(short, long, value_parser = parse_range)]
    pub critical: Option<Range>,

    /// Timeout for this check in seconds. Enforcement is up to the caller.
    #[arg(short, long, default_value_t = 0)]
    pub timeout: u64,

    /// Verbosity; repeat for more, e.g. -vvv.
    #[arg(short, action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl CheckOptions {
    /// Classifies a measured value against the warning and critical ranges
    /// given on the command line.
    pub fn classify(&self, value: f64) -> Severity {
        classify(value, self.warning.as_ref(), self.critical.as_ref())
    }
}

fn parse_range(s: &str) -> Result<Range, RangeFormatError> {
    s.parse()
}
