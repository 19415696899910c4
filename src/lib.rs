//! The icingaplugin crate provides the basic utilities to make it easy to write
//! nagios/icinga checks: threshold ranges, severities with exit codes,
//! performance data and check result formatting.
//!
//! A check computes a value, classifies it against the warning/critical ranges
//! and emits one line of output which the monitoring system parses:
//!
//! ```rust
//! use icingaplugin::{classify, CheckResult, MetricValue, Range, OK};
//!
//! let warning: Range = "0:40".parse().unwrap();
//! let critical: Range = "0:60".parse().unwrap();
//!
//! let severity = classify(27.0, Some(&warning), Some(&critical));
//! assert_eq!(severity, OK);
//!
//! let mut result = CheckResult::new(severity).with_message("27 users logged in");
//! result.set_metric(
//!     MetricValue::new("users", "27")
//!         .unwrap()
//!         .with_warn(warning)
//!         .with_crit(critical),
//! );
//! // Ranges serialize canonically, so the start of 0 is omitted.
//! assert_eq!(result.to_string(), "OK: 27 users logged in|users=27;40;60;;");
//!
//! // Prints the line above and exits with an exit code of 0 in this case.
//! // result.print_and_exit();
//! ```

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::process;
use std::str::FromStr;

#[macro_use]
mod macros;

mod runner;
pub use crate::runner::{Runner, RunnerResult};

#[cfg(feature = "clap")]
mod options;
#[cfg(feature = "clap")]
pub use crate::options::CheckOptions;

/// Severity of a check outcome: a human readable label plus the process exit
/// code the monitoring system maps back to a service state.
///
/// Ordering and equality go by exit code alone, so two differently labelled
/// severities with the same exit code compare equal. The four canonical
/// severities are exported as the constants [OK], [WARNING], [CRITICAL] and
/// [UNKNOWN]; [Severity::custom] builds anything beyond those.
#[derive(Debug, Clone)]
pub struct Severity {
    label: Cow<'static, str>,
    exit_code: i32,
}

/// Everything is fine. Exit code 0.
pub const OK: Severity = Severity::new("OK", 0);
/// The value breached the warning range. Exit code 1.
pub const WARNING: Severity = Severity::new("WARN", 1);
/// The value breached the critical range. Exit code 2.
pub const CRITICAL: Severity = Severity::new("CRIT", 2);
/// The check could not determine a state. Exit code 3.
pub const UNKNOWN: Severity = Severity::new("UNKNOWN", 3);

impl Severity {
    /// Creates a severity from a static label and an exit code.
    pub const fn new(label: &'static str, exit_code: i32) -> Severity {
        Severity {
            label: Cow::Borrowed(label),
            exit_code,
        }
    }

    /// Creates a severity with an owned label, for levels outside the
    /// canonical four.
    pub fn custom(label: impl Into<String>, exit_code: i32) -> Severity {
        Severity {
            label: Cow::Owned(label.into()),
            exit_code,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the process exit code signalling this severity.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl PartialEq for Severity {
    fn eq(&self, other: &Severity) -> bool {
        self.exit_code == other.exit_code
    }
}

impl Eq for Severity {}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Severity) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Severity) -> Ordering {
        self.exit_code.cmp(&other.exit_code)
    }
}

/// Error returned when a threshold range string does not follow the
/// `[@]start:end` format.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RangeFormatError {
    #[error("range must not be empty")]
    Empty,
    #[error("range cannot have more than two parts")]
    TooManyParts,
    #[error("invalid start value: {0}")]
    InvalidStart(String),
    #[error("invalid end value: {0}")]
    InvalidEnd(String),
    #[error("start must be less than or equal to end")]
    StartGreaterThanEnd,
}

/// A threshold range in the `[@]start:end` format used by the `-w` and `-c`
/// plugin options.
///
/// - `10` matches `< 0 OR > 10`
/// - `10:20` matches `< 10 OR > 20`
/// - `@10:20` matches `>= 10 AND <= 20`
/// - `~:20` matches `> 20` (`~` is negative infinity on the start side)
/// - `10:~` matches `< 10` (`~` or nothing is positive infinity on the end)
///
/// Ranges are exclusive by default: [Range::in_range] is true for values
/// *outside* the interval, because a value outside the safe band is the one
/// that breaches the threshold. The `@` prefix inverts this, matching values
/// inside the interval. Do not read `in_range` as set containment.
///
/// ```rust
/// use icingaplugin::Range;
///
/// let range: Range = "10:20".parse().unwrap();
/// assert!(!range.in_range(15.0));
/// assert!(range.in_range(21.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    start: f64,
    end: f64,
    inclusive: bool,
}

impl Range {
    /// Creates a range from its parts. Fails if `start > end`.
    pub fn new(start: f64, end: f64, inclusive: bool) -> Result<Range, RangeFormatError> {
        if start > end {
            return Err(RangeFormatError::StartGreaterThanEnd);
        }

        Ok(Range {
            start,
            end,
            inclusive,
        })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn inclusive(&self) -> bool {
        self.inclusive
    }

    /// Tests whether `value` breaches this range: outside `[start, end]` for
    /// exclusive ranges, inside for inclusive (`@`) ranges.
    pub fn in_range(&self, value: f64) -> bool {
        if self.inclusive {
            value >= self.start && value <= self.end
        } else {
            value < self.start || value > self.end
        }
    }
}

impl FromStr for Range {
    type Err = RangeFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut value = s.trim();
        if value.is_empty() {
            return Err(RangeFormatError::Empty);
        }

        let inclusive = match value.strip_prefix('@') {
            Some(rest) => {
                value = rest;
                true
            }
            None => false,
        };

        let parts: Vec<&str> = value.split(':').collect();
        let (start_part, end_part) = match parts.as_slice() {
            [end] => ("0", *end),
            [start, end] => (*start, *end),
            _ => return Err(RangeFormatError::TooManyParts),
        };

        let start = if start_part == "~" {
            f64::NEG_INFINITY
        } else {
            start_part
                .parse()
                .map_err(|_| RangeFormatError::InvalidStart(start_part.to_owned()))?
        };

        let end = if end_part.is_empty() || end_part == "~" {
            f64::INFINITY
        } else {
            end_part
                .parse()
                .map_err(|_| RangeFormatError::InvalidEnd(end_part.to_owned()))?
        };

        Range::new(start, end, inclusive)
    }
}

impl fmt::Display for Range {
    /// Writes the range back out as a string another plugin would accept.
    /// The text is canonical rather than the original input, but always
    /// parses back to an equivalent range: `0:10` comes back as `10`,
    /// `10:` comes back as `10:~`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inclusive {
            f.write_str("@")?;
        }

        if self.start == f64::NEG_INFINITY {
            f.write_str("~:")?;
        } else if self.start != 0.0 {
            write!(f, "{}:", fmt_bound(self.start))?;
        }

        if self.end == f64::INFINITY {
            f.write_str("~")
        } else {
            f.write_str(&fmt_bound(self.end))
        }
    }
}

/// Integral bounds render without a decimal point, so `10.0` stays `10`.
fn fmt_bound(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Error returned for a unit of measurement outside the fixed set understood
/// by the monitoring system.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid unit of measurement: {0}")]
pub struct MetricUnitError(pub String);

/// Unit of measurement of a performance datapoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    #[default]
    None,
    Seconds,
    Percent,
    Bytes,
    KiloBytes,
    MegaBytes,
    GigaBytes,
    TeraBytes,
    /// A continuously growing counter.
    Counter,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Unit::None => "",
            Unit::Seconds => "s",
            Unit::Percent => "%",
            Unit::Bytes => "b",
            Unit::KiloBytes => "kb",
            Unit::MegaBytes => "mb",
            Unit::GigaBytes => "gb",
            Unit::TeraBytes => "tb",
            Unit::Counter => "c",
        };
        f.write_str(s)
    }
}

impl FromStr for Unit {
    type Err = MetricUnitError;

    /// Parses a unit case-insensitively, so `"KB"` and `"kb"` are the same.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" => Ok(Unit::None),
            "s" => Ok(Unit::Seconds),
            "%" => Ok(Unit::Percent),
            "b" => Ok(Unit::Bytes),
            "kb" => Ok(Unit::KiloBytes),
            "mb" => Ok(Unit::MegaBytes),
            "gb" => Ok(Unit::GigaBytes),
            "tb" => Ok(Unit::TeraBytes),
            "c" => Ok(Unit::Counter),
            _ => Err(MetricUnitError(s.to_owned())),
        }
    }
}

/// Error returned when a performance datapoint is given a malformed field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricValueError {
    #[error("metric label must not be empty")]
    EmptyLabel,
    #[error("value must be in class [-0-9.]: {0:?}")]
    InvalidValue(String),
    #[error("min must be in class [-0-9.]: {0:?}")]
    InvalidMin(String),
    #[error("max must be in class [-0-9.]: {0:?}")]
    InvalidMax(String),
    #[error(transparent)]
    Unit(#[from] MetricUnitError),
    #[error(transparent)]
    Range(#[from] RangeFormatError),
}

/// A single performance datapoint attached to a check result.
///
/// Performance data is not interpreted by the monitoring system itself, but
/// is extracted by graphing and alerting tools downstream, which is why the
/// numeric fields are validated against the character class `[-0-9.]` those
/// tools expect rather than parsed into floats.
///
/// ```rust
/// use icingaplugin::MetricValue;
///
/// let metric = MetricValue::new("users", "27")
///     .unwrap()
///     .with_warn_str("10:40")
///     .unwrap()
///     .with_min("0")
///     .unwrap();
/// assert_eq!(metric.to_string(), "users=27;10:40;;0;");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MetricValue {
    label: String,
    value: String,
    unit: Unit,
    warn: Option<Range>,
    crit: Option<Range>,
    min: Option<String>,
    max: Option<String>,
}

impl MetricValue {
    /// Creates a metric from a label and its value. The label must be
    /// non-empty and the value must match `[-0-9.]+`; a value can never be
    /// absent.
    pub fn new(
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<MetricValue, MetricValueError> {
        let label = label.into();
        if label.is_empty() {
            return Err(MetricValueError::EmptyLabel);
        }

        let value = value.into();
        if !is_valid_value(&value) {
            return Err(MetricValueError::InvalidValue(value));
        }

        Ok(MetricValue {
            label,
            value,
            unit: Unit::None,
            warn: None,
            crit: None,
            min: None,
            max: None,
        })
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    /// Parses and sets the unit from its string form, e.g. `"kb"`.
    pub fn with_unit_str(mut self, unit: &str) -> Result<Self, MetricValueError> {
        self.unit = unit.parse()?;
        Ok(self)
    }

    pub fn with_warn(mut self, warn: Range) -> Self {
        self.warn = Some(warn);
        self
    }

    /// Sets the warning range from a string, parsed eagerly so a bad range
    /// fails here and not at serialization time.
    pub fn with_warn_str(mut self, warn: &str) -> Result<Self, MetricValueError> {
        self.warn = Some(warn.parse::<Range>()?);
        Ok(self)
    }

    pub fn with_crit(mut self, crit: Range) -> Self {
        self.crit = Some(crit);
        self
    }

    /// Sets the critical range from a string, parsed eagerly.
    pub fn with_crit_str(mut self, crit: &str) -> Result<Self, MetricValueError> {
        self.crit = Some(crit.parse::<Range>()?);
        Ok(self)
    }

    /// Sets the minimum possible value for this metric. Must match `[-0-9.]+`.
    pub fn with_min(mut self, min: impl Into<String>) -> Result<Self, MetricValueError> {
        let min = min.into();
        if !is_valid_value(&min) {
            return Err(MetricValueError::InvalidMin(min));
        }
        self.min = Some(min);
        Ok(self)
    }

    /// Sets the maximum possible value for this metric. Must match `[-0-9.]+`.
    pub fn with_max(mut self, max: impl Into<String>) -> Result<Self, MetricValueError> {
        let max = max.into();
        if !is_valid_value(&max) {
            return Err(MetricValueError::InvalidMax(max));
        }
        self.max = Some(max);
        Ok(self)
    }

    /// Replaces the value, re-validated against `[-0-9.]+`.
    pub fn set_value(&mut self, value: impl Into<String>) -> Result<(), MetricValueError> {
        let value = value.into();
        if !is_valid_value(&value) {
            return Err(MetricValueError::InvalidValue(value));
        }
        self.value = value;
        Ok(())
    }

    pub fn set_unit(&mut self, unit: Unit) {
        self.unit = unit;
    }

    pub fn set_warn(&mut self, warn: Option<Range>) {
        self.warn = warn;
    }

    pub fn set_crit(&mut self, crit: Option<Range>) {
        self.crit = crit;
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn warn(&self) -> Option<&Range> {
        self.warn.as_ref()
    }

    pub fn crit(&self) -> Option<&Range> {
        self.crit.as_ref()
    }

    pub fn min(&self) -> Option<&str> {
        self.min.as_deref()
    }

    pub fn max(&self) -> Option<&str> {
        self.max.as_deref()
    }
}

impl fmt::Display for MetricValue {
    /// Writes the metric in the perfdata wire format:
    ///
    /// ```text
    /// label=value[unit];[warn];[crit];[min];[max]
    /// ```
    ///
    /// All four semicolons are always present; unset fields stay empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let warn = self.warn.as_ref().map(Range::to_string).unwrap_or_default();
        let crit = self.crit.as_ref().map(Range::to_string).unwrap_or_default();

        write!(
            f,
            "{}={}{};{};{};{};{}",
            quote_label(&self.label),
            self.value,
            self.unit,
            warn,
            crit,
            self.min.as_deref().unwrap_or(""),
            self.max.as_deref().unwrap_or(""),
        )
    }
}

fn is_valid_value(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || c == '-' || c == '.')
}

/// Labels containing `=`, a space or a single quote get single-quoted with
/// embedded quotes doubled. Everything else passes through unquoted to keep
/// the line short, since consuming systems only read 80 characters.
fn quote_label(label: &str) -> Cow<'_, str> {
    if label.contains('=') || label.contains(' ') || label.contains('\'') {
        Cow::Owned(format!("'{}'", label.replace('\'', "''")))
    } else {
        Cow::Borrowed(label)
    }
}

/// Classifies a measured value against the warning and critical ranges,
/// critical first. A missing range means that tier never triggers, so with
/// neither range the result is always [OK].
///
/// ```rust
/// use icingaplugin::{classify, Range, CRITICAL, OK, WARNING};
///
/// let warning: Range = "10:20".parse().unwrap();
/// let critical: Range = "0:40".parse().unwrap();
///
/// assert_eq!(classify(15.0, Some(&warning), Some(&critical)), OK);
/// assert_eq!(classify(27.0, Some(&warning), Some(&critical)), WARNING);
/// assert_eq!(classify(50.0, Some(&warning), Some(&critical)), CRITICAL);
/// ```
pub fn classify(value: f64, warning: Option<&Range>, critical: Option<&Range>) -> Severity {
    if let Some(critical) = critical {
        if critical.in_range(value) {
            return CRITICAL;
        }
    }

    if let Some(warning) = warning {
        if warning.in_range(value) {
            return WARNING;
        }
    }

    OK
}

/// One evaluated check outcome: a severity, an optional message and the
/// performance data to attach.
///
/// You can also create a result filled with metrics via the *check_result!*
/// macro, which is much like the *vec!* macro.
///
/// ```rust
/// use icingaplugin::{CheckResult, MetricValue, OK};
///
/// let mut result = CheckResult::new(OK).with_message("all good");
/// result.set_metric(MetricValue::new("time", "0.2").unwrap());
/// assert_eq!(result.to_string(), "OK: all good|time=0.2;;;;");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    severity: Severity,
    message: Option<String>,
    metrics: Vec<MetricValue>,
}

impl CheckResult {
    /// Creates a result with the given severity and no message. The severity
    /// is required up front so that no result without one can ever reach
    /// serialization.
    pub fn new(severity: Severity) -> CheckResult {
        CheckResult {
            severity,
            message: None,
            metrics: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn set_severity(&mut self, severity: Severity) {
        self.severity = severity;
    }

    /// Adds a metric, upserting by label: a second metric with the same label
    /// replaces the content of the first but keeps its position in the
    /// output order.
    pub fn set_metric(&mut self, metric: MetricValue) {
        match self.metrics.iter_mut().find(|m| m.label == metric.label) {
            Some(existing) => *existing = metric,
            None => self.metrics.push(metric),
        }
    }

    pub fn severity(&self) -> &Severity {
        &self.severity
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the attached metrics in insertion order.
    pub fn metrics(&self) -> &[MetricValue] {
        &self.metrics
    }

    /// Returns the exit code of this result's severity.
    pub fn exit_code(&self) -> i32 {
        self.severity.exit_code()
    }

    /// Prints the serialized result line and exits with the exit code from
    /// [Self::exit_code].
    pub fn print_and_exit(&self) -> ! {
        println!("{}", self);
        process::exit(self.exit_code());
    }
}

impl fmt::Display for CheckResult {
    /// Writes the line the monitoring system parses:
    ///
    /// ```text
    /// SEVERITY[: MESSAGE][|METRIC[ METRIC...]]
    /// ```
    ///
    /// An example of realistic output:
    ///
    /// ```text
    /// OK: 27 users logged in|users=27;0:40;0:60;;
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.severity.label())?;

        if let Some(message) = self.message.as_deref() {
            if !message.is_empty() {
                write!(f, " {}", message)?;
            }
        }

        if !self.metrics.is_empty() {
            f.write_str("|")?;
            for (i, metric) in self.metrics.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", metric)?;
            }
        }

        Ok(())
    }
}

/// Collects the results of several sub-checks and reduces them to a single
/// worst-case result with a message grouped by severity.
///
/// ```rust
/// use icingaplugin::{CheckResult, ResultAggregator, CRITICAL, OK};
///
/// let mut agg = ResultAggregator::new();
/// agg.add(CheckResult::new(OK).with_message("foo"));
/// agg.add(CheckResult::new(CRITICAL).with_message("bar"));
/// agg.add(CheckResult::new(OK).with_message("baz"));
///
/// let result = agg.reduce(None);
/// assert_eq!(result.severity(), &CRITICAL);
/// assert_eq!(result.message(), Some("bar OK: foo, baz"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResultAggregator {
    results: Vec<CheckResult>,
}

impl ResultAggregator {
    pub fn new() -> ResultAggregator {
        ResultAggregator::default()
    }

    /// Appends a result. Results are kept in insertion order and never
    /// deduplicated.
    pub fn add(&mut self, result: CheckResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Reduces the collected results to one result carrying the worst
    /// severity of the group and a message listing the individual messages
    /// grouped and prefixed by their severity, e.g. `"bar OK: foo, baz"`.
    ///
    /// With nothing collected this returns `fallback` if given, else an [OK]
    /// result with no message. Metrics on the collected results are not
    /// carried over; only severity and message are aggregated.
    pub fn reduce(self, fallback: Option<CheckResult>) -> CheckResult {
        let mut results = self.results;
        if results.is_empty() {
            return fallback.unwrap_or_else(|| CheckResult::new(OK));
        }

        // Stable sort: equal severities keep their insertion order, which
        // the message grouping below depends on.
        results.sort_by(|a, b| b.severity.cmp(&a.severity));

        let severity = results[0].severity.clone();
        let mut last = severity.clone();
        let mut message = results[0].message().unwrap_or("").to_owned();

        for result in &results[1..] {
            if result.severity != last {
                message.push_str(&format!(
                    " {}: {}",
                    result.severity.label(),
                    result.message().unwrap_or("")
                ));
                last = result.severity.clone();
            } else {
                message.push_str(&format!(", {}", result.message().unwrap_or("")));
            }
        }

        let mut reduced = CheckResult::new(severity);
        if !message.is_empty() {
            reduced.message = Some(message);
        }
        reduced
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        classify, CheckResult, MetricValue, Range, RangeFormatError, ResultAggregator, Severity,
        Unit, CRITICAL, OK, UNKNOWN, WARNING,
    };

    fn range(s: &str) -> Range {
        s.parse().unwrap()
    }

    #[test]
    fn test_range_parsing() {
        let r = range("10");
        assert_eq!(r.start(), 0.0);
        assert_eq!(r.end(), 10.0);
        assert!(!r.inclusive());

        let r = range("10:20");
        assert_eq!(r.start(), 10.0);
        assert_eq!(r.end(), 20.0);
        assert!(!r.inclusive());

        let r = range("10:");
        assert_eq!(r.start(), 10.0);
        assert_eq!(r.end(), f64::INFINITY);

        let r = range("~:20");
        assert_eq!(r.start(), f64::NEG_INFINITY);
        assert_eq!(r.end(), 20.0);

        let r = range("10:~");
        assert_eq!(r.start(), 10.0);
        assert_eq!(r.end(), f64::INFINITY);

        let r = range("10:10");
        assert_eq!(r.start(), 10.0);
        assert_eq!(r.end(), 10.0);

        let r = range("@10:20");
        assert!(r.inclusive());

        let r = range(" 10:20 ");
        assert_eq!(r.start(), 10.0);
    }

    #[test]
    fn test_range_parse_errors() {
        assert_eq!("".parse::<Range>(), Err(RangeFormatError::Empty));
        assert_eq!(
            "10:20:30".parse::<Range>(),
            Err(RangeFormatError::TooManyParts)
        );
        assert_eq!(
            ":10".parse::<Range>(),
            Err(RangeFormatError::InvalidStart("".to_owned()))
        );
        assert_eq!(
            "bad:10".parse::<Range>(),
            Err(RangeFormatError::InvalidStart("bad".to_owned()))
        );
        assert_eq!(
            "10:bad".parse::<Range>(),
            Err(RangeFormatError::InvalidEnd("bad".to_owned()))
        );
        assert_eq!(
            "20:10".parse::<Range>(),
            Err(RangeFormatError::StartGreaterThanEnd)
        );
        assert_eq!(
            Range::new(20.0, 10.0, false),
            Err(RangeFormatError::StartGreaterThanEnd)
        );
    }

    #[test]
    fn test_range_exclusive_polarity() {
        // Exclusive ranges flag values outside the interval.
        let r = range("10:20");
        assert!(!r.in_range(10.0));
        assert!(!r.in_range(15.0));
        assert!(!r.in_range(20.0));
        assert!(r.in_range(9.0));
        assert!(r.in_range(21.0));
    }

    #[test]
    fn test_range_inclusive() {
        let r = range("@10:20");
        assert!(r.in_range(10.0));
        assert!(r.in_range(15.0));
        assert!(r.in_range(20.0));
        assert!(!r.in_range(9.0));
        assert!(!r.in_range(21.0));
    }

    #[test]
    fn test_range_to_string() {
        for s in ["10", "10:20", "20", "~:10", "@10:15", "@~:~", "10:~"] {
            assert_eq!(s, range(s).to_string());
        }

        // Non-canonical inputs come back canonical but equivalent.
        assert_eq!(range("0:10").to_string(), "10");
        assert_eq!(range("10:").to_string(), "10:~");
        assert_eq!(range("1.5:2.5").to_string(), "1.5:2.5");
    }

    #[test]
    fn test_range_round_trip() {
        for s in ["10", "0:10", "10:", "1.5:2.5", "@5:", "~:20", "-3:7"] {
            let parsed = range(s);
            let reparsed = range(&parsed.to_string());
            assert_eq!(parsed, reparsed, "round trip of {:?}", s);
        }
    }

    #[test]
    fn test_severity() {
        assert_eq!(OK.exit_code(), 0);
        assert_eq!(WARNING.exit_code(), 1);
        assert_eq!(CRITICAL.exit_code(), 2);
        assert_eq!(UNKNOWN.exit_code(), 3);

        assert_eq!(OK.label(), "OK");
        assert_eq!(WARNING.label(), "WARN");
        assert_eq!(CRITICAL.label(), "CRIT");
        assert_eq!(UNKNOWN.label(), "UNKNOWN");

        assert!(OK < WARNING);
        assert!(CRITICAL > WARNING);
        assert!(UNKNOWN > CRITICAL);
    }

    #[test]
    fn test_severity_compares_by_exit_code_only() {
        let a = Severity::custom("DEGRADED", 1);
        assert_eq!(a, WARNING);
        assert!(a < CRITICAL);
        assert!(a > OK);
    }

    #[test]
    fn test_metric_value_validation() {
        assert!(MetricValue::new("foo", "bar").is_err());
        assert!(MetricValue::new("foo", "").is_err());
        assert!(MetricValue::new("", "7").is_err());
        assert!(MetricValue::new("foo", "7")
            .unwrap()
            .with_min("min")
            .is_err());
        assert!(MetricValue::new("foo", "7")
            .unwrap()
            .with_max("max")
            .is_err());

        let mut m = MetricValue::new("foo", "-1.5").unwrap();
        assert!(m.set_value("nope").is_err());
        assert_eq!(m.value(), "-1.5");
        m.set_value("2.5").unwrap();
        assert_eq!(m.value(), "2.5");
    }

    #[test]
    fn test_metric_unit_parsing() {
        for s in ["", "s", "%", "b", "kb", "mb", "gb", "tb", "c", "KB", "B"] {
            assert!(s.parse::<Unit>().is_ok(), "unit {:?}", s);
        }
        for s in ["p", "bytes", "nope"] {
            assert!(s.parse::<Unit>().is_err(), "unit {:?}", s);
        }

        assert_eq!("KB".parse::<Unit>().unwrap(), Unit::KiloBytes);
        assert!(MetricValue::new("foo", "7")
            .unwrap()
            .with_unit_str("nope")
            .is_err());
    }

    #[test]
    fn test_metric_value_ranges() {
        let m = MetricValue::new("foo", "7")
            .unwrap()
            .with_warn_str("10:20")
            .unwrap();
        assert_eq!(m.warn(), Some(&range("10:20")));

        let m = MetricValue::new("foo", "7")
            .unwrap()
            .with_crit(range("10:20"));
        assert_eq!(m.crit(), Some(&range("10:20")));

        assert!(MetricValue::new("foo", "7")
            .unwrap()
            .with_warn_str("bad")
            .is_err());
    }

    #[test]
    fn test_metric_value_to_string() {
        let m = MetricValue::new("foo", "7").unwrap();
        assert_eq!(m.to_string(), "foo=7;;;;");

        let m = MetricValue::new("foo", "1")
            .unwrap()
            .with_unit(Unit::Bytes)
            .with_warn_str("10:20")
            .unwrap()
            .with_crit_str("20:30")
            .unwrap()
            .with_min("1")
            .unwrap()
            .with_max("5")
            .unwrap();
        assert_eq!(m.to_string(), "foo=1b;10:20;20:30;1;5");
    }

    #[test]
    fn test_metric_label_quoting() {
        let test_data = [
            ("with=", "'with='=7;;;;"),
            ("I have spaces", "'I have spaces'=7;;;;"),
            ("quote'", "'quote'''=7;;;;"),
            ("plain", "plain=7;;;;"),
        ];
        for (label, expected) in test_data {
            let m = MetricValue::new(label, "7").unwrap();
            assert_eq!(m.to_string(), expected);
        }
    }

    #[test]
    fn test_classify() {
        let warning = range("10:20");
        let critical = range("0:40");

        assert_eq!(classify(15.0, Some(&warning), Some(&critical)), OK);
        assert_eq!(classify(27.0, Some(&warning), Some(&critical)), WARNING);
        assert_eq!(classify(50.0, Some(&warning), Some(&critical)), CRITICAL);

        // Without ranges nothing ever triggers.
        assert_eq!(classify(15.0, None, None), OK);
        assert_eq!(classify(50.0, Some(&warning), None), WARNING);
    }

    #[test]
    fn test_check_result_to_string() {
        let result = CheckResult::new(OK);
        assert_eq!(result.to_string(), "OK:");

        let result = CheckResult::new(OK).with_message("Hi");
        assert_eq!(result.to_string(), "OK: Hi");

        let mut result = CheckResult::new(OK).with_message("yo");
        result.set_metric(MetricValue::new("users", "20").unwrap());
        result.set_metric(MetricValue::new("foos", "80").unwrap());
        assert_eq!(result.to_string(), "OK: yo|users=20;;;; foos=80;;;;");

        let mut result = CheckResult::new(CRITICAL);
        result.set_metric(MetricValue::new("users", "20").unwrap());
        assert_eq!(result.to_string(), "CRIT:|users=20;;;;");
    }

    #[test]
    fn test_check_result_metric_upsert() {
        let mut result = CheckResult::new(OK);
        result.set_metric(MetricValue::new("a", "1").unwrap());
        result.set_metric(MetricValue::new("b", "2").unwrap());
        result.set_metric(MetricValue::new("a", "3").unwrap());

        // Content is replaced, position stays where the label first appeared.
        assert_eq!(result.metrics().len(), 2);
        assert_eq!(result.to_string(), "OK:|a=3;;;; b=2;;;;");
    }

    #[test]
    fn test_check_result_exit_code() {
        assert_eq!(CheckResult::new(OK).exit_code(), 0);
        assert_eq!(CheckResult::new(CRITICAL).exit_code(), 2);
    }

    #[test]
    fn test_aggregator_empty() {
        let result = ResultAggregator::new().reduce(None);
        assert_eq!(result.severity(), &OK);
        assert_eq!(result.message(), None);

        let fallback = CheckResult::new(UNKNOWN).with_message("default test");
        let result = ResultAggregator::new().reduce(Some(fallback.clone()));
        assert_eq!(result, fallback);
    }

    #[test]
    fn test_aggregator_groups_by_severity() {
        let mut agg = ResultAggregator::new();
        agg.add(CheckResult::new(OK).with_message("foo"));
        agg.add(CheckResult::new(CRITICAL).with_message("bar"));
        agg.add(CheckResult::new(OK).with_message("baz"));

        let result = agg.reduce(None);
        assert_eq!(result.severity(), &CRITICAL);
        assert_eq!(result.message(), Some("bar OK: foo, baz"));
        assert!(result.metrics().is_empty());
    }

    #[test]
    fn test_aggregator_is_stable() {
        let mut agg = ResultAggregator::new();
        agg.add(CheckResult::new(WARNING).with_message("A"));
        agg.add(CheckResult::new(OK).with_message("X"));
        agg.add(CheckResult::new(CRITICAL).with_message("K"));
        agg.add(CheckResult::new(WARNING).with_message("C"));
        agg.add(CheckResult::new(CRITICAL).with_message("L"));
        agg.add(CheckResult::new(OK).with_message("Y"));

        // Within each severity band the insertion order is preserved.
        let result = agg.reduce(None);
        assert_eq!(result.severity(), &CRITICAL);
        assert_eq!(result.message(), Some("K, L WARN: A, C OK: X, Y"));
    }

    #[test]
    fn test_aggregator_drops_metrics() {
        let mut r = CheckResult::new(CRITICAL).with_message("bar");
        r.set_metric(MetricValue::new("users", "20").unwrap());

        let mut agg = ResultAggregator::new();
        agg.add(r);

        let result = agg.reduce(None);
        assert_eq!(result.to_string(), "CRIT: bar");
    }
}
