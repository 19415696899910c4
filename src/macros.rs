/// Lets you simply create a check result from a severity, a message and
/// multiple metrics. It's a bit like the vec! macro.
/// ```rust
/// # #[macro_use]
/// # extern crate icingaplugin;
/// #
/// # use icingaplugin::{MetricValue, OK};
/// #
/// # fn main() {
/// let m1 = MetricValue::new("users", "27").unwrap();
/// let m2 = MetricValue::new("sessions", "3").unwrap();
/// let result = check_result![OK, "27 users logged in"; m1, m2];
/// assert_eq!(
///     result.to_string(),
///     "OK: 27 users logged in|users=27;;;; sessions=3;;;;"
/// );
/// # }
/// ```
#[macro_export]
macro_rules! check_result {
    ($severity:expr) => {
        $crate::CheckResult::new($severity)
    };
    ($severity:expr, $message:expr) => {
        $crate::CheckResult::new($severity).with_message($message)
    };
    ($severity:expr, $message:expr; $( $m:expr ),* $(,)?) => {
        {
            let mut r = $crate::CheckResult::new($severity).with_message($message);
            $(
                r.set_metric($m);
            )*
            r
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{MetricValue, CRITICAL, OK};

    #[test]
    fn test_check_result_macro() {
        let m1 = MetricValue::new("test", "12").unwrap();
        let m2 = m1.clone();

        let result = check_result![OK];
        assert_eq!(result.to_string(), "OK:");

        let result = check_result![CRITICAL, "oh no"];
        assert_eq!(result.to_string(), "CRIT: oh no");

        let mut other = MetricValue::new("other", "1").unwrap();
        other.set_value("2").unwrap();

        let result = check_result![OK, "fine"; m1, m2, other];
        assert_eq!(result.to_string(), "OK: fine|test=12;;;; other=2;;;;");
    }
}
