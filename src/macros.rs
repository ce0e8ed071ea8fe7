//! Helper macros used across the crate.

/// Lazily compiles a [`Regex`](regex::Regex), panicking with `$msg` if the
/// pattern is invalid.
///
/// The call site must have `LazyLock` and `Regex` in scope.
///
/// ```
/// use std::sync::LazyLock;
///
/// use regex::Regex;
/// static DIGITS: LazyLock<Regex> = tablegrab::lazy_regex!(r"^\d+$", "digit pattern");
/// assert!(DIGITS.is_match("2024"));
/// ```
#[macro_export]
macro_rules! lazy_regex {
    ($pattern:expr, $msg:expr $(,)?) => {
        LazyLock::new(|| Regex::new($pattern).expect($msg))
    };
}
