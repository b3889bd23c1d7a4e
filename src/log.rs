//! Diagnostics for documents that load but contain something questionable.

/// Prints a message to stdout if the session has logging enabled.
///
/// `svg2png_log!(session, "format {}", args)` takes the same arguments as `println!`
/// after the session.
#[doc(hidden)]
#[macro_export]
macro_rules! svg2png_log {
    ($session:expr, $($arg:tt)+) => {
        if $session.log_enabled() {
            println!("{}", format_args!($($arg)+));
        }
    };
}

/// Name of the environment variable that turns on logging for new sessions.
pub const LOG_VARIABLE: &str = "SVG2PNG_LOG";

/// Whether [`LOG_VARIABLE`] is set, to any value.
pub fn log_enabled() -> bool {
    std::env::var_os(LOG_VARIABLE).is_some()
}
