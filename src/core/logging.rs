//! Logging abstraction
//!
//! Unified logging macros that work across targets:
//! - Embedded (`pico` feature): defmt
//! - Host tests: `println!` / `eprintln!`
//! - Host non-test: no-op (arguments are still type-checked)
//!
//! The `cfg` checks are expanded at the call site, so the macros are meant
//! for use inside this crate.

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "pico")]
        ::defmt::info!($($arg)*);

        #[cfg(all(not(feature = "pico"), test))]
        println!("[INFO] {}", format!($($arg)*));

        #[cfg(all(not(feature = "pico"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "pico")]
        ::defmt::warn!($($arg)*);

        #[cfg(all(not(feature = "pico"), test))]
        println!("[WARN] {}", format!($($arg)*));

        #[cfg(all(not(feature = "pico"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "pico")]
        ::defmt::error!($($arg)*);

        #[cfg(all(not(feature = "pico"), test))]
        eprintln!("[ERROR] {}", format!($($arg)*));

        #[cfg(all(not(feature = "pico"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "pico")]
        ::defmt::debug!($($arg)*);

        #[cfg(all(not(feature = "pico"), test))]
        println!("[DEBUG] {}", format!($($arg)*));

        #[cfg(all(not(feature = "pico"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log trace message
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "pico")]
        ::defmt::trace!($($arg)*);

        #[cfg(all(not(feature = "pico"), test))]
        println!("[TRACE] {}", format!($($arg)*));

        #[cfg(all(not(feature = "pico"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}
