//! Logging shims for the protocol library.
//!
//! On target the library logs through `defmt`; host test builds carry no
//! logger, so every macro expands to nothing unless the `defmt` feature
//! is enabled.

#[cfg(feature = "defmt")]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        defmt::trace!($($arg)*)
    };
}

#[cfg(not(feature = "defmt"))]
macro_rules! log_trace {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "defmt")]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        defmt::debug!($($arg)*)
    };
}

#[cfg(not(feature = "defmt"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "defmt")]
macro_rules! log_info {
    ($($arg:tt)*) => {
        defmt::info!($($arg)*)
    };
}

#[cfg(not(feature = "defmt"))]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}
