//! Unified error type for sun2usb.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.
//!
//! Protocol anomalies (unmapped scan codes, rollover overflow, repeated
//! LED values) are not errors; they are dropped where they occur.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Serial
    /// The keyboard UART reported a receive or transmit fault.
    Serial(SerialError),

    // USB
    /// The USB endpoint is disabled (cable unplugged or not configured).
    Usb,

    // Generic
    /// Buffer too small for the requested operation.
    BufferOverflow,

    /// Operation timed out.
    Timeout,
}

/// UART faults we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialError {
    /// Stop bit missing - usually a baud mismatch or line noise.
    Framing,
    /// Parity check failed.
    Parity,
    /// A byte arrived before the previous one was consumed.
    Overrun,
    /// Line held low longer than a frame (keyboard unplugged).
    Break,
    /// Driver-level misuse (buffer placement, length).
    Other,
}

// Convenience conversions

impl From<SerialError> for Error {
    fn from(e: SerialError) -> Self {
        Error::Serial(e)
    }
}

#[cfg(feature = "embedded")]
impl From<embassy_nrf::uarte::Error> for Error {
    fn from(e: embassy_nrf::uarte::Error) -> Self {
        use embassy_nrf::uarte::Error as UarteError;

        let kind = match e {
            UarteError::Framing => SerialError::Framing,
            UarteError::Parity => SerialError::Parity,
            UarteError::Overrun => SerialError::Overrun,
            UarteError::Break => SerialError::Break,
            _ => SerialError::Other,
        };
        Error::Serial(kind)
    }
}

#[cfg(feature = "embedded")]
impl From<embassy_usb::driver::EndpointError> for Error {
    fn from(e: embassy_usb::driver::EndpointError) -> Self {
        match e {
            embassy_usb::driver::EndpointError::BufferOverflow => Error::BufferOverflow,
            embassy_usb::driver::EndpointError::Disabled => Error::Usb,
        }
    }
}

#[cfg(feature = "embedded")]
impl From<embassy_time::TimeoutError> for Error {
    fn from(_: embassy_time::TimeoutError) -> Self {
        Error::Timeout
    }
}
