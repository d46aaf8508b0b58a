//! Error types for the library

use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while driving a Stream Deck
#[derive(Error, Debug)]
pub enum Error {
    /// No Stream Deck device was found during enumeration
    #[error("no Stream Deck device found")]
    DeviceNotFound,

    /// The HID handle could not be acquired
    #[error("cannot open device: {0}")]
    OpenFailed(String),

    /// Low-level read failure on the HID interrupt endpoint
    #[error("transport read error: {0}")]
    TransportRead(String),

    /// Low-level write failure (output report or feature report)
    #[error("transport write error: {0}")]
    TransportWrite(String),

    /// The supplied image does not match the model's key resolution
    #[error("supplied image has wrong dimensions, expected {expected}x{expected} pixels")]
    WrongDimensions {
        /// Expected edge length in pixels
        expected: u32,
    },

    /// The JPEG/BMP encoder rejected the input
    #[error("cannot convert image data: {0}")]
    EncodingFailed(String),

    /// The operation is not meaningful on this hardware variant
    #[error("operation not supported on this model: {0}")]
    UnsupportedOperation(&'static str),
}
