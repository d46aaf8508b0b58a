//! Stream Deck USB-HID Driver Library
//!
//! This library provides a Rust implementation for driving Elgato Stream
//! Deck devices over USB HID: enumeration, key/knob/touch input events,
//! per-button images and backlight control including timed sleep with
//! fade animations.
//!
//! ## Supported devices
//! - Stream Deck (15 keys, 72x72px, BMP)
//! - Stream Deck Mini / Mini MK.2 (6 keys, 80x80px, BMP)
//! - Stream Deck V2 / MK.2 (15 keys, 72x72px, JPEG)
//! - Stream Deck XL (32 keys, 96x96px, JPEG)
//! - Stream Deck + (8 keys, 4 knobs, touch strip, JPEG)
//! - Stream Deck Pedal (3 keys, no displays)
//!
//! ## Example
//!
//! ```no_run
//! use streamdeck_rs_usb::{devices, new_hidapi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = new_hidapi()?;
//!     let mut devs = devices(&api);
//!     let deck = devs.first_mut().ok_or("no Stream Deck found")?;
//!     deck.open(&api)?;
//!     deck.set_brightness(80).await?;
//!
//!     let mut keys = deck.read_keys().await?;
//!     while let Some(key) = keys.recv().await {
//!         println!("key {} pressed={}", key.index, key.pressed);
//!     }
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod error;
pub mod profile;
pub mod protocol;
pub mod transform;
pub mod transport;

pub use device::{devices, Device};
pub use error::{Error, Result};
pub use profile::{ModelProfile, ELGATO_VENDOR_ID};
pub use protocol::input::Key;
pub use transport::{new_hidapi, HidTransport, Transport};
