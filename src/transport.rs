//! HID transport abstraction
//!
//! The driver core talks to the hardware through the narrow [`Transport`]
//! trait. The production implementation, [`HidTransport`], sits on top of
//! [hidapi](https://crates.io/crates/hidapi); tests and exotic setups can
//! inject their own implementation via `Device::with_transport`.

use std::ffi::CStr;
use std::sync::atomic::{AtomicBool, Ordering};

use hidapi::{HidApi, HidDevice};
use parking_lot::Mutex;

use crate::error::{Error, Result};

/// Poll granularity of the blocking read loop. The interrupt read only
/// returns early when the transport is shut down, so the tick just bounds
/// how long a close takes to be observed.
const READ_POLL_MS: i32 = 100;

/// Capability set the driver core needs from the HID layer.
///
/// One implementor instance corresponds to one opened device. The input
/// worker is the sole caller of [`Transport::read`]; writers (feature
/// reports and image pages) may run concurrently from other threads and
/// must be serialized by the implementation.
pub trait Transport: Send + Sync {
    /// Read one input report. Blocks until a report arrives or the
    /// transport is shut down, in which case an error is returned.
    fn read(&self, buf: &mut [u8]) -> Result<usize>;

    /// Send an output report. The frame must be wire-exact.
    fn write(&self, frame: &[u8]) -> Result<usize>;

    /// Fetch a feature report. The first bytes of `buf` carry the request
    /// command; the buffer is overwritten with the reply.
    fn get_feature_report(&self, buf: &mut [u8]) -> Result<usize>;

    /// Send a feature report. Returns the number of bytes written.
    fn send_feature_report(&self, buf: &[u8]) -> Result<usize>;

    /// Mark the transport closed. Pending and future reads fail, which
    /// terminates the input worker.
    fn shutdown(&self);
}

/// hidapi-backed transport.
///
/// The same device path is opened twice: one handle is dedicated to the
/// interrupt endpoint (input reports), the other to control traffic.
/// Interrupt and control transfers are logically independent, so reads can
/// proceed while images upload; writers serialize on the control mutex.
pub struct HidTransport {
    control: Mutex<HidDevice>,
    interrupt: Mutex<HidDevice>,
    open: AtomicBool,
}

impl HidTransport {
    /// Open both HID handles for the device at `path`.
    pub fn open(api: &HidApi, path: &CStr) -> Result<Self> {
        let control = api
            .open_path(path)
            .map_err(|e| Error::OpenFailed(e.to_string()))?;
        let interrupt = api
            .open_path(path)
            .map_err(|e| Error::OpenFailed(e.to_string()))?;

        Ok(Self {
            control: Mutex::new(control),
            interrupt: Mutex::new(interrupt),
            open: AtomicBool::new(true),
        })
    }
}

impl Transport for HidTransport {
    fn read(&self, buf: &mut [u8]) -> Result<usize> {
        loop {
            if !self.open.load(Ordering::Acquire) {
                return Err(Error::TransportRead("transport closed".into()));
            }

            let n = self
                .interrupt
                .lock()
                .read_timeout(buf, READ_POLL_MS)
                .map_err(|e| Error::TransportRead(e.to_string()))?;

            if n > 0 {
                return Ok(n);
            }
        }
    }

    fn write(&self, frame: &[u8]) -> Result<usize> {
        self.control
            .lock()
            .write(frame)
            .map_err(|e| Error::TransportWrite(e.to_string()))
    }

    fn get_feature_report(&self, buf: &mut [u8]) -> Result<usize> {
        self.control
            .lock()
            .get_feature_report(buf)
            .map_err(|e| Error::TransportRead(e.to_string()))
    }

    fn send_feature_report(&self, buf: &[u8]) -> Result<usize> {
        self.control
            .lock()
            .send_feature_report(buf)
            .map_err(|e| Error::TransportWrite(e.to_string()))?;
        Ok(buf.len())
    }

    fn shutdown(&self) {
        self.open.store(false, Ordering::Release);
    }
}

/// Creates an instance of the HidApi.
///
/// Can be used if you don't want to link the hidapi crate into your
/// project.
pub fn new_hidapi() -> Result<HidApi> {
    HidApi::new().map_err(|e| Error::OpenFailed(e.to_string()))
}
