//! Device façade
//!
//! [`devices`] enumerates attached Stream Decks and yields one inactive
//! [`Device`] handle per match. Opening a handle binds the HID transport;
//! from there the façade drives the per-model protocol adapter for
//! firmware queries, reset, brightness, image uploads and the input
//! event loop.

mod sleep;

use std::ffi::CString;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hidapi::HidApi;
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::profile::{ModelProfile, ELGATO_VENDOR_ID};
use crate::protocol;
use crate::protocol::input::{self, Key};
use crate::protocol::pager::ImagePages;
use crate::transform;
use crate::transport::{HidTransport, Transport};

use sleep::SleepState;

/// Capacity of the key event channel. The input worker blocks once the
/// consumer falls this far behind.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Returns all attached Stream Decks as inactive device handles, in
/// enumeration order. Unknown Elgato product ids are skipped.
pub fn devices(api: &HidApi) -> Vec<Device> {
    let mut found = Vec::new();

    for info in api.device_list() {
        if info.vendor_id() != ELGATO_VENDOR_ID {
            continue;
        }
        let Some(profile) = ModelProfile::for_pid(info.product_id()) else {
            log::debug!("skipping unknown Elgato product id {:#06x}", info.product_id());
            continue;
        };

        found.push(Device {
            profile,
            raw_path: info.path().to_owned(),
            path: info.path().to_string_lossy().into_owned(),
            serial: info.serial_number().unwrap_or_default().to_string(),
            shared: None,
        });
    }

    found
}

/// Shared open-connection state: the transport plus everything the sleep
/// controller and the input worker touch concurrently.
pub(crate) struct Shared {
    pub(crate) profile: &'static ModelProfile,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) sleep: RwLock<SleepState>,
    sleep_task: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    fn new(profile: &'static ModelProfile, transport: Arc<dyn Transport>) -> Self {
        Self {
            profile,
            transport,
            sleep: RwLock::new(SleepState::new()),
            sleep_task: Mutex::new(None),
        }
    }

    /// Sends the command as a feature report and returns the reply. The
    /// request buffer is zero-padded to the profile's report size.
    fn get_feature_report(&self, command: &[u8]) -> Result<Vec<u8>> {
        let mut report = protocol::feature_report(command, self.profile.feature_report_size);
        self.transport.get_feature_report(&mut report)?;
        Ok(report)
    }

    /// Sends the command as a feature report, zero-padded to the
    /// profile's report size.
    fn send_feature_report(&self, command: &[u8]) -> Result<()> {
        let report = protocol::feature_report(command, self.profile.feature_report_size);
        self.transport.send_feature_report(&report)?;
        Ok(())
    }

    /// Puts the brightness percentage on the wire. No-op on models
    /// without a backlight.
    pub(crate) fn write_brightness(&self, percent: u8) -> Result<()> {
        if !self.profile.has_visuals {
            return Ok(());
        }
        let mut command = self.profile.set_brightness_command.to_vec();
        command.push(percent);
        self.send_feature_report(&command)
    }

    fn cancel_sleep_timer(&self) {
        if let Some(task) = self.sleep_task.lock().take() {
            task.abort();
        }
    }
}

/// A single Stream Deck.
///
/// Handles produced by [`devices`] are inactive; call [`Device::open`]
/// before any other operation.
pub struct Device {
    profile: &'static ModelProfile,
    raw_path: CString,
    path: String,
    serial: String,
    shared: Option<Arc<Shared>>,
}

impl Device {
    /// Builds an already-open device around a custom [`Transport`].
    ///
    /// This is the seam for tests and for transports other than local
    /// USB; regular callers go through [`devices`] and [`Device::open`].
    pub fn with_transport(profile: &'static ModelProfile, transport: Arc<dyn Transport>) -> Device {
        Device {
            profile,
            raw_path: CString::default(),
            path: String::new(),
            serial: String::new(),
            shared: Some(Arc::new(Shared::new(profile, transport))),
        }
    }

    /// The model profile this device is bound to.
    pub fn profile(&self) -> &'static ModelProfile {
        self.profile
    }

    /// Platform path of the underlying HID device.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Serial number reported during enumeration.
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Opens the device for input/output. Must be called before trying
    /// to communicate with the device; opening an open device is a
    /// no-op.
    pub fn open(&mut self, api: &HidApi) -> Result<()> {
        if self.shared.is_some() {
            return Ok(());
        }
        let transport = HidTransport::open(api, &self.raw_path)?;
        self.shared = Some(Arc::new(Shared::new(self.profile, Arc::new(transport))));
        Ok(())
    }

    /// Closes the connection: the sleep timer is cancelled and the
    /// transport shut down, which terminates the input worker and closes
    /// the event channel. Closing a closed device is a no-op.
    pub fn close(&mut self) {
        if let Some(shared) = self.shared.take() {
            shared.cancel_sleep_timer();
            shared.transport.shutdown();
        }
    }

    fn shared(&self) -> Result<&Arc<Shared>> {
        self.shared
            .as_ref()
            .ok_or_else(|| Error::OpenFailed("device is not open".into()))
    }

    /// Returns the firmware version of the device.
    pub async fn firmware_version(&self) -> Result<String> {
        let shared = self.shared()?;
        let report = shared.get_feature_report(self.profile.firmware_command)?;

        let tail = &report[self.profile.firmware_offset..];
        let len = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        Ok(String::from_utf8_lossy(&tail[..len]).into_owned())
    }

    /// Resets the device, clearing all button images and showing the
    /// standby image. No-op on models without displays.
    pub async fn reset(&self) -> Result<()> {
        let shared = self.shared()?;
        if !self.profile.has_visuals {
            return Ok(());
        }
        shared.send_feature_report(self.profile.reset_command)
    }

    /// Sets the backlight brightness from 0 to 100 percent; values above
    /// 100 are clamped. While the device is asleep a non-zero percentage
    /// only updates the brightness restored on wake.
    pub async fn set_brightness(&self, percent: u8) -> Result<()> {
        let shared = self.shared()?;
        let percent = percent.min(100);

        let mut state = shared.sleep.write().await;
        state.brightness = percent;
        if state.asleep && percent > 0 {
            state.pre_sleep_brightness = percent;
            return Ok(());
        }
        shared.write_brightness(percent)
    }

    /// Sets the image of a button. The image must match the model's key
    /// resolution exactly; index 0 is the top-left button. Models without
    /// key displays return success without touching the transport.
    pub async fn set_image(&self, index: u8, image: &DynamicImage) -> Result<()> {
        let shared = self.shared()?;
        let Some(format) = &self.profile.image else {
            return Ok(());
        };

        let (width, height) = image.dimensions();
        if width != self.profile.pixels || height != self.profile.pixels {
            return Err(Error::WrongDimensions {
                expected: self.profile.pixels,
            });
        }

        let encoded = transform::encode(image, format)?;
        let key = (self.profile.translate_key_index)(index, self.profile.columns);

        let pages = ImagePages::new(&encoded, format.page_size - format.header_size);
        let mut frame = vec![0u8; format.page_size];
        for page in 0..pages.page_count() {
            let (payload, last) = pages.page(page);
            let header = (format.page_header)(page, key, payload.len(), last);

            frame[..header.len()].copy_from_slice(&header);
            frame[header.len()..header.len() + payload.len()].copy_from_slice(payload);
            frame[header.len() + payload.len()..].fill(0);

            shared
                .transport
                .write(&frame)
                .map_err(|e| page_write_error(e, page, pages.page_count()))?;
        }

        Ok(())
    }

    /// Sets the image of one touch strip segment (Stream Deck Plus). The
    /// image must be sized to one segment.
    pub async fn set_touch_segment_image(&self, segment: u8, image: &DynamicImage) -> Result<()> {
        let width = self.profile.screen_segment_width();
        let height = self.profile.screen_segment_height();
        self.set_touch_image(segment as u16 * width, 0, width, height, image)
            .await
    }

    /// Draws an image on an arbitrary rectangle of the touch strip
    /// (Stream Deck Plus). The caller is responsible for sizing the image
    /// to the rectangle.
    pub async fn set_touch_image(
        &self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        image: &DynamicImage,
    ) -> Result<()> {
        let shared = self.shared()?;
        let Some(screen) = &self.profile.screen else {
            return Err(Error::UnsupportedOperation("touch strip"));
        };

        let encoded = transform::to_jpeg(image)?;

        let pages = ImagePages::new(&encoded, screen.page_size - screen.header_size);
        let mut frame = vec![0u8; screen.page_size];
        for page in 0..pages.page_count() {
            let (payload, last) = pages.page(page);
            let header = (screen.page_header)(page, x, y, width, height, payload.len(), last);

            frame[..header.len()].copy_from_slice(&header);
            frame[header.len()..header.len() + payload.len()].copy_from_slice(payload);
            frame[header.len() + payload.len()..].fill(0);

            shared
                .transport
                .write(&frame)
                .map_err(|e| page_write_error(e, page, pages.page_count()))?;
        }

        Ok(())
    }

    /// Sets a black image on all buttons.
    pub async fn clear(&self) -> Result<()> {
        if self.profile.image.is_none() {
            return Ok(());
        }

        let pixels = self.profile.pixels;
        let black = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            pixels,
            pixels,
            Rgba([0, 0, 0, 255]),
        ));

        // Every key slot is attempted even when one fails; the first
        // error is surfaced once the sweep is done.
        let mut first_err = None;
        for key in 0..self.profile.columns * self.profile.rows {
            if let Err(e) = self.set_image(key, &black).await {
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Starts the input loop and returns the channel it emits key events
    /// on. The channel closes when the transport ends, either through
    /// [`Device::close`] or an I/O error.
    pub async fn read_keys(&self) -> Result<mpsc::Receiver<Key>> {
        let shared = Arc::clone(self.shared()?);
        let profile = self.profile;
        let runtime = Handle::current();
        let (events, receiver) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        std::thread::Builder::new()
            .name("streamdeck-input".into())
            .spawn(move || input_worker(profile, shared, events, runtime))
            .map_err(|e| Error::OpenFailed(format!("cannot spawn input worker: {}", e)))?;

        Ok(receiver)
    }

    /// True if the device is asleep.
    pub async fn asleep(&self) -> Result<bool> {
        Ok(self.shared()?.sleep.read().await.asleep)
    }

    /// Puts the device to sleep, waiting for a key event to wake it up.
    pub async fn sleep(&self) -> Result<()> {
        self.shared()?.enter_sleep().await
    }

    /// Wakes the device from sleep.
    pub async fn wake(&self) -> Result<()> {
        self.shared()?.wake().await
    }

    /// Sets the duration of the fading animation when the device is put
    /// to sleep or wakes up.
    pub async fn set_sleep_fade_duration(&self, duration: Duration) -> Result<()> {
        self.shared()?.sleep.write().await.fade_duration = duration;
        Ok(())
    }

    /// Arms the idle timer: after `timeout` without key events the device
    /// goes to sleep. A zero timeout disarms the timer.
    pub async fn set_sleep_timeout(&self, timeout: Duration) -> Result<()> {
        let shared = self.shared()?;
        shared.cancel_sleep_timer();
        if timeout.is_zero() {
            return Ok(());
        }

        let watcher = Arc::clone(shared);
        let task = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(Duration::from_secs(1));
            loop {
                ticks.tick().await;

                let (idle, asleep) = {
                    let state = watcher.sleep.read().await;
                    (state.last_action.elapsed(), state.asleep)
                };

                if !asleep && idle >= timeout {
                    if let Err(e) = watcher.enter_sleep().await {
                        log::warn!("cannot put device to sleep: {}", e);
                    }
                }
            }
        });
        *shared.sleep_task.lock() = Some(task);

        Ok(())
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        self.close();
    }
}

/// Dedicated reader of the HID interrupt endpoint. Exits, closing the
/// event channel, as soon as the transport fails or the consumer drops
/// the receiver.
fn input_worker(
    profile: &'static ModelProfile,
    shared: Arc<Shared>,
    events: mpsc::Sender<Key>,
    runtime: Handle,
) {
    let mut report = vec![0u8; profile.input_report_len()];
    let mut key_state = vec![0u8; profile.keys as usize];

    loop {
        let n = match shared.transport.read(&mut report) {
            Ok(n) => n,
            Err(e) => {
                log::debug!("input worker exiting: {}", e);
                return;
            }
        };

        if shared.sleep.blocking_read().asleep {
            // The input woke the device; its state contribution is
            // discarded so the waking keypress emits no event.
            if let Err(e) = runtime.block_on(shared.wake()) {
                log::warn!("cannot wake device: {}", e);
            }
            continue;
        }

        shared.sleep.blocking_write().last_action = Instant::now();

        for key in input::decode_report(profile, &report[..n], &mut key_state) {
            if events.blocking_send(key).is_err() {
                return;
            }
        }
    }
}

fn page_write_error(err: Error, page: usize, count: usize) -> Error {
    match err {
        Error::TransportWrite(msg) => Error::TransportWrite(format!(
            "cannot write image page {} of {}: {}",
            page, count, msg
        )),
        other => other,
    }
}
