//! Per-model protocol parameters
//!
//! Every supported hardware variant is described by an immutable
//! [`ModelProfile`]: report sizes and offsets, the image upload framing,
//! the pixel transform the display expects, and the command prefixes of
//! its firmware revision. Profiles are plain statics; a device handle
//! borrows the one matching its product id for its whole lifetime.

use crate::protocol::headers::{
    mini_image_page_header, rev1_image_page_header, rev2_image_page_header,
    touch_screen_image_page_header,
};
use crate::protocol::{
    REV1_BRIGHTNESS, REV1_FIRMWARE, REV1_RESET, REV2_BRIGHTNESS, REV2_FIRMWARE, REV2_RESET,
};

/// Elgato's USB vendor id
pub const ELGATO_VENDOR_ID: u16 = 0x0fd9;

/// Product id of the original Stream Deck
pub const PID_STREAMDECK: u16 = 0x0060;
/// Product id of the Stream Deck V2
pub const PID_STREAMDECK_V2: u16 = 0x006d;
/// Product id of the Stream Deck MK.2
pub const PID_STREAMDECK_MK2: u16 = 0x0080;
/// Product id of the Stream Deck Mini
pub const PID_STREAMDECK_MINI: u16 = 0x0063;
/// Product id of the Stream Deck Mini MK.2
pub const PID_STREAMDECK_MINI_MK2: u16 = 0x0090;
/// Product id of the Stream Deck XL
pub const PID_STREAMDECK_XL: u16 = 0x006c;
/// Product id of the Stream Deck Plus
pub const PID_STREAMDECK_PLUS: u16 = 0x0084;
/// Product id of the Stream Deck Pedal
pub const PID_STREAMDECK_PEDAL: u16 = 0x0086;

/// Length of a Stream Deck Plus input report (tagged multi-input layout)
pub(crate) const MULTI_INPUT_REPORT_LEN: usize = 13;

/// Encoding the device firmware expects for key images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// 24-bit BMP with the fixed 54-byte header, pixels written B,G,R
    Bmp24,
    /// JPEG at quality 100
    JpegQ100,
}

/// Pixel-space transform matching the physical mounting of the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// No transform
    None,
    /// Mirror along the vertical axis (keys wired right-to-left)
    FlipHorizontal,
    /// Mirror both axes (display rotated 180 degrees)
    FlipBoth,
    /// Rotate 90 degrees counterclockwise
    RotateCcw90,
}

/// Which input-report parser the model uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLayout {
    /// Header bytes followed by one state byte per key
    ButtonsOnly,
    /// Tagged reports carrying buttons, knobs and touch gestures
    MultiInput,
}

/// Image upload framing for the key displays
pub struct ImageFormat {
    /// Total size of one wire frame, header included
    pub page_size: usize,
    /// Size of the per-page header prepended to each frame
    pub header_size: usize,
    /// Pixel encoding the firmware expects
    pub encoding: Encoding,
    /// Transform applied before encoding
    pub orientation: Orientation,
    /// Builder for the per-page header
    pub page_header: fn(page: usize, key: u8, payload_len: usize, last_page: bool) -> Vec<u8>,
}

/// Touch strip parameters and framing (Stream Deck Plus)
pub struct ScreenFormat {
    /// Width of the strip in pixels
    pub width: u16,
    /// Height of the strip in pixels
    pub height: u16,
    /// Number of equal-width tap segments
    pub segments: u8,
    /// Number of rotary encoders next to the strip
    pub knobs: u8,
    /// Vertical DPI of the strip
    pub vertical_dpi: u32,
    /// Horizontal DPI of the strip
    pub horizontal_dpi: u32,
    /// Total size of one wire frame, header included
    pub page_size: usize,
    /// Size of the per-page header prepended to each frame
    pub header_size: usize,
    /// Builder for the per-page header carrying the target rectangle
    pub page_header: fn(
        page: usize,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        payload_len: usize,
        last_page: bool,
    ) -> Vec<u8>,
}

/// Immutable parameter bundle for one hardware variant
pub struct ModelProfile {
    /// Human-readable model name
    pub name: &'static str,
    /// USB product id
    pub product_id: u16,
    /// Number of key columns
    pub columns: u8,
    /// Number of key rows
    pub rows: u8,
    /// Number of logical key slots (see the input decoder for models with
    /// knobs and touch gestures, which extend past the physical buttons)
    pub keys: u8,
    /// Edge length of a key display in pixels; 0 if the model has none
    pub pixels: u32,
    /// Pixel density of the key displays
    pub dpi: u32,
    /// Gap between keys in pixels
    pub padding: u32,
    /// Whether reset/brightness/image commands are meaningful
    pub has_visuals: bool,
    /// Fixed size of every feature-report buffer
    pub feature_report_size: usize,
    /// Offset of the ASCII version string in the firmware reply
    pub firmware_offset: usize,
    /// Offset of the button-state bytes in an input report
    pub key_state_offset: usize,
    /// Maps a caller-facing key index to the wire index
    pub translate_key_index: fn(index: u8, columns: u8) -> u8,
    /// Input-report parser variant
    pub input_layout: InputLayout,
    /// Key image upload parameters; `None` on models without displays
    pub image: Option<ImageFormat>,
    /// Touch strip parameters; `None` on models without one
    pub screen: Option<ScreenFormat>,
    /// Feature-report prefix querying the firmware version
    pub firmware_command: &'static [u8],
    /// Feature-report prefix resetting the device
    pub reset_command: &'static [u8],
    /// Feature-report prefix setting the backlight brightness
    pub set_brightness_command: &'static [u8],
}

impl ModelProfile {
    /// Returns the profile for a product id, or `None` for unknown ids.
    pub fn for_pid(product_id: u16) -> Option<&'static ModelProfile> {
        match product_id {
            PID_STREAMDECK => Some(&STREAMDECK),
            PID_STREAMDECK_MINI => Some(&STREAMDECK_MINI),
            PID_STREAMDECK_MINI_MK2 => Some(&STREAMDECK_MINI_MK2),
            PID_STREAMDECK_V2 => Some(&STREAMDECK_V2),
            PID_STREAMDECK_MK2 => Some(&STREAMDECK_MK2),
            PID_STREAMDECK_XL => Some(&STREAMDECK_XL),
            PID_STREAMDECK_PLUS => Some(&STREAMDECK_PLUS),
            PID_STREAMDECK_PEDAL => Some(&STREAMDECK_PEDAL),
            _ => None,
        }
    }

    /// Length of one raw input report for this model.
    pub fn input_report_len(&self) -> usize {
        match self.input_layout {
            InputLayout::ButtonsOnly => self.key_state_offset + self.keys as usize,
            InputLayout::MultiInput => MULTI_INPUT_REPORT_LEN,
        }
    }

    /// Width of one touch strip segment. Returns 0 if there is no strip.
    pub fn screen_segment_width(&self) -> u16 {
        match &self.screen {
            Some(screen) if screen.segments > 0 => screen.width / screen.segments as u16,
            _ => 0,
        }
    }

    /// Height of one touch strip segment. Returns 0 if there is no strip.
    pub fn screen_segment_height(&self) -> u16 {
        match &self.screen {
            Some(screen) => screen.height,
            None => 0,
        }
    }
}

/// Translates a key index between right-to-left wire order and the
/// left-to-right order presented to callers. The mirror is per row.
pub fn translate_right_to_left(index: u8, columns: u8) -> u8 {
    let col = index % columns;
    (index - col) + (columns - 1) - col
}

/// Returns the key index unchanged.
pub fn identity(index: u8, _columns: u8) -> u8 {
    index
}

static STREAMDECK: ModelProfile = ModelProfile {
    name: "Stream Deck",
    product_id: PID_STREAMDECK,
    columns: 5,
    rows: 3,
    keys: 15,
    pixels: 72,
    dpi: 124,
    padding: 16,
    has_visuals: true,
    feature_report_size: 17,
    firmware_offset: 5,
    key_state_offset: 1,
    translate_key_index: translate_right_to_left,
    input_layout: InputLayout::ButtonsOnly,
    image: Some(ImageFormat {
        page_size: 7819,
        header_size: 16,
        encoding: Encoding::Bmp24,
        orientation: Orientation::FlipHorizontal,
        page_header: rev1_image_page_header,
    }),
    screen: None,
    firmware_command: REV1_FIRMWARE,
    reset_command: REV1_RESET,
    set_brightness_command: REV1_BRIGHTNESS,
};

static STREAMDECK_MINI: ModelProfile = ModelProfile {
    name: "Stream Deck Mini",
    product_id: PID_STREAMDECK_MINI,
    columns: 3,
    rows: 2,
    keys: 6,
    pixels: 80,
    dpi: 138,
    padding: 16,
    has_visuals: true,
    feature_report_size: 17,
    firmware_offset: 5,
    key_state_offset: 1,
    translate_key_index: identity,
    input_layout: InputLayout::ButtonsOnly,
    image: Some(ImageFormat {
        page_size: 1024,
        header_size: 16,
        encoding: Encoding::Bmp24,
        orientation: Orientation::RotateCcw90,
        page_header: mini_image_page_header,
    }),
    screen: None,
    firmware_command: REV1_FIRMWARE,
    reset_command: REV1_RESET,
    set_brightness_command: REV1_BRIGHTNESS,
};

static STREAMDECK_MINI_MK2: ModelProfile = ModelProfile {
    name: "Stream Deck Mini MK.2",
    product_id: PID_STREAMDECK_MINI_MK2,
    columns: 3,
    rows: 2,
    keys: 6,
    pixels: 80,
    dpi: 138,
    padding: 16,
    has_visuals: true,
    feature_report_size: 17,
    firmware_offset: 5,
    key_state_offset: 1,
    translate_key_index: identity,
    input_layout: InputLayout::ButtonsOnly,
    image: Some(ImageFormat {
        page_size: 1024,
        header_size: 16,
        encoding: Encoding::Bmp24,
        orientation: Orientation::RotateCcw90,
        page_header: mini_image_page_header,
    }),
    screen: None,
    firmware_command: REV1_FIRMWARE,
    reset_command: REV1_RESET,
    set_brightness_command: REV1_BRIGHTNESS,
};

static STREAMDECK_V2: ModelProfile = ModelProfile {
    name: "Stream Deck V2",
    product_id: PID_STREAMDECK_V2,
    columns: 5,
    rows: 3,
    keys: 15,
    pixels: 72,
    dpi: 124,
    padding: 16,
    has_visuals: true,
    feature_report_size: 32,
    firmware_offset: 6,
    key_state_offset: 4,
    translate_key_index: identity,
    input_layout: InputLayout::ButtonsOnly,
    image: Some(ImageFormat {
        page_size: 1024,
        header_size: 8,
        encoding: Encoding::JpegQ100,
        orientation: Orientation::FlipBoth,
        page_header: rev2_image_page_header,
    }),
    screen: None,
    firmware_command: REV2_FIRMWARE,
    reset_command: REV2_RESET,
    set_brightness_command: REV2_BRIGHTNESS,
};

static STREAMDECK_MK2: ModelProfile = ModelProfile {
    name: "Stream Deck MK.2",
    product_id: PID_STREAMDECK_MK2,
    columns: 5,
    rows: 3,
    keys: 15,
    pixels: 72,
    dpi: 124,
    padding: 16,
    has_visuals: true,
    feature_report_size: 32,
    firmware_offset: 6,
    key_state_offset: 4,
    translate_key_index: identity,
    input_layout: InputLayout::ButtonsOnly,
    image: Some(ImageFormat {
        page_size: 1024,
        header_size: 8,
        encoding: Encoding::JpegQ100,
        orientation: Orientation::FlipBoth,
        page_header: rev2_image_page_header,
    }),
    screen: None,
    firmware_command: REV2_FIRMWARE,
    reset_command: REV2_RESET,
    set_brightness_command: REV2_BRIGHTNESS,
};

static STREAMDECK_XL: ModelProfile = ModelProfile {
    name: "Stream Deck XL",
    product_id: PID_STREAMDECK_XL,
    columns: 8,
    rows: 4,
    keys: 32,
    pixels: 96,
    dpi: 166,
    padding: 16,
    has_visuals: true,
    feature_report_size: 32,
    firmware_offset: 6,
    key_state_offset: 4,
    translate_key_index: identity,
    input_layout: InputLayout::ButtonsOnly,
    image: Some(ImageFormat {
        page_size: 1024,
        header_size: 8,
        encoding: Encoding::JpegQ100,
        orientation: Orientation::FlipBoth,
        page_header: rev2_image_page_header,
    }),
    screen: None,
    firmware_command: REV2_FIRMWARE,
    reset_command: REV2_RESET,
    set_brightness_command: REV2_BRIGHTNESS,
};

static STREAMDECK_PLUS: ModelProfile = ModelProfile {
    name: "Stream Deck +",
    product_id: PID_STREAMDECK_PLUS,
    columns: 4,
    rows: 2,
    // 8 buttons, 4 knob-press slots, 8 transient knob-turn slots, 8
    // transient touch slots, 2 swipe slots
    keys: 30,
    pixels: 120,
    dpi: 180,
    padding: 16,
    has_visuals: true,
    feature_report_size: 32,
    firmware_offset: 6,
    key_state_offset: 4,
    translate_key_index: identity,
    input_layout: InputLayout::MultiInput,
    image: Some(ImageFormat {
        page_size: 1024,
        header_size: 8,
        encoding: Encoding::JpegQ100,
        orientation: Orientation::None,
        page_header: rev2_image_page_header,
    }),
    screen: Some(ScreenFormat {
        width: 800,
        height: 100,
        segments: 4,
        knobs: 4,
        vertical_dpi: 181,
        horizontal_dpi: 188,
        page_size: 1024,
        header_size: 16,
        page_header: touch_screen_image_page_header,
    }),
    firmware_command: REV2_FIRMWARE,
    reset_command: REV2_RESET,
    set_brightness_command: REV2_BRIGHTNESS,
};

static STREAMDECK_PEDAL: ModelProfile = ModelProfile {
    name: "Stream Deck Pedal",
    product_id: PID_STREAMDECK_PEDAL,
    columns: 3,
    rows: 1,
    keys: 3,
    pixels: 0,
    dpi: 0,
    padding: 0,
    has_visuals: false,
    feature_report_size: 32,
    firmware_offset: 6,
    key_state_offset: 4,
    translate_key_index: identity,
    input_layout: InputLayout::ButtonsOnly,
    image: None,
    screen: None,
    firmware_command: REV2_FIRMWARE,
    reset_command: REV2_RESET,
    set_brightness_command: REV2_BRIGHTNESS,
};
