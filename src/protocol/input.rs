//! Input-report parsing
//!
//! Turns one raw HID input report into zero or more model-independent
//! [`Key`] events. Buttons and knob presses are diffed against the last
//! seen state so only changes surface; knob turns and touch gestures are
//! one-shot events without a release counterpart.

use crate::profile::{InputLayout, ModelProfile};

/// Input-type tag of a button report (Stream Deck Plus)
pub const INPUT_TYPE_BUTTON: u8 = 0;
/// Input-type tag of a touch strip report (Stream Deck Plus)
pub const INPUT_TYPE_TOUCH: u8 = 2;
/// Input-type tag of a knob report (Stream Deck Plus)
pub const INPUT_TYPE_KNOB: u8 = 3;

/// Knob usage byte: press/release
pub const KNOB_USAGE_PRESS: u8 = 0;
/// Knob usage byte: rotation
pub const KNOB_USAGE_DIAL: u8 = 1;

/// Touch usage byte: short tap
pub const TOUCH_USAGE_SHORT: u8 = 1;
/// Touch usage byte: long tap
pub const TOUCH_USAGE_LONG: u8 = 2;
/// Touch usage byte: swipe
pub const TOUCH_USAGE_SWIPE: u8 = 3;

const POSITION_TYPE: usize = 1;
const POSITION_KNOB_USAGE: usize = 4;
const POSITION_TOUCH_USAGE: usize = 4;
const POSITION_TOUCH_X: usize = 6;
const POSITION_TOUCH_X2: usize = 10;
const KNOB_STATE_OFFSET: usize = 5;

/// Swipes are resolved on a finer grid than taps; the granularity is a
/// firmware constant independent of the tap segmentation.
const SWIPE_SEGMENT_WIDTH: u16 = 40;

/// Status change of a key on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    /// Logical key index. Buttons come first in reading order, then
    /// knob presses, knob left turns, knob right turns, touch taps,
    /// long taps and the two swipe directions.
    pub index: u8,
    /// True on press (always true for one-shot events)
    pub pressed: bool,
    /// Whether the event comes in press/release pairs
    pub holdable: bool,
}

/// Decodes one raw input report, updating `key_state` in place.
///
/// Ill-formed reports produce no events; only the bytes present in the
/// report are considered.
pub fn decode_report(profile: &ModelProfile, report: &[u8], key_state: &mut [u8]) -> Vec<Key> {
    match profile.input_layout {
        InputLayout::ButtonsOnly => decode_buttons_only(profile, report, key_state),
        InputLayout::MultiInput => decode_multi_input(profile, report, key_state),
    }
}

/// Parser for models whose reports carry nothing but button states.
fn decode_buttons_only(profile: &ModelProfile, report: &[u8], key_state: &mut [u8]) -> Vec<Key> {
    let offset = profile.key_state_offset;
    if report.len() < offset + profile.keys as usize {
        log::debug!("short input report ({} bytes), skipping", report.len());
        return Vec::new();
    }

    let mut events = Vec::new();
    for i in 0..profile.keys as usize {
        let state = report[offset + i];
        if state != key_state[i] {
            key_state[i] = state;
            events.push(Key {
                index: (profile.translate_key_index)(i as u8, profile.columns),
                pressed: state == 1,
                holdable: true,
            });
        }
    }
    events
}

/// Parser for the Stream Deck Plus, whose reports are tagged with an
/// input type and multiplex buttons, knobs and touch gestures.
fn decode_multi_input(profile: &ModelProfile, report: &[u8], key_state: &mut [u8]) -> Vec<Key> {
    let Some(screen) = &profile.screen else {
        return Vec::new();
    };
    if report.len() < crate::profile::MULTI_INPUT_REPORT_LEN {
        log::debug!("short input report ({} bytes), skipping", report.len());
        return Vec::new();
    }

    let buttons = profile.columns * profile.rows;
    match report[POSITION_TYPE] {
        INPUT_TYPE_BUTTON => {
            let offset = profile.key_state_offset;
            let mut events = Vec::new();
            for i in 0..buttons as usize {
                let state = report[offset + i];
                if state != key_state[i] {
                    key_state[i] = state;
                    events.push(Key {
                        index: i as u8,
                        pressed: state == 1,
                        holdable: true,
                    });
                }
            }
            events
        }

        INPUT_TYPE_KNOB => decode_knobs(report, key_state, buttons, screen.knobs),

        INPUT_TYPE_TOUCH => decode_touch(report, buttons, screen.knobs, screen.segments, screen.width),

        tag => {
            log::debug!("unknown input type tag {:#04x}, skipping", tag);
            Vec::new()
        }
    }
}

fn decode_knobs(report: &[u8], key_state: &mut [u8], buttons: u8, knobs: u8) -> Vec<Key> {
    let usage = report[POSITION_KNOB_USAGE];
    let mut events = Vec::new();

    for knob in 0..knobs as usize {
        let value = report[KNOB_STATE_OFFSET + knob];

        match usage {
            KNOB_USAGE_PRESS => {
                let index = buttons as usize + knob;
                if value != key_state[index] {
                    key_state[index] = value;
                    events.push(Key {
                        index: index as u8,
                        pressed: value == 1,
                        holdable: true,
                    });
                }
            }

            KNOB_USAGE_DIAL if value != 0 => {
                // The delta is a signed byte; the magnitude is ignored,
                // every non-zero report is one turn event.
                let index = if value > 127 {
                    buttons + knobs + knob as u8
                } else {
                    buttons + 2 * knobs + knob as u8
                };
                events.push(Key {
                    index,
                    pressed: true,
                    holdable: false,
                });
            }

            _ => {}
        }
    }
    events
}

fn decode_touch(report: &[u8], buttons: u8, knobs: u8, segments: u8, screen_width: u16) -> Vec<Key> {
    let usage = report[POSITION_TOUCH_USAGE];
    let x = u16::from_le_bytes([report[POSITION_TOUCH_X], report[POSITION_TOUCH_X + 1]]);

    let segment_width = screen_width / segments as u16;
    let segment = (x / segment_width) as u8;

    let index = match usage {
        TOUCH_USAGE_SHORT => buttons + 3 * knobs + segment,
        TOUCH_USAGE_LONG => buttons + 3 * knobs + segments + segment,

        TOUCH_USAGE_SWIPE => {
            let x2 = u16::from_le_bytes([report[POSITION_TOUCH_X2], report[POSITION_TOUCH_X2 + 1]]);
            let start = x / SWIPE_SEGMENT_WIDTH;
            let stop = x2 / SWIPE_SEGMENT_WIDTH;

            if start < stop {
                buttons + 3 * knobs + 2 * segments
            } else if start > stop {
                buttons + 3 * knobs + 2 * segments + 1
            } else {
                return Vec::new();
            }
        }

        usage => {
            log::debug!("unknown touch usage {:#04x}, skipping", usage);
            return Vec::new();
        }
    };

    vec![Key {
        index,
        pressed: true,
        holdable: false,
    }]
}
