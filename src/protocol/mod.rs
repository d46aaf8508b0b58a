//! Wire protocol pieces shared by all hardware variants
//!
//! Feature-report command prefixes for the two firmware revisions, plus
//! the page-header builders and the image pager used by the upload path.

pub mod headers;
pub mod input;
pub mod pager;

/// Rev1 firmware-version request prefix
pub const REV1_FIRMWARE: &[u8] = &[0x04];
/// Rev1 reset command
pub const REV1_RESET: &[u8] = &[0x0b, 0x63];
/// Rev1 brightness command; the percentage byte is appended
pub const REV1_BRIGHTNESS: &[u8] = &[0x05, 0x55, 0xaa, 0xd1, 0x01];

/// Rev2 firmware-version request prefix
pub const REV2_FIRMWARE: &[u8] = &[0x05];
/// Rev2 reset command
pub const REV2_RESET: &[u8] = &[0x03, 0x02];
/// Rev2 brightness command; the percentage byte is appended
pub const REV2_BRIGHTNESS: &[u8] = &[0x03, 0x08];

/// Builds a feature-report buffer of exactly `size` bytes: the command
/// prefix in the low bytes, the remainder zero.
pub fn feature_report(command: &[u8], size: usize) -> Vec<u8> {
    let mut report = vec![0u8; size];
    let len = command.len().min(size);
    report[..len].copy_from_slice(&command[..len]);
    report
}
