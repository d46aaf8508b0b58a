//! Per-variant image page headers
//!
//! Each page of an image upload starts with a small header telling the
//! firmware which key it belongs to, the page number and whether more
//! pages follow. The layout differs between hardware revisions; all
//! multi-byte fields are little-endian.

/// Page header used by the original Stream Deck (16 bytes, one-based
/// page numbering).
pub fn rev1_image_page_header(page: usize, key: u8, _payload_len: usize, last_page: bool) -> Vec<u8> {
    vec![
        0x02,
        0x01,
        (page + 1) as u8,
        0x00,
        last_page as u8,
        key + 1,
        0x00,
        0x00,
        0x00,
        0x00,
        0x00,
        0x00,
        0x00,
        0x00,
        0x00,
        0x00,
    ]
}

/// Page header used by the Stream Deck Mini (16 bytes). Unlike the
/// original, the Mini numbers pages from zero.
pub fn mini_image_page_header(page: usize, key: u8, _payload_len: usize, last_page: bool) -> Vec<u8> {
    vec![
        0x02,
        0x01,
        page as u8,
        0x00,
        last_page as u8,
        key + 1,
        0x00,
        0x00,
        0x00,
        0x00,
        0x00,
        0x00,
        0x00,
        0x00,
        0x00,
        0x00,
    ]
}

/// Page header used by the V2, MK.2, XL and Plus key displays (8 bytes).
pub fn rev2_image_page_header(page: usize, key: u8, payload_len: usize, last_page: bool) -> Vec<u8> {
    vec![
        0x02,
        0x07,
        key,
        last_page as u8,
        payload_len as u8,
        (payload_len >> 8) as u8,
        page as u8,
        (page >> 8) as u8,
    ]
}

/// Page header used by the Stream Deck Plus touch strip (16 bytes),
/// carrying the absolute target rectangle.
pub fn touch_screen_image_page_header(
    page: usize,
    x: u16,
    y: u16,
    width: u16,
    height: u16,
    payload_len: usize,
    last_page: bool,
) -> Vec<u8> {
    vec![
        0x02,
        0x0c,
        x as u8,
        (x >> 8) as u8,
        y as u8,
        (y >> 8) as u8,
        width as u8,
        (width >> 8) as u8,
        height as u8,
        (height >> 8) as u8,
        last_page as u8,
        page as u8,
        (page >> 8) as u8,
        payload_len as u8,
        (payload_len >> 8) as u8,
        0x00,
    ]
}
