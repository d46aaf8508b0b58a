//! Device façade tests against a recording transport

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::RecordingTransport;
use image::{DynamicImage, Rgba, RgbaImage};
use streamdeck_rs_usb::profile::{
    ModelProfile, PID_STREAMDECK, PID_STREAMDECK_MINI, PID_STREAMDECK_PEDAL, PID_STREAMDECK_PLUS,
    PID_STREAMDECK_V2, PID_STREAMDECK_XL,
};
use streamdeck_rs_usb::{Device, Error};

fn open_mock(pid: u16) -> (Device, Arc<RecordingTransport>) {
    let profile = ModelProfile::for_pid(pid).unwrap();
    let transport = Arc::new(RecordingTransport::default());
    let device = Device::with_transport(profile, transport.clone());
    (device, transport)
}

fn black(pixels: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        pixels,
        pixels,
        Rgba([0, 0, 0, 255]),
    ))
}

#[tokio::test]
async fn test_brightness_report() {
    let (device, transport) = open_mock(PID_STREAMDECK_XL);

    device.set_brightness(57).await.unwrap();

    let report = transport.last_feature_send();
    assert_eq!(report.len(), 32);
    assert_eq!(&report[..3], &[0x03, 0x08, 0x39]);
    assert!(report[3..].iter().all(|&b| b == 0));
}

#[tokio::test]
async fn test_brightness_clamped_to_100() {
    let (device, transport) = open_mock(PID_STREAMDECK_XL);

    device.set_brightness(150).await.unwrap();
    assert_eq!(transport.last_feature_send()[2], 100);
}

#[tokio::test]
async fn test_reset_report() {
    let (device, transport) = open_mock(PID_STREAMDECK_PLUS);

    device.reset().await.unwrap();

    let report = transport.last_feature_send();
    assert_eq!(report.len(), 32);
    assert_eq!(&report[..2], &[0x03, 0x02]);
    assert!(report[2..].iter().all(|&b| b == 0));
}

#[tokio::test]
async fn test_original_set_image_full_upload() {
    // 72x72 black on key 0 of the original Stream Deck: the key index is
    // mirrored to 4 on the wire, the BMP body (54 + 72*72*3 = 15606
    // bytes) fills exactly two 7803-byte payload pages
    let (device, transport) = open_mock(PID_STREAMDECK);

    device.set_image(0, &black(72)).await.unwrap();

    let writes = transport.writes.lock().unwrap();
    assert_eq!(writes.len(), 2);
    assert!(writes.iter().all(|frame| frame.len() == 7819));

    let mut first_header = vec![0x02, 0x01, 0x01, 0x00, 0x00, 0x05];
    first_header.resize(16, 0);
    assert_eq!(&writes[0][..16], &first_header[..]);

    // BMP magic right after the page header, black body after that
    assert_eq!(&writes[0][16..18], &[0x42, 0x4d]);
    assert!(writes[0][70..].iter().all(|&b| b == 0));

    let mut second_header = vec![0x02, 0x01, 0x02, 0x00, 0x01, 0x05];
    second_header.resize(16, 0);
    assert_eq!(&writes[1][..16], &second_header[..]);
}

#[tokio::test]
async fn test_mini_page_numbering_starts_at_zero() {
    let (device, transport) = open_mock(PID_STREAMDECK_MINI);

    device.set_image(2, &black(80)).await.unwrap();

    let writes = transport.writes.lock().unwrap();
    // 54 + 80*80*3 = 19254 bytes over 1008-byte payloads
    assert_eq!(writes.len(), 20);
    assert!(writes.iter().all(|frame| frame.len() == 1024));

    assert_eq!(&writes[0][..6], &[0x02, 0x01, 0x00, 0x00, 0x00, 0x03]);
    assert_eq!(&writes[19][..6], &[0x02, 0x01, 0x13, 0x00, 0x01, 0x03]);
}

#[tokio::test]
async fn test_set_image_rejects_wrong_dimensions() {
    let (device, transport) = open_mock(PID_STREAMDECK);

    let err = device.set_image(0, &black(10)).await.unwrap_err();
    assert!(matches!(err, Error::WrongDimensions { expected: 72 }));
    assert!(transport.writes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_set_image_surfaces_page_write_error() {
    let (device, transport) = open_mock(PID_STREAMDECK_V2);
    transport
        .fail_writes
        .store(true, std::sync::atomic::Ordering::Relaxed);

    let err = device.set_image(0, &black(72)).await.unwrap_err();
    assert!(err.to_string().contains("image page"));
}

#[tokio::test]
async fn test_touch_image_frames() {
    let (device, transport) = open_mock(PID_STREAMDECK_PLUS);

    // Segment 1: a 200x100 rectangle at x=200
    let segment = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        200,
        100,
        Rgba([0, 0, 0, 255]),
    ));
    device.set_touch_segment_image(1, &segment).await.unwrap();

    let writes = transport.writes.lock().unwrap();
    assert!(!writes.is_empty());
    assert!(writes.iter().all(|frame| frame.len() == 1024));

    let first = &writes[0];
    assert_eq!(&first[..2], &[0x02, 0x0c]);
    assert_eq!(&first[2..4], &200u16.to_le_bytes());
    assert_eq!(&first[6..8], &200u16.to_le_bytes());
    assert_eq!(&first[8..10], &100u16.to_le_bytes());

    // Exactly the final frame carries the last-page flag
    let flags: Vec<u8> = writes.iter().map(|frame| frame[10]).collect();
    assert!(flags[..flags.len() - 1].iter().all(|&f| f == 0));
    assert_eq!(*flags.last().unwrap(), 1);
}

#[tokio::test]
async fn test_touch_image_unsupported_off_plus() {
    let (device, _transport) = open_mock(PID_STREAMDECK_XL);

    let err = device
        .set_touch_image(0, 0, 200, 100, &black(100))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperation(_)));
}

#[tokio::test]
async fn test_pedal_visual_operations_are_noops() {
    let (device, transport) = open_mock(PID_STREAMDECK_PEDAL);

    device.set_image(0, &black(72)).await.unwrap();
    device.reset().await.unwrap();
    device.clear().await.unwrap();
    device.set_brightness(50).await.unwrap();

    assert!(transport.writes.lock().unwrap().is_empty());
    assert_eq!(transport.feature_send_count(), 0);
}

#[tokio::test]
async fn test_firmware_version_reads_ascii_tail() {
    let (device, transport) = open_mock(PID_STREAMDECK_V2);

    let mut reply = vec![0u8; 32];
    reply[6..14].copy_from_slice(b"3.00.000");
    *transport.feature_reply.lock().unwrap() = reply;

    assert_eq!(device.firmware_version().await.unwrap(), "3.00.000");
}

#[tokio::test]
async fn test_clear_writes_every_button() {
    let (device, transport) = open_mock(PID_STREAMDECK_V2);

    device.clear().await.unwrap();

    // 15 keys, one JPEG each; every key index must appear in a header
    let writes = transport.writes.lock().unwrap();
    let mut keys: Vec<u8> = writes.iter().map(|frame| frame[2]).collect();
    keys.dedup();
    assert_eq!(keys, (0..15).collect::<Vec<u8>>());
}

#[tokio::test]
async fn test_clear_continues_past_errors_and_surfaces_the_first() {
    let (device, transport) = open_mock(PID_STREAMDECK_V2);
    transport
        .fail_writes
        .store(true, std::sync::atomic::Ordering::Relaxed);

    let err = device.clear().await.unwrap_err();
    assert!(matches!(&err, Error::TransportWrite(_)));
    assert!(err.to_string().contains("image page"));

    // every key's upload was still attempted: each of the 15 keys fails
    // on its first page and the sweep moves on to the next key
    assert_eq!(
        transport
            .write_attempts
            .load(std::sync::atomic::Ordering::Relaxed),
        15
    );
}

#[tokio::test]
async fn test_sleeping_brightness_only_updates_restore_target() {
    let (device, transport) = open_mock(PID_STREAMDECK_XL);

    device.set_brightness(60).await.unwrap();
    device.sleep().await.unwrap();
    assert!(device.asleep().await.unwrap());
    // instantaneous fade: exactly one report, turning the display off
    assert_eq!(transport.feature_send_count(), 2);
    assert_eq!(transport.last_feature_send()[2], 0);

    // while asleep, a non-zero brightness produces no transport traffic
    device.set_brightness(80).await.unwrap();
    assert_eq!(transport.feature_send_count(), 2);

    // wake restores the last requested brightness
    device.wake().await.unwrap();
    assert!(!device.asleep().await.unwrap());
    assert_eq!(transport.last_feature_send()[2], 80);
}

#[tokio::test]
async fn test_sleep_timeout_triggers_sleep() {
    let (device, transport) = open_mock(PID_STREAMDECK_XL);

    device.set_brightness(40).await.unwrap();
    device.set_sleep_timeout(Duration::from_millis(10)).await.unwrap();

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert!(device.asleep().await.unwrap());
    assert_eq!(transport.last_feature_send()[2], 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_read_keys_emits_events_and_closes() {
    let (device, transport) = open_mock(PID_STREAMDECK);

    let mut press = vec![0u8; 16];
    press[1] = 1;
    transport.push_read(press);
    transport.push_read(vec![0u8; 16]);

    let mut keys = device.read_keys().await.unwrap();

    let key = keys.recv().await.unwrap();
    assert_eq!((key.index, key.pressed, key.holdable), (4, true, true));

    let key = keys.recv().await.unwrap();
    assert_eq!((key.index, key.pressed), (4, false));

    // script exhausted: the transport fails and the channel closes
    assert!(keys.recv().await.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_waking_input_is_swallowed() {
    let (device, transport) = open_mock(PID_STREAMDECK_XL);

    device.set_brightness(70).await.unwrap();
    device.sleep().await.unwrap();

    let mut press = vec![0u8; 36];
    press[4] = 1;
    transport.push_read(press);
    transport.push_read(vec![0u8; 36]);

    let mut keys = device.read_keys().await.unwrap();

    // the press woke the device instead of emitting an event, and the
    // release diffs against discarded state, so nothing surfaces
    assert!(keys.recv().await.is_none());

    assert!(!device.asleep().await.unwrap());
    assert_eq!(transport.last_feature_send()[2], 70);
}
