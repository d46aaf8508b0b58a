//! Recording transport used by the device façade tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use streamdeck_rs_usb::{Error, Result, Transport};

/// In-memory transport: records everything written, replays scripted
/// input reports and fails reads once the script runs dry, which is how
/// a test ends the input loop.
#[derive(Default)]
pub struct RecordingTransport {
    pub writes: Mutex<Vec<Vec<u8>>>,
    pub feature_sends: Mutex<Vec<Vec<u8>>>,
    pub feature_reply: Mutex<Vec<u8>>,
    pub reads: Mutex<VecDeque<Vec<u8>>>,
    pub fail_writes: AtomicBool,
    /// Counts every write call, the injected failures included
    pub write_attempts: AtomicUsize,
}

impl RecordingTransport {
    pub fn push_read(&self, report: Vec<u8>) {
        self.reads.lock().unwrap().push_back(report);
    }

    pub fn feature_send_count(&self) -> usize {
        self.feature_sends.lock().unwrap().len()
    }

    pub fn last_feature_send(&self) -> Vec<u8> {
        self.feature_sends
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no feature report was sent")
    }
}

impl Transport for RecordingTransport {
    fn read(&self, buf: &mut [u8]) -> Result<usize> {
        let Some(report) = self.reads.lock().unwrap().pop_front() else {
            return Err(Error::TransportRead("script exhausted".into()));
        };
        let n = report.len().min(buf.len());
        buf[..n].copy_from_slice(&report[..n]);
        Ok(n)
    }

    fn write(&self, frame: &[u8]) -> Result<usize> {
        self.write_attempts.fetch_add(1, Ordering::Relaxed);
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(Error::TransportWrite("injected failure".into()));
        }
        self.writes.lock().unwrap().push(frame.to_vec());
        Ok(frame.len())
    }

    fn get_feature_report(&self, buf: &mut [u8]) -> Result<usize> {
        let reply = self.feature_reply.lock().unwrap();
        let n = reply.len().min(buf.len());
        buf[..n].copy_from_slice(&reply[..n]);
        Ok(n)
    }

    fn send_feature_report(&self, buf: &[u8]) -> Result<usize> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(Error::TransportWrite("injected failure".into()));
        }
        self.feature_sends.lock().unwrap().push(buf.to_vec());
        Ok(buf.len())
    }

    fn shutdown(&self) {
        self.reads.lock().unwrap().clear();
    }
}
