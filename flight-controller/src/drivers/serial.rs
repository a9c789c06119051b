/// One ground-station serial port. The driver owns the ring buffers; the
/// loop only ever polls.
pub trait CommandPort {
    /// Non-blocking read of the next received byte.
    fn check(&mut self) -> Option<u8>;
    /// Blocking read bounded by a timeout, used during preference uploads.
    fn get_timed(&mut self, timeout_ms: u32) -> Option<u8>;
    fn write(&mut self, bytes: &[u8]);
}

/// A port with nothing attached.
pub struct NullPort;

impl CommandPort for NullPort {
    fn check(&mut self) -> Option<u8> {
        None
    }

    fn get_timed(&mut self, _timeout_ms: u32) -> Option<u8> {
        None
    }

    fn write(&mut self, _bytes: &[u8]) {}
}
