//! Scripted virtual device for driving whole transactions.

use std::io::{self, ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use rs232c::{SerialChannel, Transport};

/// What the device observed, shared with the test
#[derive(Default)]
pub struct Observed {
    pub written: Mutex<Vec<u8>>,
    pub writes: Mutex<usize>,
    pub dropped: AtomicBool,
}

/// Device that answers the first write with reply chunks released at fixed
/// offsets from the moment the write arrived.
pub struct ScriptedDevice {
    script: Vec<(Duration, Vec<u8>)>,
    reply: Vec<u8>,
    consumed: usize,
    written_at: Option<Instant>,
    observed: Arc<Observed>,
}

impl ScriptedDevice {
    pub fn new(script: Vec<(u64, Vec<u8>)>) -> (Self, Arc<Observed>) {
        let script: Vec<(Duration, Vec<u8>)> = script
            .into_iter()
            .map(|(ms, bytes)| (Duration::from_millis(ms), bytes))
            .collect();
        let reply = script.iter().flat_map(|(_, bytes)| bytes.clone()).collect();
        let observed = Arc::new(Observed::default());
        let device = Self {
            script,
            reply,
            consumed: 0,
            written_at: None,
            observed: Arc::clone(&observed),
        };
        (device, observed)
    }

    /// Device that never answers
    pub fn silent() -> (Self, Arc<Observed>) {
        Self::new(Vec::new())
    }

    pub fn into_channel(self) -> SerialChannel {
        SerialChannel::from_transport("virtual", Box::new(self))
    }

    fn released(&self) -> usize {
        let Some(written_at) = self.written_at else {
            return 0;
        };
        let elapsed = written_at.elapsed();
        self.script
            .iter()
            .filter(|(at, _)| *at <= elapsed)
            .map(|(_, bytes)| bytes.len())
            .sum()
    }
}

impl Read for ScriptedDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.released() - self.consumed;
        if available == 0 {
            thread::sleep(Duration::from_millis(1));
            return Err(io::Error::new(ErrorKind::TimedOut, "no data"));
        }
        let n = buf.len().min(available);
        buf[..n].copy_from_slice(&self.reply[self.consumed..self.consumed + n]);
        self.consumed += n;
        Ok(n)
    }
}

impl Write for ScriptedDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.observed.written.lock().unwrap().extend_from_slice(buf);
        *self.observed.writes.lock().unwrap() += 1;
        self.written_at.get_or_insert_with(Instant::now);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for ScriptedDevice {
    fn bytes_to_read(&self) -> io::Result<u32> {
        Ok((self.released() - self.consumed) as u32)
    }
}

impl Drop for ScriptedDevice {
    fn drop(&mut self) {
        self.observed.dropped.store(true, Ordering::SeqCst);
    }
}

/// Transport that refuses every write
pub struct BrokenLine;

impl Read for BrokenLine {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        thread::sleep(Duration::from_millis(1));
        Err(io::Error::new(ErrorKind::TimedOut, "no data"))
    }
}

impl Write for BrokenLine {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(ErrorKind::BrokenPipe, "line down"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for BrokenLine {
    fn bytes_to_read(&self) -> io::Result<u32> {
        Ok(0)
    }
}
