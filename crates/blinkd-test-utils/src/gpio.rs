//! Mock GPIO line for tests.
//!
//! [`MockLine`] stands in for hardware in event-loop and IPC tests. Every
//! write is recorded, so tests can assert the write-on-change policy as
//! well as the final level. Clones share state; keep one as an observer
//! while the daemon owns the other.

use std::sync::{Arc, Mutex};

use blinkd_core::gpio::{GpioError, LedLine};

#[derive(Debug, Default)]
struct MockLineInner {
    level: bool,
    writes: Vec<bool>,
}

/// A recording stand-in for a hardware GPIO line. Starts low.
#[derive(Debug, Clone, Default)]
pub struct MockLine {
    inner: Arc<Mutex<MockLineInner>>,
}

impl MockLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The level last written (false if never written).
    pub fn level(&self) -> bool {
        self.inner.lock().unwrap().level
    }

    /// Every value written, in order.
    pub fn writes(&self) -> Vec<bool> {
        self.inner.lock().unwrap().writes.clone()
    }

    /// How many writes the line has received.
    pub fn write_count(&self) -> usize {
        self.inner.lock().unwrap().writes.len()
    }
}

impl LedLine for MockLine {
    fn get(&self) -> Result<bool, GpioError> {
        Ok(self.inner.lock().unwrap().level)
    }

    fn set(&mut self, level: bool) -> Result<(), GpioError> {
        let mut inner = self.inner.lock().unwrap();
        inner.level = level;
        inner.writes.push(level);
        Ok(())
    }
}
