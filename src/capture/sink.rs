use std::io::Write;

use crate::foundation::error::{FolioError, FolioResult};

/// The output channel of one rendering engine, reused as a stack of capture frames.
///
/// While no capture is active, written text goes straight to the primary channel. Opening a
/// capture frame redirects writes into an in-memory buffer; closing the innermost frame returns
/// its accumulated text. Frames close strictly LIFO.
pub struct CaptureSink {
    primary: Box<dyn Write + Send>,
    frames: Vec<String>,
}

impl CaptureSink {
    /// Wrap an arbitrary primary output channel.
    pub fn new(primary: Box<dyn Write + Send>) -> Self {
        Self {
            primary,
            frames: Vec::new(),
        }
    }

    /// A sink writing to the process standard output.
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Open a new capture frame; subsequent writes accumulate in it.
    pub fn begin_capture(&mut self) {
        self.frames.push(String::new());
    }

    /// Close the innermost capture frame and return its text.
    ///
    /// `None` when no capture is active, which unwind loops treat as their stop signal.
    pub fn end_capture(&mut self) -> Option<String> {
        self.frames.pop()
    }

    /// Number of capture frames currently open.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Append text to the innermost capture frame, or to the primary channel when no capture
    /// is active.
    pub fn write_str(&mut self, text: &str) -> FolioResult<()> {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.push_str(text);
                Ok(())
            }
            None => {
                self.primary
                    .write_all(text.as_bytes())
                    .map_err(|e| FolioError::Other(e.into()))?;
                self.primary
                    .flush()
                    .map_err(|e| FolioError::Other(e.into()))
            }
        }
    }
}

impl Default for CaptureSink {
    fn default() -> Self {
        Self::stdout()
    }
}

impl std::fmt::Debug for CaptureSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSink")
            .field("depth", &self.frames.len())
            .finish_non_exhaustive()
    }
}
