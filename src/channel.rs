//! The "Pandoc" output channel.
//!
//! One channel is created at startup and handed by reference to everything
//! that reports to the user's log: migration notices and the converter's
//! stdout/stderr. Appends are serialized, so concurrent renders interleave
//! whole messages but never split one.

use std::{
    fmt,
    fs::OpenOptions,
    io::{self, Write},
    path::Path,
    sync::Mutex,
};

enum Sink {
    Writer(Box<dyn Write + Send>),
    Memory(String),
}

pub struct OutputChannel {
    name: String,
    sink: Mutex<Sink>,
}

impl fmt::Debug for OutputChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputChannel")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl OutputChannel {
    pub fn new(name: impl Into<String>, writer: Box<dyn Write + Send>) -> Self {
        Self {
            name: name.into(),
            sink: Mutex::new(Sink::Writer(writer)),
        }
    }

    pub fn stdout(name: impl Into<String>) -> Self {
        Self::new(name, Box::new(io::stdout()))
    }

    /// Channel appending to `path`, created if missing.
    pub fn open(name: impl Into<String>, path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(name, Box::new(file)))
    }

    /// Channel that keeps everything in memory; see [`OutputChannel::contents`].
    pub fn memory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sink: Mutex::new(Sink::Memory(String::new())),
        }
    }

    /// Append `text` verbatim. Write failures are traced and dropped.
    pub fn append(&self, text: &str) {
        let mut sink = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        match &mut *sink {
            Sink::Memory(buf) => buf.push_str(text),
            Sink::Writer(w) => {
                if let Err(e) = w.write_all(text.as_bytes()).and_then(|()| w.flush()) {
                    tracing::warn!(channel = self.name.as_str(), error = %e, "output channel write failed");
                }
            }
        }
    }

    /// Everything appended so far. Empty for writer-backed channels.
    pub fn contents(&self) -> String {
        let sink = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        match &*sink {
            Sink::Memory(buf) => buf.clone(),
            Sink::Writer(_) => String::new(),
        }
    }
}
