//! In-memory output capture with optional live echo.
//!
//! A [`CaptureSink`] is handed to a child process's output stream. Every
//! write is appended to its buffer and, when echo is on, copied straight to
//! the console so operators can watch the run while it happens.

use std::io::{self, Write};

/// Console stream a sink mirrors its writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    /// Mirror to the process's standard output
    Stdout,
    /// Mirror to the process's standard error
    Stderr,
}

/// Append-only byte buffer that can mirror writes to the console.
///
/// Owned by a single call; not meant to be shared between threads.
#[derive(Debug, Default)]
pub struct CaptureSink {
    buffer: Vec<u8>,
    echo: Option<Echo>,
}

impl CaptureSink {
    /// A sink that only buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that buffers and mirrors to `echo`.
    pub fn echoing(echo: Echo) -> Self {
        Self {
            buffer: Vec::new(),
            echo: Some(echo),
        }
    }

    /// A sink that buffers and mirrors to `echo` when one is given.
    pub fn with_echo(echo: Option<Echo>) -> Self {
        Self {
            buffer: Vec::new(),
            echo,
        }
    }

    /// Bytes captured so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Captured content as text (invalid UTF-8 is replaced).
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }

    /// Consume the sink and return its text.
    pub fn into_string(self) -> String {
        match String::from_utf8(self.buffer) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }
}

impl Write for CaptureSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // Console trouble (closed pipe, etc.) must not lose captured output
        let echoed = match self.echo {
            Some(Echo::Stdout) => io::stdout().write_all(buf),
            Some(Echo::Stderr) => io::stderr().write_all(buf),
            None => Ok(()),
        };
        if let Err(e) = echoed {
            log::debug!("Failed to echo captured output: {e}");
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.echo {
            Some(Echo::Stdout) => io::stdout().flush(),
            Some(Echo::Stderr) => io::stderr().flush(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_in_order() {
        let mut sink = CaptureSink::new();
        sink.write_all(b"Initializing the backend...\n").unwrap();
        sink.write_all(b"Terraform has been successfully initialized!\n").unwrap();

        assert_eq!(
            sink.contents(),
            "Initializing the backend...\nTerraform has been successfully initialized!\n"
        );
    }

    #[test]
    fn test_write_reports_full_length() {
        let mut sink = CaptureSink::new();
        assert_eq!(sink.write(b"abc").unwrap(), 3);
        assert_eq!(sink.write(b"").unwrap(), 0);
        assert_eq!(sink.as_bytes(), b"abc");
    }

    #[test]
    fn test_echoing_sink_still_captures() {
        let mut sink = CaptureSink::echoing(Echo::Stderr);
        write!(sink, "Plan: {} to add", 2).unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.into_string(), "Plan: 2 to add");
    }

    #[test]
    fn test_quiet_sink_from_config() {
        let mut sink = CaptureSink::with_echo(None);
        sink.write_all(b"Refreshing state...\n").unwrap();
        assert_eq!(sink.contents(), "Refreshing state...\n");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut sink = CaptureSink::new();
        sink.write_all(&[b'o', b'k', 0xff]).unwrap();
        assert_eq!(sink.contents(), "ok\u{fffd}");
        assert_eq!(sink.into_string(), "ok\u{fffd}");
    }
}
