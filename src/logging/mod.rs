use std::io;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// Buffers one formatted event and hands it to the browser console on drop.
pub(crate) struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buf);
        emit(uses_error_channel(&self.level), line.trim_end());
    }
}

pub(crate) fn uses_error_channel(level: &Level) -> bool {
    *level <= Level::WARN
}

#[cfg(target_arch = "wasm32")]
fn emit(error: bool, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    if error {
        web_sys::console::error_1(&value);
    } else {
        web_sys::console::log_1(&value);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_error: bool, line: &str) {
    eprintln!("{line}");
}

#[derive(Clone, Copy, Default)]
pub(crate) struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: Level::INFO,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: *meta.level(),
            buf: Vec::new(),
        }
    }
}

pub(crate) fn max_level() -> Level {
    if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Install the global subscriber. Safe to call more than once.
pub(crate) fn init() {
    let installed = tracing_subscriber::fmt()
        .with_writer(MakeConsoleWriter)
        .with_max_level(max_level())
        .without_time()
        .with_target(false)
        .try_init();

    if installed.is_ok() {
        tracing::debug!("console logging installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_warn_and_error_use_error_channel() {
        assert!(uses_error_channel(&Level::ERROR));
        assert!(uses_error_channel(&Level::WARN));
        assert!(!uses_error_channel(&Level::INFO));
        assert!(!uses_error_channel(&Level::DEBUG));
    }

    #[test]
    fn test_writer_buffers_partial_writes() {
        let mut w = MakeConsoleWriter.make_writer();
        w.write_all(b"upload ").expect("write");
        w.write_all(b"started").expect("write");
        assert_eq!(w.buf, b"upload started");
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
    }
}
