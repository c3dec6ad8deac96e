use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use env_logger::{Env, Target};

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

fn buffer() -> MutexGuard<'static, Option<Vec<String>>> {
    BUFFER.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Activate buffering. While active, log output is stored instead of being
/// printed to stderr, so it cannot tear the TUI.
pub fn activate() {
    *buffer() = Some(Vec::new());
}

/// Deactivate buffering and return all collected messages.
pub fn drain() -> Vec<String> {
    buffer().take().unwrap_or_default()
}

/// Log sink that goes through the buffer.
pub struct BufferedStderr;

impl Write for BufferedStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = buffer();
        if let Some(lines) = guard.as_mut() {
            let text = String::from_utf8_lossy(buf);
            lines.extend(
                text.lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(str::to_string),
            );
            Ok(buf.len())
        } else {
            drop(guard);
            io::stderr().write(buf)
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// Install the global logger. `RUST_LOG` overrides the default level.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "coaster_book=debug,coasterbook=debug"
    } else {
        "warn"
    };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .target(Target::Pipe(Box::new(BufferedStderr)))
        .format_timestamp(None)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test so parallel tests never race on the global buffer
    #[test]
    fn test_buffer_lifecycle() {
        activate();
        BufferedStderr.write_all(b"[WARN  coaster_book] first\n").unwrap();
        BufferedStderr
            .write_all(b"[WARN  coaster_book] second\n\n")
            .unwrap();
        assert_eq!(
            drain(),
            vec!["[WARN  coaster_book] first", "[WARN  coaster_book] second"]
        );
        assert!(drain().is_empty());
    }
}
