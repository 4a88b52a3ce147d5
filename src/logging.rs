//! Process-wide logging setup
//!
//! Components log through the `log` facade; this installs the single
//! `env_logger` backend that writes every record to stderr and, when
//! possible, to a log file.

use env_logger::{Builder, Env, Target};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Log file used when none is given on the command line
pub const DEFAULT_LOG_FILE: &str = "io_metrics_api_calls.log";

/// Duplicates log output to stderr and an append-mode file.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// Install the global logger. Call once, before any other work.
///
/// The level is `info`, or `debug` when `debug` is set; `LOG_LEVEL`
/// overrides both. Records are formatted as
/// `<timestamp> - <target> - <LEVEL> - <message>`.
pub fn init(debug: bool, log_file: Option<&Path>) {
    let log_level = match debug {
        true => "debug",
        false => "info",
    };
    let env = Env::default().filter_or("LOG_LEVEL", log_level);

    let mut builder = Builder::from_env(env);
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} - {} - {} - {}",
            buf.timestamp_millis(),
            record.target(),
            record.level(),
            record.args()
        )
    });

    let mut file_error = None;
    if let Some(path) = log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(Tee { file })));
            }
            Err(e) => file_error = Some((path.display().to_string(), e)),
        }
    }

    builder.init();

    if let Some((path, e)) = file_error {
        log::warn!("Cannot open log file {}, logging to stderr only: {}", path, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_tee_writes_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("run.log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .unwrap();

        let mut tee = Tee { file };
        tee.write_all(b"first line\n").unwrap();
        tee.write_all(b"second line\n").unwrap();
        tee.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first line\nsecond line\n");
    }
}
