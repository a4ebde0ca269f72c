use log::{Level, Metadata, Record};
use once_cell::sync::OnceCell;
use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::PathBuf;

use crate::error::AppError;
use crate::settings::data_dir;

#[derive(Debug)]
struct FileLogger {
    log_file: PathBuf,
    level: Level,
}

static LOGGER: OnceCell<FileLogger> = OnceCell::new();

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let log_entry = format!(
                "{} {} - {}\n",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            );

            if let Ok(mut file) = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.log_file)
            {
                let _ = file.write_all(log_entry.as_bytes());
            }
        }
    }

    fn flush(&self) {}
}

// The terminal belongs to the UI, so everything goes to <data dir>/log.txt.
pub fn init(debug_mode: bool) -> Result<PathBuf, AppError> {
    let log_path = data_dir()?;
    create_dir_all(&log_path)?;
    let log_file = log_path.join("log.txt");

    let level = if debug_mode { Level::Debug } else { Level::Info };
    let logger = LOGGER.get_or_init(|| FileLogger {
        log_file: log_file.clone(),
        level,
    });

    log::set_logger(logger)?;
    log::set_max_level(logger.level.to_level_filter());
    Ok(log_file)
}
