// The TUI owns the terminal, so logs go to <kit_dir>/.drumpad/drumpad.log.
// RUST_LOG works as usual, default is info.
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use env_logger::{Builder, Env, Target};

const LOG_DIR: &str = ".drumpad";
const LOG_FILE: &str = "drumpad.log";

pub fn log_file_path(base: &Path) -> PathBuf {
    base.join(LOG_DIR).join(LOG_FILE)
}

fn open_log(base: &Path) -> std::io::Result<(PathBuf, File)> {
    let path = log_file_path(base);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((path, file))
}

/// Start logging to the kit's log file, or to the temp dir when the kit dir
/// can't be written. Returns where the log ended up; `None` means no logging,
/// which is never a reason not to play.
pub fn init(kit_dir: &Path) -> Option<PathBuf> {
    let (path, file) = open_log(kit_dir)
        .or_else(|_| open_log(&std::env::temp_dir()))
        .ok()?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .unwrap_or(()); // already initialised, keep the first logger
    Some(path)
}
