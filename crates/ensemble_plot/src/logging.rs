use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Size at which the log is trimmed (5 MB)
const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;
/// Tail retained after trimming (1 MB)
const KEEP_SIZE: u64 = 1024 * 1024;

const LOG_FILE_NAME: &str = "ensemble_plot.log";

/// Cut `log_path` down to roughly its last `KEEP_SIZE` bytes once it exceeds
/// `MAX_LOG_SIZE`. The retained tail starts on a whole line.
///
/// Returns the number of bytes discarded; zero when the file is absent or small.
fn trim_log(log_path: &Path) -> std::io::Result<u64> {
    let size = match fs::metadata(log_path) {
        Ok(metadata) => metadata.len(),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };
    if size <= MAX_LOG_SIZE {
        return Ok(0);
    }

    let mut tail = Vec::with_capacity(KEEP_SIZE as usize);
    {
        let mut file = File::open(log_path)?;
        file.seek(SeekFrom::End(-(KEEP_SIZE as i64)))?;
        file.read_to_end(&mut tail)?;
    }

    let first_line = tail
        .iter()
        .position(|&b| b == b'\n')
        .map_or(0, |newline| newline + 1);
    let kept = &tail[first_line..];
    let discarded = size - kept.len() as u64;

    let mut file = File::create(log_path)?;
    writeln!(file, "--- ensemble_plot log trimmed, {discarded} older bytes dropped ---")?;
    file.write_all(kept)?;
    Ok(discarded)
}

/// Send tracing output to `{log_dir}/ensemble_plot.log`, trimming the file first
/// (see [`trim_log`]).
///
/// The level applies to this binary; the core library logs warnings only unless
/// `RUST_LOG` says otherwise.
pub fn init_logging(log_dir: &Path, level: &str) -> color_eyre::Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let log_path = log_dir.join(LOG_FILE_NAME);

    if let Err(e) = trim_log(&log_path) {
        eprintln!("Warning: could not trim {}: {e}", log_path.display());
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // RUST_LOG overrides the level given on the command line
    let default_filter = format!("ensemble_plot={level},ensemble_core=warn");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false),
        )
        .init();

    tracing::info!(log_path = %log_path.display(), "logging initialized");
    Ok(())
}
