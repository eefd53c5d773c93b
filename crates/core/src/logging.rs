//! Logging for the 6502 core.
//!
//! A small, process-wide logging layer with per-category levels. Messages
//! are built lazily, so a disabled category costs one atomic load.
//!
//! # Configuration
//!
//! Levels come from code (`LogConfig::set_level`), from a spec string
//! (`LogConfig::apply_spec`) or from the environment via `init_from_env`:
//!
//! - `EMU6502_LOG=debug` sets the global level
//! - `EMU6502_LOG=cpu=trace,interrupts=debug` sets per-category levels
//! - `EMU6502_LOG_FILE=path` sends output to a file instead of stderr
//!
//! # Usage
//!
//! ```rust
//! use emu_6502::logging::{log, LogCategory, LogLevel};
//!
//! log(LogCategory::Interrupts, LogLevel::Debug, || {
//!     format!("NMI: vector ${:04X}", 0xC123)
//! });
//! ```

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Sender};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Environment variable holding a log spec.
pub const LOG_ENV: &str = "EMU6502_LOG";
/// Environment variable holding a log file path.
pub const LOG_FILE_ENV: &str = "EMU6502_LOG_FILE";

/// Log level for controlling verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    /// Parse a level name or digit, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "0" => Some(LogLevel::Off),
            "error" | "err" | "1" => Some(LogLevel::Error),
            "warn" | "warning" | "2" => Some(LogLevel::Warn),
            "info" | "3" => Some(LogLevel::Info),
            "debug" | "4" => Some(LogLevel::Debug),
            "trace" | "5" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::Off,
        }
    }
}

/// Log category for the parts of the core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// Instruction execution, faults, reset
    Cpu,
    /// IRQ, NMI and BRK entry
    Interrupts,
    /// Bus accesses outside backed storage
    Memory,
}

impl LogCategory {
    pub const ALL: [LogCategory; 3] = [
        LogCategory::Cpu,
        LogCategory::Interrupts,
        LogCategory::Memory,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LogCategory::Cpu => "cpu",
            LogCategory::Interrupts => "interrupts",
            LogCategory::Memory => "memory",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Some(LogCategory::Cpu),
            "interrupts" | "irq" => Some(LogCategory::Interrupts),
            "memory" | "mem" | "bus" => Some(LogCategory::Memory),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Errors from parsing a log spec or opening a log file.
#[derive(thiserror::Error, Debug)]
pub enum LogSpecError {
    #[error("unknown log level `{0}`")]
    UnknownLevel(String),
    #[error("unknown log category `{0}`")]
    UnknownCategory(String),
    #[error("cannot open log file: {0}")]
    File(#[from] std::io::Error),
}

const CATEGORY_COUNT: usize = LogCategory::ALL.len();

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Sliding one-second window per category.
struct RateLimiter {
    max_per_second: AtomicUsize,
    window: Duration,
    state: Mutex<[WindowState; CATEGORY_COUNT]>,
}

#[derive(Default)]
struct WindowState {
    stamps: VecDeque<Instant>,
    dropped: usize,
}

impl RateLimiter {
    fn new(max_per_second: usize) -> Self {
        Self {
            max_per_second: AtomicUsize::new(max_per_second),
            window: Duration::from_secs(1),
            state: Mutex::new(Default::default()),
        }
    }

    /// Returns whether the message may be written, plus the number of
    /// messages dropped since the last one that got through.
    fn admit(&self, category: LogCategory, now: Instant) -> (bool, usize) {
        let mut state = lock(&self.state);
        let slot = &mut state[category.index()];
        while let Some(&front) = slot.stamps.front() {
            if now.duration_since(front) > self.window {
                slot.stamps.pop_front();
            } else {
                break;
            }
        }
        if slot.stamps.len() < self.max_per_second.load(Ordering::Relaxed) {
            slot.stamps.push_back(now);
            let dropped = std::mem::take(&mut slot.dropped);
            (true, dropped)
        } else {
            slot.dropped += 1;
            (false, 0)
        }
    }
}

/// Channel to the writer thread that owns the log file.
struct FileSink {
    sender: Sender<String>,
    writer: JoinHandle<()>,
}

impl FileSink {
    /// Hang up and wait for the writer to drain the queue.
    fn close(self) {
        drop(self.sender);
        let _ = self.writer.join();
    }
}

/// Process-wide logging configuration
pub struct LogConfig {
    global_level: AtomicU8,
    levels: [AtomicU8; CATEGORY_COUNT],
    file_sink: Mutex<Option<FileSink>>,
    rate_limiter: RateLimiter,
}

impl LogConfig {
    /// All logging off, 60 messages per second per category.
    fn new() -> Self {
        Self {
            global_level: AtomicU8::new(LogLevel::Off as u8),
            levels: Default::default(),
            file_sink: Mutex::new(None),
            rate_limiter: RateLimiter::new(60),
        }
    }

    pub fn global() -> &'static Self {
        static INSTANCE: OnceLock<LogConfig> = OnceLock::new();
        INSTANCE.get_or_init(LogConfig::new)
    }

    pub fn set_global_level(&self, level: LogLevel) {
        self.global_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn global_level(&self) -> LogLevel {
        LogLevel::from_u8(self.global_level.load(Ordering::Relaxed))
    }

    /// Override the level of one category. `Off` falls back to the global level.
    pub fn set_level(&self, category: LogCategory, level: LogLevel) {
        self.levels[category.index()].store(level as u8, Ordering::Relaxed);
    }

    pub fn level(&self, category: LogCategory) -> LogLevel {
        LogLevel::from_u8(self.levels[category.index()].load(Ordering::Relaxed))
    }

    pub fn should_log(&self, category: LogCategory, level: LogLevel) -> bool {
        if level == LogLevel::Off {
            return false;
        }
        let limit = match self.level(category) {
            LogLevel::Off => self.global_level(),
            specific => specific,
        };
        level <= limit
    }

    pub fn set_rate_limit(&self, max_per_second: usize) {
        self.rate_limiter
            .max_per_second
            .store(max_per_second, Ordering::Relaxed);
    }

    /// Turn everything off.
    pub fn reset(&self) {
        self.set_global_level(LogLevel::Off);
        for category in LogCategory::ALL {
            self.set_level(category, LogLevel::Off);
        }
    }

    /// Apply a spec such as `debug` or `cpu=trace,interrupts=debug`.
    ///
    /// A bare level or `all=<level>` sets the global level. The spec is
    /// validated completely before any level changes.
    pub fn apply_spec(&self, spec: &str) -> Result<(), LogSpecError> {
        let mut parsed = Vec::new();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (target, level) = match entry.split_once('=') {
                Some((target, level)) => (Some(target.trim()), level),
                None => (None, entry),
            };
            let level =
                LogLevel::parse(level).ok_or_else(|| LogSpecError::UnknownLevel(level.to_string()))?;
            let category = match target {
                None | Some("all") => None,
                Some(name) => Some(
                    LogCategory::parse(name)
                        .ok_or_else(|| LogSpecError::UnknownCategory(name.to_string()))?,
                ),
            };
            parsed.push((category, level));
        }
        for (category, level) in parsed {
            match category {
                Some(category) => self.set_level(category, level),
                None => self.set_global_level(level),
            }
        }
        Ok(())
    }

    /// Route output to `path`, appending. A writer thread does the file I/O.
    pub fn set_log_file(&self, path: &Path) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let (sender, receiver) = channel::<String>();
        let writer = thread::Builder::new()
            .name("emu6502-log".to_string())
            .spawn(move || {
                while let Ok(line) = receiver.recv() {
                    let _ = writeln!(file, "{}", line);
                }
                let _ = file.flush();
            })?;
        let previous = lock(&self.file_sink).replace(FileSink { sender, writer });
        if let Some(old) = previous {
            old.close();
        }
        Ok(())
    }

    /// Flush and close the log file, then go back to stderr.
    pub fn clear_log_file(&self) {
        let sink = lock(&self.file_sink).take();
        if let Some(sink) = sink {
            sink.close();
        }
    }

    fn emit(&self, line: String) {
        let sink = lock(&self.file_sink);
        match sink.as_ref() {
            Some(sink) => {
                if let Err(failed) = sink.sender.send(line) {
                    eprintln!("{}", failed.0);
                }
            }
            None => eprintln!("{}", line),
        }
    }
}

/// Configure the global `LogConfig` from `EMU6502_LOG` and `EMU6502_LOG_FILE`.
///
/// Unset variables leave the configuration untouched.
pub fn init_from_env() -> Result<(), LogSpecError> {
    let config = LogConfig::global();
    if let Ok(spec) = std::env::var(LOG_ENV) {
        config.apply_spec(&spec)?;
    }
    if let Ok(path) = std::env::var(LOG_FILE_ENV) {
        config.set_log_file(Path::new(&path))?;
    }
    Ok(())
}

/// Log a lazily-built message under `category` at `level`.
///
/// The closure only runs when the level is enabled and the category is
/// under its rate limit.
pub fn log<F>(category: LogCategory, level: LogLevel, message_fn: F)
where
    F: FnOnce() -> String,
{
    let config = LogConfig::global();
    if !config.should_log(category, level) {
        return;
    }
    let (allowed, dropped) = config.rate_limiter.admit(category, Instant::now());
    if dropped > 0 {
        config.emit(format!(
            "[{}] rate limit hit, {} message(s) dropped",
            category.name(),
            dropped
        ));
    }
    if allowed {
        config.emit(message_fn());
    }
}
