//! Terminal output: prefixed log lines and a progress line for page emission.
//!
//! ```ignore
//! log!("sitemap"; "{} urls", count);
//!
//! if let Some(progress) = Progress::start("pages", total) {
//!     progress.tick();
//! }
//! ```
//!
//! The progress line is drawn in place on the last terminal row. A log line
//! written while it is active clears that row first; the next tick redraws it.

use colored::{ColoredString, Colorize};
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType, size},
};
use std::{
    io::{IsTerminal, Write, stdout},
    sync::{
        Mutex, OnceLock,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

/// Set while a [`Progress`] line occupies the current row.
static PROGRESS_ACTIVE: AtomicBool = AtomicBool::new(false);

const BAR_MIN: usize = 10;
const BAR_MAX: usize = 40;

/// Columns used by `[module] ` around a prefix.
#[inline]
const fn prefix_width(module_len: usize) -> usize {
    module_len + 3
}

/// Terminal width, 120 when it cannot be detected (CI).
fn terminal_width() -> usize {
    *TERMINAL_WIDTH.get_or_init(|| size().map_or(120, |(w, _)| w)) as usize
}

/// Log a message with a colored module prefix.
///
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Write one log line. Single-line messages are cut to the terminal width
/// when stdout is a terminal.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let mut stdout = stdout().lock();

    if PROGRESS_ACTIVE.load(Ordering::SeqCst) {
        execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
    }

    if message.contains('\n') || !stdout.is_terminal() {
        writeln!(stdout, "{prefix} {message}").ok();
    } else {
        let room = terminal_width().saturating_sub(prefix_width(module.len()));
        writeln!(stdout, "{prefix} {}", truncate_str(message, room)).ok();
    }
    stdout.flush().ok();
}

/// `error` red, `warn` magenta, `serve` blue, `build` green, the rest yellow.
fn colorize_prefix(module: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "error" => prefix.bright_red().bold(),
        "warn" => prefix.bright_magenta().bold(),
        "serve" => prefix.bright_blue().bold(),
        "build" => prefix.bright_green().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Cut to at most `max_len` bytes on a char boundary.
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ============================================================================
// Progress
// ============================================================================

/// `[pages] [████░░░░] 42/100`, updated from rayon workers.
pub struct Progress {
    module: &'static str,
    total: usize,
    done: AtomicUsize,
    draw: Mutex<()>,
}

impl Progress {
    /// `None` when stdout is not a terminal or there is at most one item,
    /// so CI logs never see cursor escapes.
    pub fn start(module: &'static str, total: usize) -> Option<Self> {
        if total <= 1 || !stdout().is_terminal() {
            return None;
        }
        PROGRESS_ACTIVE.store(true, Ordering::SeqCst);
        Some(Self {
            module,
            total,
            done: AtomicUsize::new(0),
            draw: Mutex::new(()),
        })
    }

    pub fn tick(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        let line = render_bar(self.module.len(), done, self.total, terminal_width());

        let _guard = self.draw.lock().ok();
        let mut stdout = stdout().lock();
        execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        write!(stdout, "{} {line}", colorize_prefix(self.module)).ok();
        stdout.flush().ok();
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if PROGRESS_ACTIVE.swap(false, Ordering::SeqCst) {
            let mut stdout = stdout().lock();
            execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
            stdout.flush().ok();
        }
    }
}

/// Bar and counter text after the prefix, sized to the terminal.
fn render_bar(module_len: usize, done: usize, total: usize, width: usize) -> String {
    let count = format!("{done}/{total}");
    // " [" + "]" + " " around the bar
    let overhead = prefix_width(module_len) + 4 + count.len();
    let bar_width = width.saturating_sub(overhead).clamp(BAR_MIN, BAR_MAX);
    let filled = (done.min(total) * bar_width).checked_div(total).unwrap_or(0);

    format!(
        "[{}{}] {count}",
        "█".repeat(filled),
        "░".repeat(bar_width - filled)
    )
}
