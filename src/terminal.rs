//! The terminal the engine draws on.
//!
//! [`Terminal::acquire`] checks that stdout is an interactive terminal, switches stdin to
//! raw mode and hides the cursor. The returned guard puts everything back when dropped.
//!
//! Restoration has to happen no matter how the process ends, so three other paths can
//! trigger it besides `Drop`: a panic hook, a watcher thread for `SIGINT`, `SIGTERM` and
//! `SIGHUP`, and [`exit`]. The saved terminal state sits in one process-wide slot and is
//! taken by whichever path gets there first; the others find it empty and do nothing.
//!
//! Note: If a run was killed with `SIGKILL` and the terminal is left in a bad state, run
//! `reset`.

use crate::rendering::framebuffer::Dimensions;
use crossterm::tty::IsTty;
use crossterm::{cursor, execute};
use log::{info, warn};
use std::fs::File;
use std::io;
use std::sync::{Mutex, OnceLock};

/// Something that knows how large the drawable area is.
pub trait Surface {
    /// The current size, clamped to the framebuffer's capacity.
    fn current_size(&mut self) -> io::Result<Dimensions>;
}

/// A surface whose size never changes. Useful for headless runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedSize(pub Dimensions);

impl Surface for FixedSize {
    fn current_size(&mut self) -> io::Result<Dimensions> {
        Ok(self.0)
    }
}

/// Holds a value that must be consumed at most once, from any thread.
///
/// `restore_with` runs its closure while holding the lock, so a second caller waits for
/// the first restoration to finish and then sees an empty slot.
pub(crate) struct RestoreSlot<T> {
    saved: Mutex<Option<T>>,
}

impl<T> RestoreSlot<T> {
    pub(crate) const fn new() -> Self {
        Self {
            saved: Mutex::new(None),
        }
    }

    /// Stores `value`. Fails if the slot is already armed.
    pub(crate) fn arm(&self, value: T) -> Result<(), T> {
        let mut saved = self.saved.lock().unwrap_or_else(|e| e.into_inner());
        if saved.is_some() {
            return Err(value);
        }
        *saved = Some(value);
        Ok(())
    }

    /// Takes the value and hands it to `f`. Returns whether `f` ran.
    pub(crate) fn restore_with(&self, f: impl FnOnce(T)) -> bool {
        let mut saved = self.saved.lock().unwrap_or_else(|e| e.into_inner());
        match saved.take() {
            Some(value) => {
                f(value);
                true
            }
            None => false,
        }
    }
}

static SAVED: RestoreSlot<sys::Saved> = RestoreSlot::new();

/// Raw-mode guard for the controlling terminal. Also the production [`Surface`].
#[derive(Debug)]
pub struct Terminal {
    _private: (),
}

impl Terminal {
    /// Enters raw mode for the lifetime of the returned guard.
    ///
    /// Fails if stdout or stdin is not a terminal, if the terminal attributes cannot be
    /// changed, or if another `Terminal` is currently alive.
    pub fn acquire() -> io::Result<Self> {
        let mut stdout = io::stdout();
        if !stdout.is_tty() {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "not a terminal window",
            ));
        }
        // the size query is part of the capability check
        let (width, height) = crossterm::terminal::size()?;

        let saved = sys::enter()?;
        if let Err(saved) = SAVED.arm(saved) {
            let _ = sys::leave(saved);
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "terminal is already in use by another engine",
            ));
        }
        install_panic_hook();
        if let Err(err) = install_signal_watcher() {
            restore();
            return Err(err);
        }
        if let Err(err) = execute!(stdout, cursor::Hide) {
            restore();
            return Err(err);
        }

        info!("terminal acquired ({width}x{height}), raw mode on");
        Ok(Self { _private: () })
    }
}

impl Surface for Terminal {
    fn current_size(&mut self) -> io::Result<Dimensions> {
        let (width, height) = crossterm::terminal::size()?;
        Ok(Dimensions::clamped(width as usize, height as usize))
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore();
    }
}

/// Puts the terminal back into the mode it was in before [`Terminal::acquire`].
///
/// Safe to call from any thread and any number of times; only the first call after an
/// acquisition does anything. Returns whether this call performed the restoration.
pub fn restore() -> bool {
    SAVED.restore_with(|saved| {
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, cursor::Show) {
            warn!("could not show cursor: {err}");
        }
        match sys::leave(saved) {
            Ok(()) => info!("terminal restored"),
            Err(err) => warn!("could not restore terminal mode: {err}"),
        }
    })
}

/// An unbuffered handle to stdout for frame output.
///
/// `io::Stdout` is line buffered and would split a frame into one write per line batch;
/// a duplicated descriptor lets each frame reach the terminal in a single `write`.
#[cfg(unix)]
pub fn frame_output() -> io::Result<File> {
    use std::os::fd::AsFd;
    Ok(File::from(io::stdout().as_fd().try_clone_to_owned()?))
}

#[cfg(windows)]
pub fn frame_output() -> io::Result<File> {
    use std::os::windows::io::AsHandle;
    Ok(File::from(io::stdout().as_handle().try_clone_to_owned()?))
}

/// Restores the terminal and exits the process with `code`.
///
/// `std::process::exit` skips destructors, so programs that quit from inside a callback
/// should use this instead.
pub fn exit(code: i32) -> ! {
    restore();
    std::process::exit(code)
}

/// Installs a panic hook that restores the terminal before the panic message is printed.
///
/// Without this, the message would be printed in raw mode and the shell left without echo.
fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |pinfo| {
            restore();
            previous(pinfo);
        }));
    });
}

#[cfg(unix)]
fn install_signal_watcher() -> io::Result<()> {
    use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    static WATCHER: OnceLock<()> = OnceLock::new();
    if WATCHER.get().is_some() {
        return Ok(());
    }
    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;
    std::thread::Builder::new()
        .name("toybox-signals".into())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                warn!("received signal {signal}, restoring terminal");
                restore();
                std::process::exit(128 + signal);
            }
        })?;
    let _ = WATCHER.set(());
    Ok(())
}

#[cfg(not(unix))]
fn install_signal_watcher() -> io::Result<()> {
    Ok(())
}

#[cfg(unix)]
mod sys {
    use std::io;
    use termios::{ECHO, ICANON, TCSANOW, Termios, VMIN, VTIME, tcsetattr};

    pub(super) type Saved = Termios;

    /// Non-canonical, no echo, reads return after one byte or 100ms.
    ///
    /// `ISIG` stays on so Ctrl-C still raises `SIGINT`.
    pub(super) fn enter() -> io::Result<Saved> {
        let original = Termios::from_fd(libc::STDIN_FILENO)?;
        let mut raw = original;
        raw.c_lflag &= !(ICANON | ECHO);
        raw.c_cc[VMIN] = 0;
        raw.c_cc[VTIME] = 1;
        tcsetattr(libc::STDIN_FILENO, TCSANOW, &raw)?;
        Ok(original)
    }

    pub(super) fn leave(saved: Saved) -> io::Result<()> {
        tcsetattr(libc::STDIN_FILENO, TCSANOW, &saved)
    }
}

#[cfg(not(unix))]
mod sys {
    use std::io;

    pub(super) type Saved = ();

    pub(super) fn enter() -> io::Result<Saved> {
        crossterm::terminal::enable_raw_mode()
    }

    pub(super) fn leave(_saved: Saved) -> io::Result<()> {
        crossterm::terminal::disable_raw_mode()
    }
}
