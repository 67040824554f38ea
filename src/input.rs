//! Bounded-wait keyboard input.
//!
//! The engine asks for at most one key per loop iteration and never waits longer than
//! its poll timeout. [`InputSource`] is that contract; [`TtyKeys`] implements it for a
//! terminal file descriptor in raw mode.

use std::io;
use std::time::Duration;

/// A keyboard that can be polled with a timeout.
pub trait InputSource {
    /// Waits up to `timeout` for a key.
    ///
    /// Returns `Ok(Some(byte))` as soon as one byte is available, `Ok(None)` when the
    /// timeout elapses first. Consumes at most one byte per call. An `Err` means the
    /// input channel is broken and the loop must stop.
    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<u8>>;
}

impl<I: InputSource + ?Sized> InputSource for Box<I> {
    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
        (**self).poll_key(timeout)
    }
}

#[cfg(unix)]
pub use unix::TtyKeys;

#[cfg(unix)]
mod unix {
    use super::InputSource;
    use std::io;
    use std::os::unix::io::RawFd;
    use std::time::Duration;

    /// Reads single bytes from a file descriptor, usually stdin.
    ///
    /// Only ASCII codes `1..=127` are reported as keys. A NUL or a byte `>= 0x80` (part
    /// of a UTF-8 sequence, say) is read and dropped, and that call reports no key.
    ///
    /// Bytes are read straight from the descriptor with `read(2)`. Going through
    /// `std::io::Stdin` would pull extra bytes into its buffer where `poll(2)` can no
    /// longer see them.
    #[derive(Debug)]
    pub struct TtyKeys {
        fd: RawFd,
    }

    impl TtyKeys {
        pub fn stdin() -> Self {
            Self::from_fd(libc::STDIN_FILENO)
        }

        /// Reads from `fd`. The descriptor is borrowed, not closed on drop.
        pub fn from_fd(fd: RawFd) -> Self {
            Self { fd }
        }
    }

    impl InputSource for TtyKeys {
        fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
            let mut pfd = libc::pollfd {
                fd: self.fd,
                events: libc::POLLIN,
                revents: 0,
            };
            let timeout_ms = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

            // SAFETY: `pfd` is a valid, exclusively borrowed pollfd for the whole call.
            let ready = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
            if ready < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    return Ok(None);
                }
                return Err(err);
            }
            if ready == 0 {
                return Ok(None);
            }
            if pfd.revents & libc::POLLNVAL != 0 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "input descriptor is not open",
                ));
            }

            let mut byte = 0u8;
            // SAFETY: the destination is one valid, writable byte.
            let n = unsafe { libc::read(self.fd, (&mut byte as *mut u8).cast(), 1) };
            match n {
                // NUL and bytes with the high bit set are consumed but are not keys
                1 if byte == 0 || !byte.is_ascii() => Ok(None),
                1 => Ok(Some(byte)),
                0 => Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input closed",
                )),
                _ => {
                    let err = io::Error::last_os_error();
                    match err.kind() {
                        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => Ok(None),
                        _ => Err(err),
                    }
                }
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::io::Write;
        use std::os::unix::io::AsRawFd;
        use std::os::unix::net::UnixStream;
        use std::time::Instant;

        #[test]
        fn times_out_without_input() {
            let (_writer, reader) = UnixStream::pair().unwrap();
            let mut keys = TtyKeys::from_fd(reader.as_raw_fd());
            let start = Instant::now();
            assert_eq!(keys.poll_key(Duration::from_millis(20)).unwrap(), None);
            assert!(start.elapsed() >= Duration::from_millis(15));
        }

        #[test]
        fn reads_one_byte_per_call() {
            let (mut writer, reader) = UnixStream::pair().unwrap();
            writer.write_all(b"wa").unwrap();
            let mut keys = TtyKeys::from_fd(reader.as_raw_fd());
            assert_eq!(keys.poll_key(Duration::from_millis(100)).unwrap(), Some(b'w'));
            assert_eq!(keys.poll_key(Duration::from_millis(100)).unwrap(), Some(b'a'));
            assert_eq!(keys.poll_key(Duration::from_millis(10)).unwrap(), None);
        }

        #[test]
        fn returns_early_when_a_key_arrives() {
            let (mut writer, reader) = UnixStream::pair().unwrap();
            let mut keys = TtyKeys::from_fd(reader.as_raw_fd());
            let handle = std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                writer.write_all(b"x").unwrap();
                writer
            });
            let start = Instant::now();
            assert_eq!(keys.poll_key(Duration::from_secs(5)).unwrap(), Some(b'x'));
            assert!(start.elapsed() < Duration::from_secs(5));
            drop(handle.join().unwrap());
        }

        #[test]
        fn only_ascii_bytes_are_keys() {
            let (mut writer, reader) = UnixStream::pair().unwrap();
            writer.write_all(&[0x00, 0xc3, 0xa9, b'w']).unwrap();
            let mut keys = TtyKeys::from_fd(reader.as_raw_fd());
            let delivered: Vec<_> = (0..4)
                .map(|_| keys.poll_key(Duration::from_millis(100)).unwrap())
                .collect();
            assert_eq!(delivered, vec![None, None, None, Some(b'w')]);
            assert_eq!(keys.poll_key(Duration::from_millis(10)).unwrap(), None);
        }

        #[test]
        fn closed_input_is_an_error() {
            let (writer, reader) = UnixStream::pair().unwrap();
            drop(writer);
            let mut keys = TtyKeys::from_fd(reader.as_raw_fd());
            let err = keys.poll_key(Duration::from_millis(100)).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        }
    }
}

#[cfg(not(unix))]
pub use fallback::TtyKeys;

#[cfg(not(unix))]
mod fallback {
    use super::InputSource;
    use crossterm::event::{self, Event, KeyCode, KeyEventKind};
    use std::io;
    use std::time::Duration;

    /// Keyboard input through crossterm's event reader, mapped back to single bytes.
    #[derive(Debug, Default)]
    pub struct TtyKeys;

    impl TtyKeys {
        pub fn stdin() -> Self {
            Self
        }
    }

    impl InputSource for TtyKeys {
        fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
            if !event::poll(timeout)? {
                return Ok(None);
            }
            let Event::Key(key) = event::read()? else {
                return Ok(None);
            };
            if key.kind == KeyEventKind::Release {
                return Ok(None);
            }
            Ok(match key.code {
                KeyCode::Char(c) if c.is_ascii() && c != '\0' => Some(c as u8),
                KeyCode::Enter => Some(b'\r'),
                KeyCode::Tab => Some(b'\t'),
                KeyCode::Backspace => Some(0x08),
                KeyCode::Esc => Some(0x1b),
                _ => None,
            })
        }
    }
}
