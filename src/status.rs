//! Root window status text: colour / signal tokenizing and the signal
//! handshake with a dwmblocks style status generator.
//!
//! The raw status string mixes three things: printable text, colour control
//! bytes and signal delimiter bytes. [StatusText::parse] splits them into a
//! draw view (scheme + text segments) and a click view (signal + text
//! blocks) in one pass.
//!
//! Byte ranges:
//!   - `>= 0x20` printable, lands in every view
//!   - `0x0b..=0x1f` colour control: selects scheme `byte - 0x0b` for the
//!     text that follows
//!   - `0x01..=0x0a` signal delimiter: terminates a clickable block, with
//!     `0x0a` marking the end of the clickable region
use crate::Result;
use std::{
    fs::File,
    io,
    os::fd::AsRawFd,
    path::{Path, PathBuf},
};

/// The last signal delimiter byte: blocks after it are not clickable.
const DELIMITER_END: u8 = 0x0a;

/// Status text shown when no client has set one.
pub const DEFAULT_STATUS: &str = concat!("escher-", env!("CARGO_PKG_VERSION"));

/// A run of status text drawn with a single colour scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSegment {
    /// Index into the configured scheme table
    pub scheme: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StatusBlock {
    signal: u8,
    text: String,
}

/// A parsed status string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusText {
    plain: String,
    segments: Vec<StatusSegment>,
    blocks: Vec<StatusBlock>,
}

impl StatusText {
    pub fn parse(raw: &str) -> Self {
        let mut plain = String::new();
        let mut segments = Vec::new();
        let mut blocks = Vec::new();
        let (mut seg, mut blk) = (String::new(), String::new());
        let mut scheme = 0;

        for &b in raw.as_bytes() {
            if b >= 0x20 {
                let ch = b as char;
                plain.push(ch);
                seg.push(ch);
                blk.push(ch);
            } else if b > DELIMITER_END {
                if !seg.is_empty() {
                    segments.push(StatusSegment {
                        scheme,
                        text: std::mem::take(&mut seg),
                    });
                }
                scheme = (b - DELIMITER_END - 1) as usize;
            } else if b > 0 {
                blocks.push(StatusBlock {
                    signal: b,
                    text: std::mem::take(&mut blk),
                });
            }
        }
        if !seg.is_empty() {
            segments.push(StatusSegment { scheme, text: seg });
        }

        Self {
            plain,
            segments,
            blocks,
        }
    }

    /// The printable text only, for measuring the full status width.
    pub fn plain(&self) -> &str {
        &self.plain
    }

    /// The coloured runs to draw, left to right.
    pub fn segments(&self) -> &[StatusSegment] {
        &self.segments
    }

    /// Route a click at `x` pixels into the status text to the signal of
    /// the block under it. `width` measures a block's rendered text.
    ///
    /// Returns `None` past the end-of-region delimiter and for trailing
    /// text with no delimiter at all.
    pub fn signal_at<F>(&self, x: i32, width: F) -> Option<u8>
    where
        F: Fn(&str) -> i32,
    {
        let mut acc = 0;
        for b in self.blocks.iter() {
            acc += width(&b.text);
            if x < acc {
                return (b.signal != DELIMITER_END).then_some(b.signal);
            }
        }

        None
    }

    /// Whether any part of the status is clickable at all.
    pub fn has_signals(&self) -> bool {
        self.blocks.iter().any(|b| b.signal != DELIMITER_END)
    }
}

/// Queues click signals to the process maintaining the status text.
///
/// The status generator holds a write lock on its pid file while running;
/// probing the lock both checks liveness and yields the pid to signal. The
/// payload packs the block's signal number and the mouse button into one
/// int, delivered with the first realtime signal.
#[derive(Debug)]
pub struct StatusSignaller {
    lockfile: PathBuf,
    file: Option<File>,
}

impl StatusSignaller {
    pub fn new<P: AsRef<Path>>(lockfile: P) -> Self {
        Self {
            lockfile: lockfile.as_ref().to_path_buf(),
            file: None,
        }
    }

    /// Send `(signal, button)` to the lock holder. Silently does nothing
    /// when no process holds the lock.
    pub fn send(&mut self, signal: u8, button: u8) -> Result<()> {
        let pid = match self.probe()? {
            Some(pid) => pid,
            None => {
                // the cached fd may outlive a restarted generator
                self.file = None;
                match self.probe()? {
                    Some(pid) => pid,
                    None => {
                        debug!(lockfile = ?self.lockfile, "no status process holds the lock");
                        return Ok(());
                    }
                }
            }
        };

        let payload = ((signal as i32) << 8) | button as i32;
        let value = libc::sigval {
            sival_ptr: payload as *mut libc::c_void,
        };

        // SAFETY: pid comes from the kernel's lock table and the payload is
        // a plain int smuggled through the sigval pointer field
        let res = unsafe { libc::sigqueue(pid, libc::SIGRTMIN(), value) };
        if res == -1 {
            return Err(io::Error::last_os_error().into());
        }

        Ok(())
    }

    /// The pid of the process write-locking the pid file, if any.
    fn probe(&mut self) -> Result<Option<libc::pid_t>> {
        if self.file.is_none() {
            self.file = Some(File::open(&self.lockfile)?);
        }
        let fd = self
            .file
            .as_ref()
            .map(|f| f.as_raw_fd())
            .unwrap_or(-1);

        let mut fl = libc::flock {
            l_type: libc::F_WRLCK as i16,
            l_whence: libc::SEEK_SET as i16,
            l_start: 0,
            l_len: 0,
            l_pid: 0,
        };

        // SAFETY: fd is a live descriptor owned by self.file
        let res = unsafe { libc::fcntl(fd, libc::F_GETLK, &mut fl) };
        if res == -1 {
            return Err(io::Error::last_os_error().into());
        }

        if fl.l_type == libc::F_UNLCK as i16 {
            Ok(None)
        } else {
            Ok(Some(fl.l_pid))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    // 7px per char keeps the routing arithmetic easy to eyeball
    fn w(s: &str) -> i32 {
        s.len() as i32 * 7
    }

    #[test]
    fn plain_text_passes_through() {
        let st = StatusText::parse("just some text");

        assert_eq!(st.plain(), "just some text");
        assert_eq!(
            st.segments(),
            &[StatusSegment {
                scheme: 0,
                text: "just some text".to_string()
            }]
        );
        assert!(!st.has_signals());
    }

    #[test]
    fn colour_controls_split_schemes() {
        let st = StatusText::parse("cpu \x0c42% \x0bmem 1G");

        assert_eq!(st.plain(), "cpu 42% mem 1G");
        assert_eq!(
            st.segments(),
            &[
                StatusSegment {
                    scheme: 0,
                    text: "cpu ".to_string()
                },
                StatusSegment {
                    scheme: 1,
                    text: "42% ".to_string()
                },
                StatusSegment {
                    scheme: 0,
                    text: "mem 1G".to_string()
                },
            ]
        );
    }

    #[test]
    fn colour_controls_are_invisible_to_click_routing() {
        let st = StatusText::parse("cpu \x0c42%\x01 mem\x02\x0a");

        assert_eq!(st.signal_at(0, w), Some(1));
        // "cpu 42%" is 49px wide; " mem" follows
        assert_eq!(st.signal_at(50, w), Some(2));
    }

    #[test_case(0, Some(1); "first block")]
    #[test_case(20, Some(1); "still first block")]
    #[test_case(21, Some(2); "second block")]
    #[test_case(48, Some(2); "end of second block")]
    #[test_case(49, None; "unsignalled tail")]
    #[test_case(500, None; "past the end")]
    #[test]
    fn click_routing(x: i32, expected: Option<u8>) {
        // blocks: "cpu" -> signal 1, "mem " -> signal 2, "tail" unsignalled
        let st = StatusText::parse("cpu\x01mem \x02tail\x0a");

        assert_eq!(st.signal_at(x, w), expected);
    }

    #[test]
    fn blocks_after_the_end_delimiter_are_dead() {
        let st = StatusText::parse("live\x01dead\x0amore\x02");

        assert_eq!(st.signal_at(0, w), Some(1));
        // "dead" sits under the end delimiter
        assert_eq!(st.signal_at(30, w), None);
        assert!(st.has_signals());
    }

    #[test]
    fn empty_status_yields_nothing() {
        let st = StatusText::parse("");

        assert_eq!(st.plain(), "");
        assert!(st.segments().is_empty());
        assert_eq!(st.signal_at(0, w), None);
    }
}
