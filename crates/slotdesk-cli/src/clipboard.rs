//! Clipboard transports for `slotdesk slots copy`.
//!
//! Transports are tried in order:
//! 1. OSC 52 escape sequence, when stdout is a terminal (works over SSH)
//! 2. System clipboard via `arboard`
//!
//! The CLI exits right after copying. On Linux an X11/Wayland selection
//! lives only as long as its owner, so `--wait` keeps the process serving it
//! until another program takes the clipboard over.

use base64::Engine;
use slotdesk_core::clipboard::Clipboard;
use slotdesk_core::{Result, SlotError};
use std::io::{IsTerminal, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transport {
    Osc52,
    System,
}

fn transports(stdout_is_terminal: bool) -> &'static [Transport] {
    if stdout_is_terminal {
        &[Transport::Osc52, Transport::System]
    } else {
        &[Transport::System]
    }
}

/// OSC 52 on a terminal, otherwise the system clipboard.
#[derive(Debug, Default)]
pub struct SystemClipboard {
    wait: bool,
}

impl SystemClipboard {
    pub fn new(wait: bool) -> Self {
        Self { wait }
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        let mut failures = Vec::new();
        for transport in transports(std::io::stdout().is_terminal()) {
            let attempt = match transport {
                Transport::Osc52 => copy_osc52(text).map_err(|e| format!("OSC 52: {e}")),
                Transport::System => copy_system(text, self.wait)
                    .map_err(|e| format!("system clipboard: {e}")),
            };
            match attempt {
                Ok(()) => {
                    tracing::debug!(?transport, "copied to clipboard");
                    return Ok(());
                }
                Err(e) => {
                    tracing::debug!(error = %e, "clipboard transport failed");
                    failures.push(e);
                }
            }
        }
        Err(SlotError::Clipboard(failures.join("; ")))
    }
}

fn copy_osc52(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(osc52_sequence(text).as_bytes())?;
    stdout.flush()
}

fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text);
    format!("\x1b]52;c;{encoded}\x1b\\")
}

fn copy_system(text: &str, wait: bool) -> std::result::Result<(), arboard::Error> {
    let mut clipboard = arboard::Clipboard::new()?;
    set_text(&mut clipboard, text, wait)
}

#[cfg(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
))]
fn set_text(
    clipboard: &mut arboard::Clipboard,
    text: &str,
    wait: bool,
) -> std::result::Result<(), arboard::Error> {
    use arboard::SetExtLinux;
    if wait {
        clipboard.set().wait().text(text)
    } else {
        clipboard.set_text(text)
    }
}

#[cfg(not(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
)))]
fn set_text(
    clipboard: &mut arboard::Clipboard,
    text: &str,
    _wait: bool,
) -> std::result::Result<(), arboard::Error> {
    clipboard.set_text(text)
}

/// Writes the text to stdout instead of a clipboard, for piping.
pub struct PrintClipboard;

impl Clipboard for PrintClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        let mut stdout = std::io::stdout();
        stdout.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            stdout.write_all(b"\n")?;
        }
        stdout.flush()?;
        Ok(())
    }
}
