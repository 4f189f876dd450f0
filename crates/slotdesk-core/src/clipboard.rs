use crate::error::Result;

/// Write-only access to a clipboard.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

impl<T: Clipboard + ?Sized> Clipboard for &mut T {
    fn write_text(&mut self, text: &str) -> Result<()> {
        (**self).write_text(text)
    }
}

/// Holds the last copied text so a caller can hand it to the real clipboard
/// later, e.g. a rendered page that copies on load.
#[derive(Debug, Default, Clone)]
pub struct CapturedClipboard {
    last: Option<String>,
}

impl CapturedClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

impl Clipboard for CapturedClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.last = Some(text.to_string());
        Ok(())
    }
}
