//! Clipboard integration.

use crate::control::Kwargs;
use crate::error::Result;
use arboard::Clipboard;

/// Copy text to clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new()?;
    clipboard.set_text(text)?;
    Ok(())
}

/// Copy the flattened kwargs as pretty JSON, returning what was copied.
///
/// The JSON is accepted back by `show --params`.
pub fn copy_kwargs(kwargs: &Kwargs) -> Result<String> {
    let json = kwargs.to_json()?;
    copy_to_clipboard(&json)?;
    Ok(json)
}
