//! ANSI escape stripping for text arriving from the game server

use regex::Regex;
use std::borrow::Cow;

lazy_static! {
    // CSI (colours, cursor moves), OSC (window titles) and two-byte escapes
    static ref ANSI_ESCAPE: Regex = Regex::new(
        r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[@-Z\\-_]"
    )
    .unwrap();
}

/// Remove ANSI escape sequences and carriage returns from a line
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    if !text.contains('\x1b') && !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    let stripped = ANSI_ESCAPE.replace_all(text, "");
    if stripped.contains('\r') {
        Cow::Owned(stripped.replace('\r', ""))
    } else {
        stripped
    }
}
