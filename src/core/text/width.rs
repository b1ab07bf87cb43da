//! Printable-character classification and visible width helpers.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

const TAB_WIDTH: usize = 4;

/// Whether `ch` can be inserted into the edit buffer.
///
/// The editor's cursor math assumes one cell per buffered character, so only characters that
/// occupy exactly one column are accepted.
pub fn is_printable(ch: char) -> bool {
    !ch.is_control() && UnicodeWidthChar::width(ch) == Some(1)
}

pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme.is_empty() {
        return 0;
    }
    if grapheme == "\t" {
        return TAB_WIDTH;
    }
    // The first scalar of a cluster decides its width; combining marks add nothing.
    grapheme
        .chars()
        .next()
        .and_then(UnicodeWidthChar::width)
        .unwrap_or(0)
}

/// Number of columns `input` occupies, ignoring CSI escape sequences.
pub fn visible_width(input: &str) -> usize {
    if input.is_empty() {
        return 0;
    }
    strip_csi(input).graphemes(true).map(grapheme_width).sum()
}

fn strip_csi(input: &str) -> String {
    let mut clean = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for next in chars.by_ref() {
                if ('\x40'..='\x7e').contains(&next) {
                    break;
                }
            }
            continue;
        }
        clean.push(ch);
    }
    clean
}
