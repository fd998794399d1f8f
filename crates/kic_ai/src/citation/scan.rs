use std::ops::Range;

const OPEN: &[u8] = b"[doc";

/// One `[doc<token>]` occurrence. Offsets are byte offsets into the scanned text and cover the
/// brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker<'a> {
    pub start: usize,
    pub end: usize,
    /// Everything between `doc` and the closing bracket; never empty, never contains a bracket.
    pub raw_token: &'a str,
}

impl<'a> Marker<'a> {
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Lazy left-to-right scan for `[doc...]` spans.
///
/// Matches `[`, literal `doc`, one or more characters other than `[` or `]`, then `]`. Nothing is
/// validated here.
#[derive(Debug, Clone)]
pub struct MarkerScanner<'a> {
    text: &'a str,
    pos: usize,
}

pub fn scan_markers(text: &str) -> MarkerScanner<'_> {
    MarkerScanner { text, pos: 0 }
}

impl<'a> Iterator for MarkerScanner<'a> {
    type Item = Marker<'a>;

    fn next(&mut self) -> Option<Marker<'a>> {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() {
            let Some(off) = bytes[self.pos..].iter().position(|&b| b == b'[') else {
                self.pos = bytes.len();
                return None;
            };
            let start = self.pos + off;
            if !bytes[start..].starts_with(OPEN) {
                self.pos = start + 1;
                continue;
            }

            let token_start = start + OPEN.len();
            let Some(len) = bytes[token_start..]
                .iter()
                .position(|&b| b == b'[' || b == b']')
            else {
                // No bracket left anywhere, so no marker can follow.
                self.pos = bytes.len();
                return None;
            };
            let stop = token_start + len;
            if bytes[stop] == b']' && len > 0 {
                self.pos = stop + 1;
                return Some(Marker {
                    start,
                    end: stop + 1,
                    raw_token: &self.text[token_start..stop],
                });
            }
            // `[doc]` or a nested `[`: resume at the bracket that broke the match.
            self.pos = stop;
        }
        None
    }
}
