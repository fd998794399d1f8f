use kic_core::domain::SourceDocument;

/// Outcome of classifying one marker during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict<'s> {
    /// First valid reference to `index` (1-based).
    Resolved {
        index: usize,
        source: &'s SourceDocument,
    },
    /// Valid index already consumed earlier in the pass.
    Duplicate { index: usize },
    /// Not pure ASCII digits, or outside `1..=sources.len()`.
    Invalid,
}

/// Indices consumed so far in one pass. Lives for exactly one call.
#[derive(Debug, Clone, Default)]
pub struct ResolutionState {
    consumed: Vec<bool>,
}

impl ResolutionState {
    pub fn new(source_count: usize) -> Self {
        Self {
            consumed: vec![false; source_count],
        }
    }

    pub fn is_consumed(&self, index: usize) -> bool {
        index
            .checked_sub(1)
            .and_then(|i| self.consumed.get(i))
            .copied()
            .unwrap_or(false)
    }

    fn consume(&mut self, index: usize) {
        if let Some(slot) = index.checked_sub(1).and_then(|i| self.consumed.get_mut(i)) {
            *slot = true;
        }
    }
}

/// Strict decimal parse: digits only, no sign, no whitespace. Overflow is `None`.
pub fn parse_index(raw_token: &str) -> Option<usize> {
    if raw_token.is_empty() || !raw_token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw_token.parse::<usize>().ok()
}

pub fn classify<'s>(
    raw_token: &str,
    sources: &'s [SourceDocument],
    state: &mut ResolutionState,
) -> Verdict<'s> {
    let Some(index) = parse_index(raw_token) else {
        return Verdict::Invalid;
    };
    let Some(source) = index.checked_sub(1).and_then(|i| sources.get(i)) else {
        return Verdict::Invalid;
    };
    if state.is_consumed(index) {
        return Verdict::Duplicate { index };
    }
    state.consume(index);
    Verdict::Resolved { index, source }
}
