/// Prefix of a token that marks an elided list tail, e.g. `+more`.
pub const CONTINUATION_MARKER: char = '+';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerState {
    /// Between tokens, more content to read.
    ScanningGroup,
    /// Reading the next comma-delimited token.
    Accumulating,
    /// A continuation token was seen; nothing after it is yielded.
    StoppedByMarker,
    /// All content consumed.
    Exhausted,
}

/// Splits the inside of one `Label(...)` group into trimmed tokens.
///
/// Every comma-separated piece is yielded, empty ones included. A token
/// starting with [`CONTINUATION_MARKER`] moves the tokenizer to
/// [`TokenizerState::StoppedByMarker`] for good.
#[derive(Debug, Clone)]
pub struct GroupTokenizer<'a> {
    remaining: &'a str,
    state: TokenizerState,
}

impl<'a> GroupTokenizer<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            remaining: content,
            state: TokenizerState::ScanningGroup,
        }
    }

    pub fn state(&self) -> TokenizerState {
        self.state
    }
}

impl<'a> Iterator for GroupTokenizer<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            match self.state {
                TokenizerState::ScanningGroup => self.state = TokenizerState::Accumulating,
                TokenizerState::Accumulating => {
                    let raw = match self.remaining.split_once(',') {
                        Some((token, rest)) => {
                            self.remaining = rest;
                            self.state = TokenizerState::ScanningGroup;
                            token
                        }
                        None => {
                            let token = self.remaining;
                            self.remaining = "";
                            self.state = TokenizerState::Exhausted;
                            token
                        }
                    };

                    let token = raw.trim();
                    if token.starts_with(CONTINUATION_MARKER) {
                        self.state = TokenizerState::StoppedByMarker;
                        return None;
                    }
                    return Some(token);
                }
                TokenizerState::StoppedByMarker | TokenizerState::Exhausted => return None,
            }
        }
    }
}
