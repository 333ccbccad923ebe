//! Deterministic token counting.
//!
//! The chunker needs a reproducible token total for a piece of text, not
//! exact subword boundaries: the same text must always count to the same
//! number within one deployment. [`TokenCounter`] approximates a subword
//! tokenizer with a fixed rule set — alphanumeric runs contribute roughly
//! one token per four characters (never less than one), and every
//! punctuation character counts as its own token.

/// Reproducible approximate token counter.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCounter;

impl TokenCounter {
    pub fn new() -> Self {
        Self
    }

    /// Count tokens in `text`. Pure and deterministic; whitespace itself
    /// contributes nothing.
    pub fn count(&self, text: &str) -> usize {
        let mut total = 0usize;
        let mut run = 0usize;

        for ch in text.chars() {
            if ch.is_alphanumeric() {
                run += 1;
            } else {
                if run > 0 {
                    total += Self::run_tokens(run);
                    run = 0;
                }
                if !ch.is_whitespace() {
                    total += 1;
                }
            }
        }
        if run > 0 {
            total += Self::run_tokens(run);
        }
        total
    }

    /// One token per four characters of an alphanumeric run, rounded up.
    fn run_tokens(len: usize) -> usize {
        (len + 3) / 4
    }
}
