//! The embedded word bank the selection phase draws candidates from.

use std::sync::OnceLock;

use rand::seq::IndexedRandom;

static BUILTIN_WORDS: &str = include_str!("../../assets/words.txt");
static BUILTIN_BANK: OnceLock<WordBank> = OnceLock::new();

/// A fixed pool of guessable words. Large relative to the number of turns in
/// a session, so rejection sampling against the word history terminates
/// quickly.
#[derive(Debug)]
pub struct WordBank {
    words: Vec<String>,
}

impl WordBank {
    /// The bank compiled into the binary.
    pub fn builtin() -> &'static Self {
        BUILTIN_BANK.get_or_init(|| Self::from_lines(BUILTIN_WORDS))
    }

    /// Parse a newline-separated word list, skipping blank lines.
    #[must_use]
    pub fn from_lines(raw: &str) -> Self {
        let words = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { words }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// A fresh uniformly random word from the bank.
    #[must_use]
    pub fn random_word(&self) -> &str {
        self.words
            .choose(&mut rand::rng())
            .map_or("", String::as_str)
    }
}
