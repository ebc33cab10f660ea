//! Word handling: the immutable per-turn game word and its censoring and
//! hint derivations.

pub mod bank;

pub use bank::WordBank;

use rand::seq::SliceRandom;

use crate::protocol::Hint;

const CENSOR_CHAR: char = '*';
const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u'];

/// The current word to guess, lowercased on construction. Hints cover only
/// non-vowel positions, pre-shuffled so reveals come in random order.
#[derive(Debug, Clone, PartialEq)]
pub struct GameWord {
    word: String,
    word_lengths: Vec<usize>,
    hints: Vec<Hint>,
}

impl GameWord {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let word = raw.trim().to_lowercase();
        let tokens: Vec<&str> = word.split_whitespace().collect();
        let word_lengths = tokens.iter().map(|t| t.chars().count()).collect();

        let mut hints = Vec::new();
        for (word_index, token) in tokens.iter().enumerate() {
            for (char_index, character) in token.chars().enumerate() {
                if !VOWELS.contains(&character) {
                    hints.push(Hint {
                        character,
                        word_index,
                        char_index,
                    });
                }
            }
        }
        hints.shuffle(&mut rand::rng());

        Self {
            word,
            word_lengths,
            hints,
        }
    }

    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    #[must_use]
    pub fn word_lengths(&self) -> &[usize] {
        &self.word_lengths
    }

    #[must_use]
    pub fn hints(&self) -> &[Hint] {
        &self.hints
    }

    /// The word rewritten as runs of `*` matching each token length, joined
    /// by spaces.
    #[must_use]
    pub fn censored(&self) -> String {
        self.word_lengths
            .iter()
            .map(|&len| censor(len))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A censor string of the given character length.
#[must_use]
pub fn censor(length: usize) -> String {
    std::iter::repeat(CENSOR_CHAR).take(length).collect()
}
