use std::collections::HashSet;

use crate::game::MoveError;

/// Wrong guesses allowed before the game is lost.
pub const MISS_BUDGET: u32 = 6;

/// Result of an accepted guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// The letter occurs in the word; matching positions are now revealed.
    Hit,
    /// The letter does not occur; the miss counter went up.
    Miss,
    /// The letter was guessed before. Nothing changed, no penalty.
    Repeat,
    /// The last blank was revealed.
    Won,
    /// The miss budget is spent.
    Lost,
}

/// Hangman word state machine. Cooperative: any listed player may guess, the
/// session layer decides who is listed.
#[derive(Debug, Clone)]
pub struct Hangman {
    word: String,
    revealed: Vec<Option<char>>,
    guessed: HashSet<char>,
    misses: u32,
    miss_budget: u32,
}

impl Hangman {
    /// Start a game over `word`. Non-alphabetic characters in the word (the
    /// word list should not contain any) count as pre-revealed, matching the
    /// source material's handling of hyphens and the like.
    pub fn new(word: &str, miss_budget: u32) -> Self {
        let word = word.to_ascii_lowercase();
        let revealed = word
            .chars()
            .map(|c| if c.is_ascii_alphabetic() { None } else { Some(c) })
            .collect();
        Self {
            word,
            revealed,
            guessed: HashSet::new(),
            misses: 0,
            miss_budget,
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn miss_budget(&self) -> u32 {
        self.miss_budget
    }

    /// Letters guessed so far, hits and misses alike, sorted for stable
    /// display.
    pub fn guessed_letters(&self) -> Vec<char> {
        let mut letters: Vec<char> = self.guessed.iter().copied().collect();
        letters.sort_unstable();
        letters
    }

    /// Guess a single letter. Repeat guesses are accepted idempotently:
    /// no reveal, no second penalty. Only non-alphabetic input is an error.
    pub fn guess(&mut self, letter: char) -> Result<GuessOutcome, MoveError> {
        if !letter.is_ascii_alphabetic() {
            return Err(MoveError::InvalidLetter);
        }
        let letter = letter.to_ascii_lowercase();

        if !self.guessed.insert(letter) {
            return Ok(GuessOutcome::Repeat);
        }

        if self.word.contains(letter) {
            for (slot, c) in self.revealed.iter_mut().zip(self.word.chars()) {
                if c == letter {
                    *slot = Some(c);
                }
            }
            if self.revealed.iter().all(|slot| slot.is_some()) {
                return Ok(GuessOutcome::Won);
            }
            Ok(GuessOutcome::Hit)
        } else {
            self.misses += 1;
            if self.misses >= self.miss_budget {
                return Ok(GuessOutcome::Lost);
            }
            Ok(GuessOutcome::Miss)
        }
    }

    /// Current progress with blanks as `_`, e.g. `ca_` for "cat" after
    /// guessing c and a.
    pub fn progress(&self) -> String {
        self.revealed
            .iter()
            .map(|slot| slot.unwrap_or('_'))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guessing_word_in_order() {
        let mut game = Hangman::new("cat", MISS_BUDGET);
        assert_eq!(game.guess('c').unwrap(), GuessOutcome::Hit);
        assert_eq!(game.progress(), "c__");
        assert_eq!(game.guess('a').unwrap(), GuessOutcome::Hit);
        assert_eq!(game.progress(), "ca_");
        assert_eq!(game.guess('t').unwrap(), GuessOutcome::Won);
        assert_eq!(game.progress(), "cat");
        assert_eq!(game.misses(), 0);
    }

    #[test]
    fn test_hit_reveals_all_matching_positions() {
        let mut game = Hangman::new("banana", MISS_BUDGET);
        game.guess('a').unwrap();
        assert_eq!(game.progress(), "_a_a_a");
    }

    #[test]
    fn test_repeat_guess_is_idempotent() {
        let mut game = Hangman::new("cat", MISS_BUDGET);
        game.guess('c').unwrap();
        game.guess('z').unwrap();
        let misses = game.misses();

        // Repeating a hit or a miss changes nothing
        assert_eq!(game.guess('c').unwrap(), GuessOutcome::Repeat);
        assert_eq!(game.guess('z').unwrap(), GuessOutcome::Repeat);
        assert_eq!(game.misses(), misses);
        assert_eq!(game.progress(), "c__");
    }

    #[test]
    fn test_six_distinct_misses_lose() {
        let mut game = Hangman::new("cat", MISS_BUDGET);
        for (i, letter) in ['q', 'w', 'e', 'r', 'u', 'i'].into_iter().enumerate() {
            let outcome = game.guess(letter).unwrap();
            if i < 5 {
                assert_eq!(outcome, GuessOutcome::Miss);
            } else {
                assert_eq!(outcome, GuessOutcome::Lost);
            }
        }
        assert_eq!(game.misses(), MISS_BUDGET);
    }

    #[test]
    fn test_win_with_repeats_in_between() {
        let mut game = Hangman::new("cat", MISS_BUDGET);
        game.guess('c').unwrap();
        game.guess('c').unwrap();
        game.guess('a').unwrap();
        game.guess('a').unwrap();
        assert_eq!(game.guess('t').unwrap(), GuessOutcome::Won);
        assert_eq!(game.misses(), 0);
    }

    #[test]
    fn test_guess_is_case_insensitive() {
        let mut game = Hangman::new("cat", MISS_BUDGET);
        assert_eq!(game.guess('C').unwrap(), GuessOutcome::Hit);
        assert_eq!(game.progress(), "c__");
    }

    #[test]
    fn test_non_alphabetic_guess_rejected() {
        let mut game = Hangman::new("cat", MISS_BUDGET);
        assert_eq!(game.guess('3'), Err(MoveError::InvalidLetter));
        assert_eq!(game.guess('!'), Err(MoveError::InvalidLetter));
        assert_eq!(game.misses(), 0);
    }
}
