use std::path::Path;

use anyhow::Result;
use rand::Rng;
use tokio::fs;

/// Fallback list used when no word file is configured or readable.
const BUILTIN_WORDS: &[&str] = &[
    "python", "discord", "hangman", "bot", "cog", "extension", "asyncio", "database",
];

/// Pool of hangman target words.
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    /// Load the word list from a file, one word per line. Lines with
    /// non-alphabetic characters are dropped so every target word is fully
    /// guessable.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let words: Vec<String> = content
            .lines()
            .map(|line| line.trim().to_ascii_lowercase())
            .filter(|word| word.len() >= 2 && word.chars().all(|c| c.is_ascii_alphabetic()))
            .collect();

        if words.is_empty() {
            anyhow::bail!("word list contains no usable words");
        }
        tracing::info!("Loaded {} hangman words", words.len());

        Ok(Self { words })
    }

    /// The built-in eight-word list.
    pub fn builtin() -> Self {
        Self {
            words: BUILTIN_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Draw a target word uniformly at random.
    pub fn pick(&self, rng: &mut impl Rng) -> &str {
        &self.words[rng.random_range(0..self.words.len())]
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_list_is_usable() {
        let words = WordList::builtin();
        assert!(!words.is_empty());
        assert!(words
            .words
            .iter()
            .all(|w| w.chars().all(|c| c.is_ascii_lowercase())));
    }

    #[test]
    fn test_pick_returns_listed_word() {
        let words = WordList::builtin();
        let mut rng = rand::rng();
        for _ in 0..20 {
            let word = words.pick(&mut rng);
            assert!(BUILTIN_WORDS.contains(&word));
        }
    }
}
