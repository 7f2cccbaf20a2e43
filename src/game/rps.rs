use rand::Rng;
use serde::{Deserialize, Serialize};

/// Rock-paper-scissors resolution. Stateless: one request, one answer, no
/// session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Rock,
    Paper,
    Scissors,
}

impl Choice {
    pub fn random(rng: &mut impl Rng) -> Self {
        match rng.random_range(0..3) {
            0 => Choice::Rock,
            1 => Choice::Paper,
            _ => Choice::Scissors,
        }
    }

    fn beats(&self, other: Choice) -> bool {
        matches!(
            (self, other),
            (Choice::Rock, Choice::Scissors)
                | (Choice::Paper, Choice::Rock)
                | (Choice::Scissors, Choice::Paper)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpsOutcome {
    Win,
    Loss,
    Tie,
}

/// Outcome from the player's point of view.
pub fn resolve(player: Choice, bot: Choice) -> RpsOutcome {
    if player == bot {
        RpsOutcome::Tie
    } else if player.beats(bot) {
        RpsOutcome::Win
    } else {
        RpsOutcome::Loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_choice_ties() {
        for choice in [Choice::Rock, Choice::Paper, Choice::Scissors] {
            assert_eq!(resolve(choice, choice), RpsOutcome::Tie);
        }
    }

    #[test]
    fn test_winning_pairs() {
        assert_eq!(resolve(Choice::Rock, Choice::Scissors), RpsOutcome::Win);
        assert_eq!(resolve(Choice::Paper, Choice::Rock), RpsOutcome::Win);
        assert_eq!(resolve(Choice::Scissors, Choice::Paper), RpsOutcome::Win);
    }

    #[test]
    fn test_losing_pairs() {
        assert_eq!(resolve(Choice::Scissors, Choice::Rock), RpsOutcome::Loss);
        assert_eq!(resolve(Choice::Rock, Choice::Paper), RpsOutcome::Loss);
        assert_eq!(resolve(Choice::Paper, Choice::Scissors), RpsOutcome::Loss);
    }
}
