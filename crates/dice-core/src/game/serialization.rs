use super::match_state::{MAX_STARTING_DICE, MatchConfig, MatchState};
use crate::model::side::Side;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A snapshot whose fields could not have come from a real match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("starting_dice must be between 1 and {MAX_STARTING_DICE}, got {0}")]
    StartingDice(usize),
    #[error("{side} holds {count} dice but the match started with {starting_dice}")]
    DiceAboveStart {
        side: Side,
        count: usize,
        starting_dice: usize,
    },
    #[error("both sides are out of dice")]
    NoDiceLeft,
}

/// Between-rounds checkpoint. Bids of the round in progress are not kept;
/// restoring re-rolls the same dice and reopens the round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchSnapshot {
    pub seed: u64,
    pub round_number: u32,
    pub dice_counts: [usize; 2],
    pub opener: Side,
    #[serde(default = "default_starting_dice")]
    pub starting_dice: usize,
    #[serde(default = "default_starting_side")]
    pub starting_side: Side,
}

impl MatchSnapshot {
    pub fn capture(state: &MatchState) -> Self {
        let config = state.config();
        MatchSnapshot {
            seed: state.seed(),
            round_number: state.round_number(),
            dice_counts: state.dice_counts(),
            opener: state.round().opener(),
            starting_dice: config.starting_dice,
            starting_side: config.starting_side,
        }
    }

    /// Rebuild the match. Die counts can only have gone down since the start,
    /// so a snapshot claiming more than `starting_dice` is rejected.
    pub fn restore(self) -> Result<MatchState, SnapshotError> {
        self.check()?;
        let config = MatchConfig {
            starting_dice: self.starting_dice,
            starting_side: self.starting_side,
        };
        Ok(MatchState::resume(
            config,
            self.seed,
            self.round_number,
            self.dice_counts,
            self.opener,
        ))
    }

    fn check(&self) -> Result<(), SnapshotError> {
        if !(1..=MAX_STARTING_DICE).contains(&self.starting_dice) {
            return Err(SnapshotError::StartingDice(self.starting_dice));
        }
        for side in Side::LOOP {
            let count = self.dice_counts[side.index()];
            if count > self.starting_dice {
                return Err(SnapshotError::DiceAboveStart {
                    side,
                    count,
                    starting_dice: self.starting_dice,
                });
            }
        }
        if self.dice_counts == [0, 0] {
            return Err(SnapshotError::NoDiceLeft);
        }
        Ok(())
    }

    pub fn to_json(state: &MatchState) -> serde_json::Result<String> {
        let snapshot = Self::capture(state);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn default_starting_dice() -> usize {
    MatchConfig::default().starting_dice
}

fn default_starting_side() -> Side {
    MatchConfig::default().starting_side
}

#[cfg(test)]
mod tests {
    use super::{MatchSnapshot, SnapshotError};
    use crate::game::match_state::MatchState;
    use crate::model::bid::{Bid, Evaluation};
    use crate::model::face::Face;
    use crate::model::side::Side;

    fn always_fails(_: &[Face], _: &Bid) -> Evaluation {
        Evaluation {
            bid_held: false,
            actual_count: 0,
        }
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let state = MatchState::with_seed(Side::Human, 99);
        let json = MatchSnapshot::to_json(&state).unwrap();
        assert!(json.contains("\"seed\": 99"));
        assert!(json.contains("\"round_number\": 1"));
        assert!(json.contains("\"opener\": \"Human\""));
    }

    #[test]
    fn snapshot_roundtrip_restores_dice_and_counts() {
        let mut state = MatchState::with_seed(Side::Human, 123);
        state.place_bid(Side::Human, Bid::new(2, Face::Three)).unwrap();
        state.challenge(Side::Computer, always_fails).unwrap();

        let restored = MatchSnapshot::capture(&state).restore().unwrap();
        assert_eq!(restored.seed(), 123);
        assert_eq!(restored.round_number(), 2);
        assert_eq!(restored.dice_counts(), state.dice_counts());
        assert_eq!(restored.to_act(), Side::Human);
        assert_eq!(restored.hand(Side::Human), state.hand(Side::Human));
        assert_eq!(restored.hand(Side::Computer), state.hand(Side::Computer));
    }

    #[test]
    fn snapshot_from_json_fills_config_defaults() {
        let legacy = r#"{
            "seed": 7,
            "round_number": 3,
            "dice_counts": [4, 2],
            "opener": "Computer"
        }"#;

        let snapshot = MatchSnapshot::from_json(legacy).unwrap();
        assert_eq!(snapshot.starting_dice, 5);
        assert_eq!(snapshot.starting_side, Side::Human);

        let state = snapshot.restore().unwrap();
        assert_eq!(state.dice_count(Side::Computer), 2);
        assert_eq!(state.hand(Side::Human).len(), 4);
        assert_eq!(state.to_act(), Side::Computer);
    }

    #[test]
    fn snapshot_of_finished_match_restores_winner() {
        let snapshot = MatchSnapshot {
            seed: 1,
            round_number: 9,
            dice_counts: [0, 3],
            opener: Side::Human,
            starting_dice: 5,
            starting_side: Side::Human,
        };
        let state = snapshot.restore().unwrap();
        assert!(state.is_over());
        assert_eq!(state.winner(), Some(Side::Computer));
    }

    fn snapshot(dice_counts: [usize; 2], starting_dice: usize) -> MatchSnapshot {
        MatchSnapshot {
            seed: 5,
            round_number: 2,
            dice_counts,
            opener: Side::Computer,
            starting_dice,
            starting_side: Side::Human,
        }
    }

    #[test]
    fn restore_rejects_more_dice_than_the_start() {
        let err = snapshot([9, 7], 5).restore().unwrap_err();
        assert_eq!(
            err,
            SnapshotError::DiceAboveStart {
                side: Side::Human,
                count: 9,
                starting_dice: 5
            }
        );
    }

    #[test]
    fn restore_rejects_absurd_counts_without_allocating() {
        let err = snapshot([usize::MAX, 1], 5).restore().unwrap_err();
        assert!(matches!(err, SnapshotError::DiceAboveStart { count: usize::MAX, .. }));

        let err = snapshot([usize::MAX, 1], usize::MAX).restore().unwrap_err();
        assert_eq!(err, SnapshotError::StartingDice(usize::MAX));
    }

    #[test]
    fn restore_rejects_zero_starting_dice() {
        assert_eq!(
            snapshot([0, 0], 0).restore().unwrap_err(),
            SnapshotError::StartingDice(0)
        );
    }

    #[test]
    fn restore_rejects_two_empty_cups() {
        assert_eq!(
            snapshot([0, 0], 5).restore().unwrap_err(),
            SnapshotError::NoDiceLeft
        );
    }

    #[test]
    fn oversized_json_snapshot_is_an_error() {
        let json = r#"{
            "seed": 1,
            "round_number": 1,
            "dice_counts": [18446744073709551615, 1],
            "opener": "Human"
        }"#;
        let snapshot = MatchSnapshot::from_json(json).unwrap();
        assert!(snapshot.restore().is_err());
    }
}
