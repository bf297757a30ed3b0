use crate::game::round::{ChallengeOutcome, RoundError, RoundState};
use crate::model::bid::{Bid, Evaluation};
use crate::model::dice::DiceHand;
use crate::model::face::Face;
use crate::model::side::Side;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{Level, event};

pub const STARTING_DICE: usize = 5;
/// Largest cup a match can be configured with.
pub const MAX_STARTING_DICE: usize = 1_000;

const ROUND_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub starting_dice: usize,
    pub starting_side: Side,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            starting_dice: STARTING_DICE,
            starting_side: Side::Human,
        }
    }
}

/// A full game: rounds are played until one side has no dice left.
///
/// Each round's dice are drawn from an RNG derived from the match seed and
/// the round number, so any round can be rebuilt from a snapshot.
#[derive(Debug, Clone)]
pub struct MatchState {
    config: MatchConfig,
    seed: u64,
    round_number: u32,
    dice_counts: [usize; 2],
    current_round: RoundState,
    winner: Option<Side>,
}

impl MatchState {
    pub fn new(starting_side: Side) -> Self {
        let seed: u64 = rand::random();
        Self::with_seed(starting_side, seed)
    }

    pub fn with_seed(starting_side: Side, seed: u64) -> Self {
        Self::with_config(
            MatchConfig {
                starting_side,
                ..MatchConfig::default()
            },
            seed,
        )
    }

    pub fn with_config(config: MatchConfig, seed: u64) -> Self {
        assert!(
            (1..=MAX_STARTING_DICE).contains(&config.starting_dice),
            "a match needs between 1 and {MAX_STARTING_DICE} starting dice per side, got {}",
            config.starting_dice
        );
        let dice_counts = [config.starting_dice; 2];
        Self::resume(config, seed, 1, dice_counts, config.starting_side)
    }

    pub(crate) fn resume(
        config: MatchConfig,
        seed: u64,
        round_number: u32,
        dice_counts: [usize; 2],
        opener: Side,
    ) -> Self {
        let round_number = round_number.max(1);
        let winner = Side::LOOP
            .iter()
            .copied()
            .find(|side| dice_counts[side.index()] == 0)
            .map(Side::opponent);
        let current_round = Self::roll_round(seed, round_number, dice_counts, opener);
        Self {
            config,
            seed,
            round_number,
            dice_counts,
            current_round,
            winner,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> MatchConfig {
        self.config
    }

    pub fn round(&self) -> &RoundState {
        &self.current_round
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn dice_count(&self, side: Side) -> usize {
        self.dice_counts[side.index()]
    }

    pub fn dice_counts(&self) -> [usize; 2] {
        self.dice_counts
    }

    pub fn total_dice(&self) -> usize {
        self.dice_counts.iter().sum()
    }

    pub fn hand(&self, side: Side) -> &DiceHand {
        self.current_round.hand(side)
    }

    pub fn to_act(&self) -> Side {
        self.current_round.to_act()
    }

    pub fn standing_bid(&self) -> Option<&Bid> {
        self.current_round.standing_bid()
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn place_bid(&mut self, side: Side, bid: Bid) -> Result<(), RoundError> {
        if self.is_over() {
            return Err(RoundError::MatchOver);
        }
        self.current_round.place_bid(side, bid)
    }

    /// Settle the standing bid, take a die from the loser and either start
    /// the next round (opened by the loser) or finish the match.
    pub fn challenge<F>(&mut self, side: Side, evaluate: F) -> Result<ChallengeOutcome, RoundError>
    where
        F: FnOnce(&[Face], &Bid) -> Evaluation,
    {
        if self.is_over() {
            return Err(RoundError::MatchOver);
        }

        let outcome = self.current_round.settle(side, evaluate)?;
        let loser = outcome.loser;
        self.dice_counts[loser.index()] -= 1;

        event!(
            target: "dice_core::round",
            Level::INFO,
            round = self.round_number,
            challenger = %outcome.challenger,
            bid = %outcome.bid,
            actual_count = outcome.evaluation.actual_count,
            bid_held = outcome.evaluation.bid_held,
            loser = %loser,
            human_dice = self.dice_counts[Side::Human.index()],
            computer_dice = self.dice_counts[Side::Computer.index()],
        );

        if self.dice_counts[loser.index()] == 0 {
            self.winner = Some(loser.opponent());
        } else {
            self.round_number += 1;
            self.current_round =
                Self::roll_round(self.seed, self.round_number, self.dice_counts, loser);
        }

        Ok(outcome)
    }

    fn roll_round(seed: u64, round_number: u32, dice_counts: [usize; 2], opener: Side) -> RoundState {
        let round_seed = seed.wrapping_add(u64::from(round_number).wrapping_mul(ROUND_SEED_STRIDE));
        let mut rng = StdRng::seed_from_u64(round_seed);
        RoundState::roll(dice_counts, opener, &mut rng)
    }
}
