use dice_bot::{HeuristicPolicy, Policy, RngSource, TurnOutcome, evaluate, take_turn};
use dice_core::game::match_state::MatchState;
use dice_core::game::round::{ChallengeOutcome, RoundError};
use dice_core::model::bid::Bid;
use dice_core::model::dice::DiceHand;
use dice_core::model::side::Side;
use rand::rngs::StdRng;
use tracing::{Level, event};

/// One human-versus-computer match plus the computer's policy and RNG.
pub struct GameController {
    match_state: MatchState,
    policy: HeuristicPolicy,
    rng: RngSource<StdRng>,
}

impl GameController {
    pub fn new_with_seed(seed: Option<u64>, starting: Side, policy: HeuristicPolicy) -> Self {
        let match_state = match seed {
            Some(seed) => MatchState::with_seed(starting, seed),
            None => MatchState::new(starting),
        };
        // Policy draws derive from the match seed.
        let rng = RngSource::seeded(match_state.seed().rotate_left(32));
        Self {
            match_state,
            policy,
            rng,
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.match_state
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn status_text(&self) -> String {
        let bid = self
            .match_state
            .standing_bid()
            .map(ToString::to_string)
            .unwrap_or_else(|| "none".to_string());
        format!(
            "Round {} • Your dice: {} • Computer dice: {} • Current bid: {}",
            self.match_state.round_number(),
            self.match_state.dice_count(Side::Human),
            self.match_state.dice_count(Side::Computer),
            bid
        )
    }

    pub fn human_hand(&self) -> &DiceHand {
        self.match_state.hand(Side::Human)
    }

    pub fn expected_to_act(&self) -> Side {
        self.match_state.to_act()
    }

    pub fn standing_bid(&self) -> Option<Bid> {
        self.match_state.standing_bid().copied()
    }

    /// Smallest legal raise, offered as a hint.
    pub fn suggested_bid(&self) -> Bid {
        Bid::suggested_raise(self.match_state.standing_bid())
    }

    pub fn is_over(&self) -> bool {
        self.match_state.is_over()
    }

    pub fn winner(&self) -> Option<Side> {
        self.match_state.winner()
    }

    pub fn submit_bid(&mut self, bid: Bid) -> Result<(), RoundError> {
        self.match_state.place_bid(Side::Human, bid)
    }

    pub fn call_liar(&mut self) -> Result<ChallengeOutcome, RoundError> {
        self.match_state.challenge(Side::Human, evaluate)
    }

    /// Let the computer act once. Errors if it is not the computer's turn.
    pub fn computer_turn(&mut self) -> Result<TurnOutcome, RoundError> {
        let expected = self.match_state.to_act();
        if expected != Side::Computer {
            return Err(RoundError::OutOfTurn {
                expected,
                attempted: Side::Computer,
            });
        }

        let outcome = take_turn(&mut self.match_state, &mut self.policy, &mut self.rng)?;
        match &outcome {
            TurnOutcome::Raised(bid) => {
                event!(target: "dice_app::controller", Level::DEBUG, bid = %bid, "computer raised");
            }
            TurnOutcome::Challenged { outcome, forced } => {
                event!(
                    target: "dice_app::controller",
                    Level::DEBUG,
                    bid = %outcome.bid,
                    forced = *forced,
                    "computer challenged"
                );
            }
        }
        Ok(outcome)
    }
}
