use crate::evaluator::evaluate;
use crate::policy::{Decision, Policy, PolicyContext};
use crate::random::RandomSource;
use dice_core::game::match_state::MatchState;
use dice_core::game::round::{ChallengeOutcome, RoundError};
use dice_core::model::bid::Bid;
use tracing::{Level, event};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Raised(Bid),
    /// `forced` is set when the policy produced no legal raise and the
    /// driver challenged in its place.
    Challenged {
        outcome: ChallengeOutcome,
        forced: bool,
    },
}

/// Let `policy` act for the side whose turn it is.
///
/// The policy's raise is re-checked against the standing bid. A missing or
/// non-raising proposal turns into a challenge; with no standing bid the
/// driver opens with the minimum bid instead.
pub fn take_turn(
    state: &mut MatchState,
    policy: &mut dyn Policy,
    rng: &mut dyn RandomSource,
) -> Result<TurnOutcome, RoundError> {
    if state.is_over() {
        return Err(RoundError::MatchOver);
    }

    let side = state.to_act();
    let standing = state.standing_bid().copied();
    let decision = {
        let ctx = PolicyContext {
            own_dice: state.hand(side).faces(),
            total_dice: state.total_dice(),
            standing: standing.as_ref(),
        };
        policy.decide(&ctx, rng)
    };

    let proposal = match decision {
        Decision::Challenge => {
            let outcome = state.challenge(side, evaluate)?;
            return Ok(TurnOutcome::Challenged {
                outcome,
                forced: false,
            });
        }
        Decision::Raise(bid) => Some(bid),
        Decision::NoViableBid => None,
    };

    if let Some(bid) = proposal.filter(|bid| Bid::is_valid_raise(bid, standing.as_ref())) {
        state.place_bid(side, bid)?;
        return Ok(TurnOutcome::Raised(bid));
    }

    match standing {
        None => {
            let bid = Bid::suggested_raise(None);
            event!(
                target: "dice_bot::driver",
                Level::WARN,
                policy = policy.name(),
                side = %side,
                fallback = %bid,
                "policy produced no opening bid"
            );
            state.place_bid(side, bid)?;
            Ok(TurnOutcome::Raised(bid))
        }
        Some(current) => {
            event!(
                target: "dice_bot::driver",
                Level::WARN,
                policy = policy.name(),
                side = %side,
                standing = %current,
                proposal = ?proposal.map(|bid| bid.to_string()),
                "no legal raise, forcing a challenge"
            );
            let outcome = state.challenge(side, evaluate)?;
            Ok(TurnOutcome::Challenged {
                outcome,
                forced: true,
            })
        }
    }
}
