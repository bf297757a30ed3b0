use crate::model::bid::{Bid, Evaluation};
use crate::model::dice::DiceHand;
use crate::model::face::Face;
use crate::model::side::Side;
use rand::Rng;
use thiserror::Error;

/// One round of bidding, from the roll until someone challenges.
#[derive(Debug, Clone)]
pub struct RoundState {
    hands: [DiceHand; 2],
    opener: Side,
    to_act: Side,
    standing: Option<Bid>,
    last_bidder: Option<Side>,
    bids_placed: u32,
}

impl RoundState {
    pub fn roll<R: Rng + ?Sized>(dice_counts: [usize; 2], opener: Side, rng: &mut R) -> Self {
        let hands = [
            DiceHand::roll(dice_counts[Side::Human.index()], rng),
            DiceHand::roll(dice_counts[Side::Computer.index()], rng),
        ];
        Self::from_hands(hands, opener)
    }

    pub fn from_hands(hands: [DiceHand; 2], opener: Side) -> Self {
        Self {
            hands,
            opener,
            to_act: opener,
            standing: None,
            last_bidder: None,
            bids_placed: 0,
        }
    }

    pub fn hand(&self, side: Side) -> &DiceHand {
        &self.hands[side.index()]
    }

    pub fn opener(&self) -> Side {
        self.opener
    }

    pub fn to_act(&self) -> Side {
        self.to_act
    }

    pub fn standing_bid(&self) -> Option<&Bid> {
        self.standing.as_ref()
    }

    pub fn last_bidder(&self) -> Option<Side> {
        self.last_bidder
    }

    pub fn bids_placed(&self) -> u32 {
        self.bids_placed
    }

    pub fn total_dice(&self) -> usize {
        self.hands.iter().map(DiceHand::len).sum()
    }

    pub fn all_dice(&self) -> Vec<Face> {
        self.hands
            .iter()
            .flat_map(|hand| hand.iter().copied())
            .collect()
    }

    pub fn place_bid(&mut self, side: Side, bid: Bid) -> Result<(), RoundError> {
        if side != self.to_act {
            return Err(RoundError::OutOfTurn {
                expected: self.to_act,
                attempted: side,
            });
        }

        if let Some(standing) = self.standing
            && !bid.exceeds(&standing)
        {
            return Err(RoundError::NotARaise { bid, standing });
        }

        self.standing = Some(bid);
        self.last_bidder = Some(side);
        self.to_act = side.opponent();
        self.bids_placed += 1;
        Ok(())
    }

    /// Reveal all dice and decide who loses a die. Leaves the round untouched.
    pub fn settle<F>(&self, challenger: Side, evaluate: F) -> Result<ChallengeOutcome, RoundError>
    where
        F: FnOnce(&[Face], &Bid) -> Evaluation,
    {
        let (Some(bid), Some(bidder)) = (self.standing, self.last_bidder) else {
            return Err(RoundError::NothingToChallenge);
        };

        if challenger == bidder {
            return Err(RoundError::OwnBid { side: challenger });
        }

        let all_dice = self.all_dice();
        let evaluation = evaluate(&all_dice, &bid);
        let loser = if evaluation.bid_held {
            challenger
        } else {
            bidder
        };

        Ok(ChallengeOutcome {
            challenger,
            bidder,
            bid,
            evaluation,
            loser,
            revealed: self.hands.clone(),
        })
    }
}

/// Everything the table learns when a bid is challenged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeOutcome {
    pub challenger: Side,
    pub bidder: Side,
    pub bid: Bid,
    pub evaluation: Evaluation,
    pub loser: Side,
    pub revealed: [DiceHand; 2],
}

impl ChallengeOutcome {
    pub fn challenge_succeeded(&self) -> bool {
        !self.evaluation.bid_held
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error("it is {expected}'s turn, not {attempted}'s")]
    OutOfTurn { expected: Side, attempted: Side },
    #[error("bid {bid} does not exceed the standing bid {standing}")]
    NotARaise { bid: Bid, standing: Bid },
    #[error("there is no standing bid to challenge")]
    NothingToChallenge,
    #[error("{side} cannot challenge their own bid")]
    OwnBid { side: Side },
    #[error("the match is already over")]
    MatchOver,
}

#[cfg(test)]
mod tests {
    use super::{RoundError, RoundState};
    use crate::model::bid::{Bid, Evaluation};
    use crate::model::dice::{DiceHand, count_matching};
    use crate::model::face::Face;
    use crate::model::side::Side;

    fn count_evaluate(dice: &[Face], bid: &Bid) -> Evaluation {
        let actual_count = count_matching(dice, bid.face);
        Evaluation {
            bid_held: actual_count >= bid.quantity,
            actual_count,
        }
    }

    fn fixed_round() -> RoundState {
        RoundState::from_hands(
            [
                DiceHand::from_values(&[1, 1, 4]).unwrap(),
                DiceHand::from_values(&[1, 4, 6]).unwrap(),
            ],
            Side::Human,
        )
    }

    #[test]
    fn bids_alternate_turns() {
        let mut round = fixed_round();
        round.place_bid(Side::Human, Bid::new(2, Face::One)).unwrap();
        assert_eq!(round.to_act(), Side::Computer);
        assert_eq!(round.last_bidder(), Some(Side::Human));
        round
            .place_bid(Side::Computer, Bid::new(2, Face::Four))
            .unwrap();
        assert_eq!(round.to_act(), Side::Human);
        assert_eq!(round.bids_placed(), 2);
    }

    #[test]
    fn out_of_turn_bid_rejected() {
        let mut round = fixed_round();
        let err = round
            .place_bid(Side::Computer, Bid::new(1, Face::One))
            .unwrap_err();
        assert_eq!(
            err,
            RoundError::OutOfTurn {
                expected: Side::Human,
                attempted: Side::Computer
            }
        );
    }

    #[test]
    fn non_raising_bid_rejected() {
        let mut round = fixed_round();
        round.place_bid(Side::Human, Bid::new(2, Face::Four)).unwrap();
        let err = round
            .place_bid(Side::Computer, Bid::new(2, Face::Three))
            .unwrap_err();
        assert!(matches!(err, RoundError::NotARaise { .. }));
        assert_eq!(round.standing_bid(), Some(&Bid::new(2, Face::Four)));
    }

    #[test]
    fn challenge_without_bid_rejected() {
        let round = fixed_round();
        assert_eq!(
            round.settle(Side::Human, count_evaluate).unwrap_err(),
            RoundError::NothingToChallenge
        );
    }

    #[test]
    fn cannot_challenge_own_bid() {
        let mut round = fixed_round();
        round.place_bid(Side::Human, Bid::new(2, Face::One)).unwrap();
        assert_eq!(
            round.settle(Side::Human, count_evaluate).unwrap_err(),
            RoundError::OwnBid { side: Side::Human }
        );
    }

    #[test]
    fn challenger_loses_when_bid_holds() {
        let mut round = fixed_round();
        round.place_bid(Side::Human, Bid::new(3, Face::One)).unwrap();
        let outcome = round.settle(Side::Computer, count_evaluate).unwrap();
        assert!(outcome.evaluation.bid_held);
        assert_eq!(outcome.evaluation.actual_count, 3);
        assert_eq!(outcome.loser, Side::Computer);
        assert!(!outcome.challenge_succeeded());
    }

    #[test]
    fn bidder_loses_when_bid_fails() {
        let mut round = fixed_round();
        round.place_bid(Side::Human, Bid::new(3, Face::Six)).unwrap();
        let outcome = round.settle(Side::Computer, count_evaluate).unwrap();
        assert!(!outcome.evaluation.bid_held);
        assert_eq!(outcome.loser, Side::Human);
        assert!(outcome.challenge_succeeded());
    }

    #[test]
    fn all_dice_spans_both_hands() {
        let round = fixed_round();
        assert_eq!(round.total_dice(), 6);
        assert_eq!(round.all_dice().len(), 6);
    }
}
