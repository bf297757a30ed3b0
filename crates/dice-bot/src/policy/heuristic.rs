use super::{BotDifficulty, Decision, Policy, PolicyContext, PolicyParams, RaiseFilter};
use crate::confidence::confidence;
use crate::probability::bid_probability;
use crate::random::RandomSource;
use dice_core::model::bid::Bid;
use dice_core::model::dice::{FaceCounts, count_matching};
use dice_core::model::face::Face;
use tracing::{Level, event};

/// Heuristic computer opponent. `Normal` is the full bluff-and-score policy;
/// `Easy` challenges on plain odds and otherwise makes the minimum raise.
#[derive(Debug, Clone)]
pub struct HeuristicPolicy {
    difficulty: BotDifficulty,
    filter: RaiseFilter,
    params: PolicyParams,
}

impl HeuristicPolicy {
    pub fn new(difficulty: BotDifficulty) -> Self {
        Self {
            difficulty,
            filter: RaiseFilter::default(),
            params: PolicyParams::default(),
        }
    }

    pub fn easy() -> Self {
        Self::new(BotDifficulty::Easy)
    }

    pub fn normal() -> Self {
        Self::new(BotDifficulty::Normal)
    }

    pub fn with_filter(mut self, filter: RaiseFilter) -> Self {
        self.filter = filter;
        self
    }
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self::normal()
    }
}

impl Policy for HeuristicPolicy {
    fn decide(&mut self, ctx: &PolicyContext<'_>, rng: &mut dyn RandomSource) -> Decision {
        match self.difficulty {
            BotDifficulty::Normal => decide_with(ctx, &self.params, self.filter, rng),
            BotDifficulty::Easy => decide_easy(ctx, &self.params),
        }
    }

    fn name(&self) -> &'static str {
        match self.difficulty {
            BotDifficulty::Easy => "heuristic_easy",
            BotDifficulty::Normal => "heuristic_normal",
        }
    }
}

/// Challenge or raise with default weights and no raise filtering.
pub fn decide(
    own_dice: &[Face],
    total_dice_in_play: usize,
    current_bid: Option<&Bid>,
    rng: &mut dyn RandomSource,
) -> Decision {
    let ctx = PolicyContext {
        own_dice,
        total_dice: total_dice_in_play,
        standing: current_bid,
    };
    decide_with(&ctx, &PolicyParams::default(), RaiseFilter::Permissive, rng)
}

/// Full heuristic decision.
///
/// Random draws happen in a fixed order: the challenge draw, the same-face
/// raise gate, the wild gate, then the wild face (only when its gate passes).
pub fn decide_with(
    ctx: &PolicyContext<'_>,
    params: &PolicyParams,
    filter: RaiseFilter,
    rng: &mut dyn RandomSource,
) -> Decision {
    check_contract(ctx);

    let Some(standing) = ctx.standing else {
        let bid = opening_bid(ctx.own_dice, ctx.total_dice);
        log_opening(ctx, bid);
        return Decision::Raise(bid);
    };

    let assessment = Assessment::of(ctx, standing.quantity, standing.face, params);
    let threshold = params.bluff_threshold(assessment.confidence);
    let draw = rng.next_f64();
    if assessment.probability < threshold && draw < params.challenge_gate {
        log_contested(ctx, standing, &assessment, threshold, &Decision::Challenge, 0);
        return Decision::Challenge;
    }

    let mut candidates = candidate_bids(ctx.own_dice, standing, params, rng);
    if filter == RaiseFilter::StrictRaise {
        candidates.retain(|candidate| candidate.exceeds(standing));
    }

    let decision = match best_candidate(ctx, &candidates, params) {
        Some(bid) => Decision::Raise(bid),
        None => Decision::NoViableBid,
    };
    log_contested(
        ctx,
        standing,
        &assessment,
        threshold,
        &decision,
        candidates.len(),
    );
    decision
}

fn decide_easy(ctx: &PolicyContext<'_>, params: &PolicyParams) -> Decision {
    check_contract(ctx);

    let Some(standing) = ctx.standing else {
        let bid = opening_bid(ctx.own_dice, ctx.total_dice);
        log_opening(ctx, bid);
        return Decision::Raise(bid);
    };

    let assessment = Assessment::of(ctx, standing.quantity, standing.face, params);
    let decision = if assessment.probability < params.easy_challenge_below {
        Decision::Challenge
    } else {
        Decision::Raise(Bid::suggested_raise(Some(standing)))
    };
    log_contested(
        ctx,
        standing,
        &assessment,
        params.easy_challenge_below,
        &decision,
        1,
    );
    decision
}

fn check_contract(ctx: &PolicyContext<'_>) {
    assert!(!ctx.own_dice.is_empty(), "policy invoked with no own dice");
    assert!(
        ctx.total_dice >= ctx.own_dice.len(),
        "total dice in play ({}) is smaller than own dice ({})",
        ctx.total_dice,
        ctx.own_dice.len()
    );
    if let Some(standing) = ctx.standing {
        assert!(standing.quantity >= 1, "standing bid has zero quantity");
    }
}

/// Most common own face (lowest on ties), scaled up when we hold a large
/// share of the table.
fn opening_bid(own_dice: &[Face], total_dice: usize) -> Bid {
    let (face, max_count) = FaceCounts::from_faces(own_dice)
        .most_common()
        .unwrap_or((Face::One, 0));
    let share = own_dice.len() as f64 / total_dice as f64;
    let multiplier = (share * 2.0).floor() as u32 + 1;
    Bid::new((max_count * multiplier).max(1), face)
}

#[derive(Debug, Clone, Copy)]
struct Assessment {
    own_matching: u32,
    probability: f64,
    confidence: f64,
}

impl Assessment {
    fn of(ctx: &PolicyContext<'_>, quantity: u32, face: Face, params: &PolicyParams) -> Self {
        let own_matching = count_matching(ctx.own_dice, face);
        let unknown = ctx.total_dice - ctx.own_dice.len();
        let remaining = i64::from(quantity) - i64::from(own_matching);
        Self {
            own_matching,
            probability: bid_probability(remaining, unknown),
            confidence: confidence(ctx.own_dice, quantity, face, params),
        }
    }
}

fn candidate_bids(
    own_dice: &[Face],
    standing: &Bid,
    params: &PolicyParams,
    rng: &mut dyn RandomSource,
) -> Vec<Bid> {
    let mut candidates = Vec::with_capacity(Face::COUNT + 2);

    if rng.next_f64() < params.raise_gate {
        candidates.push(Bid::new(standing.quantity + 1, standing.face));
    }

    for (face, count) in FaceCounts::from_faces(own_dice).present() {
        if face != standing.face {
            candidates.push(Bid::new(standing.quantity.max(count + 1), face));
        }
    }

    if rng.next_f64() < params.wild_gate {
        let slot = ((rng.next_f64() * Face::COUNT as f64).floor() as usize).min(Face::COUNT - 1);
        let quantity = (f64::from(standing.quantity) * params.wild_multiplier).floor() as u32;
        candidates.push(Bid::new(quantity.max(1), Face::ALL[slot]));
    }

    candidates
}

/// Running best-so-far over candidates in generation order, seeded at zero;
/// only a strictly higher score replaces the incumbent.
fn best_candidate(ctx: &PolicyContext<'_>, candidates: &[Bid], params: &PolicyParams) -> Option<Bid> {
    let mut best = None;
    let mut best_score = 0.0;
    for candidate in candidates {
        let assessment = Assessment::of(ctx, candidate.quantity, candidate.face, params);
        let score = params.score(assessment.probability, assessment.confidence);
        if score > best_score {
            best_score = score;
            best = Some(*candidate);
        }
    }
    best
}

fn log_opening(ctx: &PolicyContext<'_>, bid: Bid) {
    if !tracing::enabled!(target: "dice_bot::decision", Level::DEBUG) {
        return;
    }
    event!(
        target: "dice_bot::decision",
        Level::DEBUG,
        state = "open",
        own_dice = ctx.own_dice.len() as u32,
        total_dice = ctx.total_dice as u32,
        bid = %bid
    );
}

fn log_contested(
    ctx: &PolicyContext<'_>,
    standing: &Bid,
    assessment: &Assessment,
    threshold: f64,
    decision: &Decision,
    candidates: usize,
) {
    if !tracing::enabled!(target: "dice_bot::decision", Level::DEBUG) {
        return;
    }
    let chosen = match decision {
        Decision::Challenge => "challenge".to_string(),
        Decision::Raise(bid) => bid.to_string(),
        Decision::NoViableBid => "none".to_string(),
    };
    event!(
        target: "dice_bot::decision",
        Level::DEBUG,
        state = "contested",
        own_dice = ctx.own_dice.len() as u32,
        total_dice = ctx.total_dice as u32,
        standing = %standing,
        own_matching = assessment.own_matching,
        probability = assessment.probability,
        confidence = assessment.confidence,
        threshold,
        challenged = decision.is_challenge(),
        candidates = candidates as u32,
        chosen = %chosen
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{RngSource, ScriptedRandom};
    use dice_core::model::dice::DiceHand;
    use rand::SeedableRng;

    fn dice(values: &[u8]) -> Vec<Face> {
        DiceHand::from_values(values).unwrap().faces().to_vec()
    }

    #[test]
    fn opening_scales_with_table_share() {
        let own = dice(&[5, 5, 5, 1, 2]);
        let mut rng = ScriptedRandom::constant(0.5);
        let decision = decide(&own, 10, None, &mut rng);
        assert_eq!(decision, Decision::Raise(Bid::new(6, Face::Five)));
        assert_eq!(rng.draws(), 0, "opening bids never draw");
    }

    #[test]
    fn opening_alone_at_table_triples() {
        let own = dice(&[3, 3, 1]);
        let decision = decide(&own, 3, None, &mut ScriptedRandom::constant(0.5));
        assert_eq!(decision, Decision::Raise(Bid::new(6, Face::Three)));
    }

    #[test]
    fn opening_tie_goes_to_lowest_face() {
        let own = dice(&[6, 2, 6, 2]);
        let decision = decide(&own, 8, None, &mut ScriptedRandom::constant(0.5));
        assert_eq!(decision, Decision::Raise(Bid::new(4, Face::Two)));
    }

    #[test]
    fn opening_with_small_share_uses_multiplier_one() {
        let own = dice(&[4]);
        let decision = decide(&own, 9, None, &mut ScriptedRandom::constant(0.5));
        assert_eq!(decision, Decision::Raise(Bid::new(1, Face::Four)));
    }

    #[test]
    fn impossible_bid_is_challenged_when_gate_allows() {
        let own = dice(&[1, 2, 3, 4, 5]);
        let standing = Bid::new(6, Face::Six);
        let mut rng = ScriptedRandom::constant(0.5);
        assert_eq!(
            decide(&own, 10, Some(&standing), &mut rng),
            Decision::Challenge
        );
        assert_eq!(rng.draws(), 1);
    }

    #[test]
    fn challenge_gate_can_let_a_bad_bid_through() {
        // Draws: challenge 0.9 (blocked), raise gate miss, wild gate miss.
        let own = dice(&[1, 2, 3, 4, 5]);
        let standing = Bid::new(6, Face::Six);
        let mut rng = ScriptedRandom::new(vec![0.9, 0.95, 0.95]);
        let decision = decide(&own, 10, Some(&standing), &mut rng);
        assert!(!decision.is_challenge());
        assert_eq!(rng.draws(), 3);
    }

    #[test]
    fn permissive_mode_can_emit_a_non_raising_bid() {
        // Only face-change candidates survive the gates, all tied at 6 × f;
        // the first generated (6 × 1) wins even though it is below 6 × 6.
        let own = dice(&[1, 2, 3, 4, 5]);
        let standing = Bid::new(6, Face::Six);
        let mut rng = ScriptedRandom::new(vec![0.9, 0.95, 0.95]);
        let decision = decide(&own, 10, Some(&standing), &mut rng);
        let bid = decision.bid().expect("a raise");
        assert_eq!(bid, Bid::new(6, Face::One));
        assert!(!bid.exceeds(&standing));
    }

    #[test]
    fn strict_mode_filters_non_raising_candidates() {
        let own = dice(&[1, 2, 3, 4, 5]);
        let standing = Bid::new(6, Face::Six);
        let ctx = PolicyContext {
            own_dice: &own,
            total_dice: 10,
            standing: Some(&standing),
        };
        let mut rng = ScriptedRandom::new(vec![0.9, 0.95, 0.95]);
        let decision = decide_with(
            &ctx,
            &PolicyParams::default(),
            RaiseFilter::StrictRaise,
            &mut rng,
        );
        assert_eq!(decision, Decision::NoViableBid);
    }

    #[test]
    fn empty_pool_yields_sentinel() {
        // Every own die already shows the bid face, so only the gated
        // proposals could fill the pool and both gates miss.
        let own = dice(&[4, 4]);
        let standing = Bid::new(1, Face::Four);
        let mut rng = ScriptedRandom::new(vec![0.1, 0.99, 0.99]);
        assert_eq!(
            decide(&own, 4, Some(&standing), &mut rng),
            Decision::NoViableBid
        );
        assert_eq!(rng.draws(), 3);
    }

    #[test]
    fn supported_raise_beats_weaker_face_change() {
        let own = dice(&[4, 4, 1]);
        let standing = Bid::new(2, Face::Four);
        let mut rng = ScriptedRandom::new(vec![0.5, 0.1, 0.99]);
        assert_eq!(
            decide(&own, 6, Some(&standing), &mut rng),
            Decision::Raise(Bid::new(3, Face::Four))
        );
    }

    #[test]
    fn wild_proposal_draws_its_face_last() {
        // Draws: challenge blocked, raise gate hit, wild gate hit, wild face 0.99 → six.
        let own = dice(&[2, 2, 2, 2, 2]);
        let standing = Bid::new(5, Face::Three);
        let mut rng = ScriptedRandom::new(vec![0.85, 0.1, 0.1, 0.99]);
        let decision = decide(&own, 10, Some(&standing), &mut rng);
        assert_eq!(decision, Decision::Raise(Bid::new(6, Face::Two)));
        assert_eq!(rng.draws(), 4);
    }

    #[test]
    fn never_challenges_without_a_standing_bid() {
        let mut table = RngSource::seeded(21);
        let mut policy_rng = RngSource::seeded(22);
        let mut roller = rand::rngs::StdRng::seed_from_u64(23);
        for own_len in 1..=5 {
            for _ in 0..50 {
                let own = DiceHand::roll(own_len, &mut roller);
                let total = own_len + (table.next_f64() * 6.0) as usize;
                let decision = decide(own.faces(), total, None, &mut policy_rng);
                assert!(matches!(decision, Decision::Raise(_)));
            }
        }
    }

    #[test]
    fn strict_mode_only_ever_raises() {
        let params = PolicyParams::default();
        let mut policy_rng = RngSource::seeded(7);
        let mut roller = rand::rngs::StdRng::seed_from_u64(8);
        for _ in 0..400 {
            let own = DiceHand::roll(5, &mut roller);
            let standing = Bid::new(
                1 + (policy_rng.next_f64() * 8.0) as u32,
                Face::roll(&mut roller),
            );
            let ctx = PolicyContext {
                own_dice: own.faces(),
                total_dice: 10,
                standing: Some(&standing),
            };
            if let Decision::Raise(bid) =
                decide_with(&ctx, &params, RaiseFilter::StrictRaise, &mut policy_rng)
            {
                assert!(bid.exceeds(&standing), "{bid} does not beat {standing}");
            }
        }
    }

    #[test]
    fn easy_challenges_on_plain_odds() {
        let own = dice(&[1, 2, 3, 4, 5]);
        let standing = Bid::new(6, Face::Six);
        let ctx = PolicyContext {
            own_dice: &own,
            total_dice: 10,
            standing: Some(&standing),
        };
        let mut rng = ScriptedRandom::constant(0.99);
        let mut policy = HeuristicPolicy::easy();
        assert_eq!(policy.decide(&ctx, &mut rng), Decision::Challenge);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn easy_makes_minimum_raise_when_covered() {
        let own = dice(&[3, 3, 5]);
        let standing = Bid::new(2, Face::Three);
        let ctx = PolicyContext {
            own_dice: &own,
            total_dice: 6,
            standing: Some(&standing),
        };
        let mut policy = HeuristicPolicy::easy();
        assert_eq!(
            policy.decide(&ctx, &mut ScriptedRandom::constant(0.5)),
            Decision::Raise(Bid::new(2, Face::Four))
        );
    }

    #[test]
    fn policy_trait_uses_configured_filter() {
        let own = dice(&[1, 2, 3, 4, 5]);
        let standing = Bid::new(6, Face::Six);
        let ctx = PolicyContext {
            own_dice: &own,
            total_dice: 10,
            standing: Some(&standing),
        };
        let mut policy = HeuristicPolicy::normal().with_filter(RaiseFilter::StrictRaise);
        let mut rng = ScriptedRandom::new(vec![0.9, 0.95, 0.95]);
        assert_eq!(policy.decide(&ctx, &mut rng), Decision::NoViableBid);
        assert_eq!(policy.name(), "heuristic_normal");
    }

    #[test]
    #[should_panic(expected = "no own dice")]
    fn empty_hand_is_rejected() {
        let _ = decide(&[], 4, None, &mut ScriptedRandom::constant(0.5));
    }

    #[test]
    #[should_panic(expected = "smaller than own dice")]
    fn table_smaller_than_hand_is_rejected() {
        let own = dice(&[1, 2, 3]);
        let _ = decide(&own, 2, None, &mut ScriptedRandom::constant(0.5));
    }
}
