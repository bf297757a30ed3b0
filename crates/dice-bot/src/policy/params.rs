/// Tunable weights of the heuristic opponent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyParams {
    /// Bluff threshold when confidence is zero.
    pub bluff_base: f64,
    /// Added to the threshold per unit of confidence.
    pub bluff_confidence_weight: f64,
    /// A challenge also needs a draw below this gate.
    pub challenge_gate: f64,
    /// Chance of proposing the same face one higher.
    pub raise_gate: f64,
    /// Chance of adding a random-face proposal.
    pub wild_gate: f64,
    pub wild_multiplier: f64,
    pub probability_weight: f64,
    pub confidence_weight: f64,
    pub mixed_hand_penalty: f64,
    pub high_quantity_ratio: f64,
    pub high_quantity_penalty: f64,
    pub min_confidence: f64,
    /// Easy bots challenge whenever the bid is less likely than this.
    pub easy_challenge_below: f64,
}

impl Default for PolicyParams {
    fn default() -> Self {
        Self {
            bluff_base: 0.3,
            bluff_confidence_weight: 0.2,
            challenge_gate: 0.8,
            raise_gate: 0.7,
            wild_gate: 0.2,
            wild_multiplier: 1.2,
            probability_weight: 0.6,
            confidence_weight: 0.4,
            mixed_hand_penalty: 0.8,
            high_quantity_ratio: 1.5,
            high_quantity_penalty: 0.7,
            min_confidence: 0.1,
            easy_challenge_below: 0.5,
        }
    }
}

impl PolicyParams {
    pub fn bluff_threshold(&self, confidence: f64) -> f64 {
        self.bluff_base + confidence * self.bluff_confidence_weight
    }

    pub fn score(&self, probability: f64, confidence: f64) -> f64 {
        self.probability_weight * probability + self.confidence_weight * confidence
    }
}
