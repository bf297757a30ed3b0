pub mod confidence;
pub mod driver;
pub mod evaluator;
pub mod policy;
pub mod probability;
pub mod random;

pub use dice_core::model::bid::Evaluation;
pub use driver::{TurnOutcome, take_turn};
pub use evaluator::evaluate;
pub use policy::{
    BotDifficulty, Decision, HeuristicPolicy, Policy, PolicyContext, PolicyParams, RaiseFilter,
    decide, decide_with,
};
pub use random::{RandomSource, RngSource, ScriptedRandom};
