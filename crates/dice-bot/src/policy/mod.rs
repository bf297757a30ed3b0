mod heuristic;
mod params;

pub use heuristic::{HeuristicPolicy, decide, decide_with};
pub use params::PolicyParams;

use crate::random::RandomSource;
use dice_core::model::bid::Bid;
use dice_core::model::face::Face;
use std::sync::OnceLock;

/// What the policy sees on its turn: its own cup, the table size and the
/// bid it must beat, if any.
#[derive(Debug, Clone, Copy)]
pub struct PolicyContext<'a> {
    pub own_dice: &'a [Face],
    pub total_dice: usize,
    pub standing: Option<&'a Bid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Challenge,
    Raise(Bid),
    /// No candidate scored above zero. Callers must pick a fallback.
    NoViableBid,
}

impl Decision {
    pub fn is_challenge(&self) -> bool {
        matches!(self, Decision::Challenge)
    }

    pub fn bid(&self) -> Option<Bid> {
        match self {
            Decision::Raise(bid) => Some(*bid),
            _ => None,
        }
    }
}

/// Common interface for computer opponents.
pub trait Policy: Send {
    fn decide(&mut self, ctx: &PolicyContext<'_>, rng: &mut dyn RandomSource) -> Decision;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BotDifficulty {
    Easy,
    #[default]
    Normal,
}

impl BotDifficulty {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" | "simple" => Some(BotDifficulty::Easy),
            "normal" | "default" | "heuristic" => Some(BotDifficulty::Normal),
            _ => None,
        }
    }

    pub fn from_env() -> Self {
        static CACHED: OnceLock<BotDifficulty> = OnceLock::new();
        *CACHED.get_or_init(|| {
            std::env::var("LIARS_BOT_DIFFICULTY")
                .ok()
                .and_then(|raw| Self::parse(&raw))
                .unwrap_or_default()
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BotDifficulty::Easy => "easy",
            BotDifficulty::Normal => "normal",
        }
    }
}

/// Whether candidate raises are checked against the standing bid before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RaiseFilter {
    /// Score every candidate, even ones that do not beat the standing bid.
    #[default]
    Permissive,
    /// Drop candidates that do not beat the standing bid.
    StrictRaise,
}

impl RaiseFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "permissive" | "reference" => Some(RaiseFilter::Permissive),
            "strict" | "strict_raise" => Some(RaiseFilter::StrictRaise),
            _ => None,
        }
    }

    pub fn from_env() -> Self {
        static CACHED: OnceLock<RaiseFilter> = OnceLock::new();
        *CACHED.get_or_init(|| {
            std::env::var("LIARS_RAISE_FILTER")
                .ok()
                .and_then(|raw| Self::parse(&raw))
                .unwrap_or_default()
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            RaiseFilter::Permissive => "permissive",
            RaiseFilter::StrictRaise => "strict",
        }
    }
}
