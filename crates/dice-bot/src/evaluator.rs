use dice_core::model::bid::{Bid, Evaluation};
use dice_core::model::dice::count_matching;
use dice_core::model::face::Face;

/// Count every die showing the bid's face and report whether the claim held.
///
/// No face is wild. Panics on an empty table, which can only come from a
/// broken orchestrator.
pub fn evaluate(all_dice: &[Face], bid: &Bid) -> Evaluation {
    assert!(!all_dice.is_empty(), "evaluate called with no dice in play");
    assert!(bid.quantity >= 1, "bid quantity must be at least one");

    let actual_count = count_matching(all_dice, bid.face);
    Evaluation {
        bid_held: actual_count >= bid.quantity,
        actual_count,
    }
}
