use crate::policy::PolicyParams;
use dice_core::model::dice::count_matching;
use dice_core::model::face::Face;

/// How strongly our own dice back a claim of `quantity` × `face`, in
/// `[params.min_confidence, 1.0]`.
pub fn confidence(own_dice: &[Face], quantity: u32, face: Face, params: &PolicyParams) -> f64 {
    assert!(!own_dice.is_empty(), "confidence needs at least one own die");

    let hand_size = own_dice.len() as f64;
    let matching = count_matching(own_dice, face);
    let mut confidence = f64::from(matching) / hand_size;

    if (matching as usize) < own_dice.len() {
        confidence *= params.mixed_hand_penalty;
    }

    if f64::from(quantity) / hand_size > params.high_quantity_ratio {
        confidence *= params.high_quantity_penalty;
    }

    confidence.clamp(params.min_confidence, 1.0)
}
