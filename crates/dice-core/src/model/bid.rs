use crate::model::face::Face;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A claim that at least `quantity` dice on the table show `face`.
///
/// Field order matters: the derived `Ord` compares quantity first and face
/// second, which is exactly the raising order of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Bid {
    pub quantity: u32,
    pub face: Face,
}

impl Bid {
    pub fn new(quantity: u32, face: Face) -> Self {
        assert!(quantity >= 1, "bid quantity must be at least one");
        Self { quantity, face }
    }

    pub fn try_new(quantity: u32, face_value: u8) -> Result<Self, BidError> {
        if quantity == 0 {
            return Err(BidError::ZeroQuantity);
        }
        let face = Face::from_value(face_value).ok_or(BidError::FaceOutOfRange(face_value))?;
        Ok(Self { quantity, face })
    }

    /// Strictly greater than `standing` under the raising order.
    pub fn exceeds(&self, standing: &Bid) -> bool {
        self > standing
    }

    pub fn is_valid_raise(bid: &Bid, standing: Option<&Bid>) -> bool {
        standing.is_none_or(|standing| bid.exceeds(standing))
    }

    /// Smallest bid that beats `standing`; the opening minimum when nothing stands.
    pub fn suggested_raise(standing: Option<&Bid>) -> Bid {
        match standing {
            None => Bid::new(1, Face::One),
            Some(standing) => match standing.face.next() {
                Some(face) => Bid::new(standing.quantity, face),
                None => Bid::new(standing.quantity + 1, Face::One),
            },
        }
    }
}

impl fmt::Display for Bid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} × {}s", self.quantity, self.face)
    }
}

impl FromStr for Bid {
    type Err = BidError;

    /// Accepts `"3 5"`, `"3x5"` or `"3×5"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(['x', 'X', '×'], " ");
        let mut parts = normalized.split_whitespace();
        let (Some(quantity), Some(face), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(BidError::Malformed(s.trim().to_string()));
        };
        let quantity = quantity
            .parse::<u32>()
            .map_err(|_| BidError::Malformed(s.trim().to_string()))?;
        let face = face
            .parse::<u8>()
            .map_err(|_| BidError::Malformed(s.trim().to_string()))?;
        Bid::try_new(quantity, face)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BidError {
    #[error("bid quantity must be at least one")]
    ZeroQuantity,
    #[error("face value {0} is outside 1..=6")]
    FaceOutOfRange(u8),
    #[error("cannot read '{0}' as a bid; expected '<quantity> <face>'")]
    Malformed(String),
}

/// Result of revealing every die against a challenged bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub bid_held: bool,
    pub actual_count: u32,
}

#[cfg(test)]
mod tests {
    use super::{Bid, BidError};
    use crate::model::face::Face;

    #[test]
    fn higher_quantity_beats_any_face() {
        let standing = Bid::new(3, Face::Six);
        assert!(Bid::new(4, Face::One).exceeds(&standing));
    }

    #[test]
    fn same_quantity_needs_higher_face() {
        let standing = Bid::new(3, Face::Four);
        assert!(Bid::new(3, Face::Five).exceeds(&standing));
        assert!(!Bid::new(3, Face::Four).exceeds(&standing));
        assert!(!Bid::new(3, Face::Two).exceeds(&standing));
        assert!(!Bid::new(2, Face::Six).exceeds(&standing));
    }

    #[test]
    fn anything_is_valid_without_standing_bid() {
        assert!(Bid::is_valid_raise(&Bid::new(1, Face::One), None));
    }

    #[test]
    fn suggested_raise_wraps_after_six() {
        assert_eq!(Bid::suggested_raise(None), Bid::new(1, Face::One));
        assert_eq!(
            Bid::suggested_raise(Some(&Bid::new(2, Face::Three))),
            Bid::new(2, Face::Four)
        );
        assert_eq!(
            Bid::suggested_raise(Some(&Bid::new(2, Face::Six))),
            Bid::new(3, Face::One)
        );
    }

    #[test]
    fn suggested_raise_always_exceeds() {
        for quantity in 1..5 {
            for face in Face::ALL {
                let standing = Bid::new(quantity, face);
                assert!(Bid::suggested_raise(Some(&standing)).exceeds(&standing));
            }
        }
    }

    #[test]
    fn try_new_rejects_bad_input() {
        assert_eq!(Bid::try_new(0, 3), Err(BidError::ZeroQuantity));
        assert_eq!(Bid::try_new(2, 7), Err(BidError::FaceOutOfRange(7)));
        assert_eq!(Bid::try_new(2, 6), Ok(Bid::new(2, Face::Six)));
    }

    #[test]
    #[should_panic(expected = "at least one")]
    fn new_rejects_zero_quantity() {
        let _ = Bid::new(0, Face::Two);
    }

    #[test]
    fn parses_common_spellings() {
        assert_eq!("3 5".parse::<Bid>(), Ok(Bid::new(3, Face::Five)));
        assert_eq!(" 4x2 ".parse::<Bid>(), Ok(Bid::new(4, Face::Two)));
        assert_eq!("10×6".parse::<Bid>(), Ok(Bid::new(10, Face::Six)));
        assert!(matches!("three fives".parse::<Bid>(), Err(BidError::Malformed(_))));
        assert!(matches!("3 5 1".parse::<Bid>(), Err(BidError::Malformed(_))));
    }

    #[test]
    fn display_reads_naturally() {
        assert_eq!(Bid::new(3, Face::Five).to_string(), "3 × 5s");
    }
}
