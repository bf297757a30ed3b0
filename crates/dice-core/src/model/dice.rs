use crate::model::face::Face;
use core::fmt;
use rand::Rng;

/// The dice one side holds under its cup for the current round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiceHand {
    faces: Vec<Face>,
}

impl DiceHand {
    pub fn new() -> Self {
        Self { faces: Vec::new() }
    }

    pub fn with_faces(faces: Vec<Face>) -> Self {
        Self { faces }
    }

    pub fn from_values(values: &[u8]) -> Option<Self> {
        values
            .iter()
            .map(|&value| Face::from_value(value))
            .collect::<Option<Vec<_>>>()
            .map(Self::with_faces)
    }

    pub fn roll<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        let faces = (0..count).map(|_| Face::roll(rng)).collect();
        Self { faces }
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn iter(&self) -> impl Iterator<Item = &Face> {
        self.faces.iter()
    }

    pub fn count_of(&self, face: Face) -> u32 {
        count_matching(&self.faces, face)
    }

    pub fn face_counts(&self) -> FaceCounts {
        FaceCounts::from_faces(&self.faces)
    }
}

impl fmt::Display for DiceHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, face) in self.faces.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", face.symbol())?;
        }
        Ok(())
    }
}

pub fn count_matching(faces: &[Face], face: Face) -> u32 {
    faces.iter().filter(|&&candidate| candidate == face).count() as u32
}

/// Per-face tally of a set of dice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaceCounts {
    counts: [u32; Face::COUNT],
}

impl FaceCounts {
    pub fn from_faces(faces: &[Face]) -> Self {
        let mut counts = [0u32; Face::COUNT];
        for face in faces {
            counts[face.index()] += 1;
        }
        Self { counts }
    }

    pub fn get(&self, face: Face) -> u32 {
        self.counts[face.index()]
    }

    /// Highest count, scanning faces upward; the lowest face wins a tie.
    pub fn most_common(&self) -> Option<(Face, u32)> {
        let mut best: Option<(Face, u32)> = None;
        for (face, count) in self.present() {
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((face, count));
            }
        }
        best
    }

    /// Faces with a non-zero count, in ascending order.
    pub fn present(&self) -> impl Iterator<Item = (Face, u32)> + '_ {
        Face::ALL
            .iter()
            .copied()
            .map(|face| (face, self.get(face)))
            .filter(|(_, count)| *count > 0)
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}
