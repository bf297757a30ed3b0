use core::fmt;
use serde::{Deserialize, Serialize};

/// One of the two seats at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    Human = 0,
    Computer = 1,
}

impl Side {
    pub const LOOP: [Side; 2] = [Side::Human, Side::Computer];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Side::Human),
            1 => Some(Side::Computer),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn opponent(self) -> Side {
        match self {
            Side::Human => Side::Computer,
            Side::Computer => Side::Human,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Side::Human => "Player",
            Side::Computer => "Computer",
        };
        f.write_str(label)
    }
}
