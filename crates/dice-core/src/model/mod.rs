pub mod bid;
pub mod dice;
pub mod face;
pub mod side;
