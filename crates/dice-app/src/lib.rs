pub mod cli;
pub mod console;
pub mod controller;

pub use controller::GameController;
