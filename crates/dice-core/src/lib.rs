#![deny(warnings)]
pub mod game;
pub mod model;
pub mod stats;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "liars-dice"
    }

    pub const fn codename() -> &'static str {
        "Pirate Edition"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
