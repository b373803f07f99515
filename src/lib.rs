pub mod draw;
pub mod logging;
pub mod runes;
pub mod settings;
