pub mod canvas;
pub mod fade;

pub use canvas::{Color, RuneCanvas};
pub use fade::NameFade;
