pub mod screen;

pub use screen::{ActionOutcome, ScreenController};
