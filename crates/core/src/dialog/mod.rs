pub mod engine;
pub mod merge;
pub mod states;

pub use engine::{DialogController, DialogError, DEFAULT_SESSION_ENDED_MESSAGE};
pub use merge::merge;
pub use states::{Card, DialogAction, DialogIntent, DialogOutcome, DialogState};
