mod framework;
mod sample;

pub use framework::{RecordedAction, SessionOutcome, SessionReport, SessionRunner};
pub use sample::RandomBidder;
