mod clock;
mod countdown;
mod engine;
mod mode;

pub use clock::{Clock, ManualClock, SystemClock};
pub use countdown::Countdown;
pub use engine::{SessionEngine, TickOutcome};
pub use mode::Mode;
