mod clock;
mod engine;
mod mode;
mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{format_clock, EngineState, IntervalEngine, TimerSnapshot, LONG_BREAK_EVERY};
pub use mode::{Mode, RunState};
pub use service::TimerService;
