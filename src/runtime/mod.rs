//! Live runtime: session lifecycle, tick scheduling and the editing bridge.
//!
//! Everything runs on one thread. The host (a display loop, a headless
//! clock, or a test) delivers frame callbacks; each callback drains editing
//! commands and then runs exactly one tick.
//!
//! ```text
//! [TickRequester] ──callback──► [FrameScheduler] ──► [DataflowGraph]
//!                                   │    ▲                │
//!                     RuntimeMessage│    │RuntimeCommand  ▼
//!                                   ▼    │          [StageRenderer]
//!                                [RuntimeBridge]
//! ```

pub mod bridge;
pub mod context;
pub mod scheduler;
pub mod state;
pub mod stats;
pub mod ticker;

pub use bridge::{RuntimeBridge, RuntimeCommand, RuntimeLink, RuntimeMessage};
pub use context::RuntimeContext;
pub use scheduler::{FrameScheduler, TickOutcome, TickReport};
pub use state::{SchedulerState, StatusReport};
pub use stats::TickStats;
pub use ticker::{FrameClock, ManualTicker, TickRequester};
