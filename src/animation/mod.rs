//! Animation descriptions and the scheduler seam.
//!
//! ## Key Features
//!
//! - **Two lanes**: formations append to a primary or secondary sequential
//!   timeline, or start immediately
//! - **Resolved patches**: schedulers receive absolute values only
//! - **Completion gates**: N parallel animations report back, one fires
//!
//! ## Usage
//!
//! ```
//! use tarot_deck::animation::{Lane, Placement, RecordingScheduler, Scheduler, TweenBatch};
//!
//! let mut scheduler = RecordingScheduler::new();
//! scheduler.schedule(&TweenBatch { placement: Placement::Lane(Lane::Primary), tweens: vec![] });
//! assert!(scheduler.pending().is_empty());
//! ```

pub mod ease;
pub mod gate;
pub mod scheduler;
pub mod tween;

pub use ease::Ease;
pub use gate::{GateId, ParallelCompletionGate};
pub use scheduler::{RecordingScheduler, ScheduledTween, Scheduler};
pub use tween::{
    Lane, Placement, TransformPatch, Tween, TweenBatch, TweenId, TweenProps, TweenTarget,
};
