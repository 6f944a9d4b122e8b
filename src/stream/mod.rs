//! Streaming support.
//!
//! A [`MarkdownSession`] accumulates chunks as they arrive. Observers
//! subscribe through [`CoalescedUpdates`], which batches notifications into
//! flushes timed by a [`FlushScheduler`]; [`MarkdownStream`] re-renders the
//! session on each flush. [`Timeline`] and [`HighlightSync`] drive the
//! session's highlight position from a playback clock.
//!
//! Everything here is single-threaded: handles are `Rc`-based and neither
//! `Send` nor `Sync`.

mod coalesce;
mod scheduler;
mod session;
mod timeline;
mod view;

pub use coalesce::{CoalescedUpdates, StreamUpdate, UpdatePriority};
pub use scheduler::{
    FlushScheduler, FrameScheduler, ImmediateScheduler, IntervalScheduler, Task, TaskId,
    DEFAULT_UPDATE_INTERVAL,
};
pub use session::{ListenerSet, MarkdownSession, Subscription};
pub use timeline::{resolve_highlight_position, HighlightSync, Timeline, TimestampEntry};
pub use view::MarkdownStream;
