//! Coalesced session updates.
//!
//! Streaming produces far more chunks than a view can usefully redraw.
//! [`CoalescedUpdates`] collapses every notification that arrives while a
//! flush is outstanding into that single flush, which reads the session's
//! latest text when it runs and forwards it only if it changed.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::scheduler::{FlushScheduler, TaskId};
use super::session::{MarkdownSession, Subscription};

/// How urgently the consumer should apply an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdatePriority {
    /// Apply right away
    #[default]
    Normal,
    /// Interruptible; user interaction may take precedence
    Transition,
}

impl UpdatePriority {
    /// Check if the consumer may defer or drop this update.
    pub fn is_interruptible(self) -> bool {
        self == UpdatePriority::Transition
    }
}

/// Text forwarded to the sink by a flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamUpdate {
    /// Full session text at flush time
    pub text: String,
    pub priority: UpdatePriority,
}

type Sink = Box<dyn FnMut(StreamUpdate)>;

struct CoalesceState {
    session: MarkdownSession,
    scheduler: Rc<dyn FlushScheduler>,
    priority: UpdatePriority,
    pending: Cell<bool>,
    in_flight: Cell<bool>,
    scheduled: Cell<Option<TaskId>>,
    torn_down: Cell<bool>,
    last_emitted: RefCell<String>,
    sink: RefCell<Sink>,
}

impl CoalesceState {
    fn on_notify(self: &Rc<Self>) {
        if self.torn_down.get() {
            return;
        }
        self.pending.set(true);
        self.request_flush();
    }

    fn request_flush(self: &Rc<Self>) {
        if self.in_flight.get() {
            return;
        }
        self.in_flight.set(true);

        let weak: Weak<Self> = Rc::downgrade(self);
        let id = self.scheduler.schedule(Box::new(move || {
            if let Some(state) = weak.upgrade() {
                state.flush();
            }
        }));

        // An immediate scheduler has already flushed by now.
        if self.in_flight.get() {
            self.scheduled.set(Some(id));
        }
    }

    fn flush(self: &Rc<Self>) {
        if self.torn_down.get() {
            return;
        }
        self.in_flight.set(false);
        self.scheduled.set(None);

        if !self.pending.get() {
            return;
        }

        let Ok(mut sink) = self.sink.try_borrow_mut() else {
            // Re-entered from inside the sink; the outer flush picks it up.
            return;
        };
        self.pending.set(false);

        let latest = self.session.all_text();
        if *self.last_emitted.borrow() == latest {
            log::trace!("Skipping flush, text unchanged");
            return;
        }
        self.last_emitted.replace(latest.clone());

        log::debug!("Flushing {} bytes of streamed text", latest.len());
        (*sink)(StreamUpdate {
            text: latest,
            priority: self.priority,
        });
        drop(sink);

        if self.pending.get() && !self.torn_down.get() {
            self.request_flush();
        }
    }

    fn teardown(&self) {
        self.torn_down.set(true);
        self.pending.set(false);
        if let Some(id) = self.scheduled.take() {
            self.scheduler.cancel(id);
        }
        self.in_flight.set(false);
    }
}

/// Subscription to a session that forwards coalesced text updates.
///
/// At most one flush is outstanding at a time. Dropping the value, or
/// calling [`unsubscribe`](Self::unsubscribe), removes the session
/// listener and cancels the outstanding flush.
#[must_use = "dropping CoalescedUpdates unsubscribes immediately"]
pub struct CoalescedUpdates {
    state: Rc<CoalesceState>,
    subscription: Option<Subscription>,
}

impl CoalescedUpdates {
    /// Subscribe to `session`, forwarding updates to `sink` on flushes run
    /// by `scheduler`.
    ///
    /// The session text at subscription time counts as already delivered.
    pub fn subscribe<F>(
        session: &MarkdownSession,
        scheduler: Rc<dyn FlushScheduler>,
        priority: UpdatePriority,
        sink: F,
    ) -> Self
    where
        F: FnMut(StreamUpdate) + 'static,
    {
        let state = Rc::new(CoalesceState {
            session: session.clone(),
            scheduler,
            priority,
            pending: Cell::new(false),
            in_flight: Cell::new(false),
            scheduled: Cell::new(None),
            torn_down: Cell::new(false),
            last_emitted: RefCell::new(session.all_text()),
            sink: RefCell::new(Box::new(sink)),
        });

        let weak = Rc::downgrade(&state);
        let subscription = session.add_listener(move || {
            if let Some(state) = weak.upgrade() {
                state.on_notify();
            }
        });

        Self {
            state,
            subscription: Some(subscription),
        }
    }

    /// Check if a notification is waiting for its flush.
    pub fn is_pending(&self) -> bool {
        self.state.pending.get()
    }

    /// Check if a flush is scheduled and has not run yet.
    pub fn has_outstanding_flush(&self) -> bool {
        self.state.in_flight.get()
    }

    /// The text most recently forwarded to the sink.
    pub fn last_emitted(&self) -> String {
        self.state.last_emitted.borrow().clone()
    }

    /// Stop forwarding updates.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            self.state.teardown();
        }
    }
}

impl Drop for CoalescedUpdates {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for CoalescedUpdates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoalescedUpdates")
            .field("priority", &self.state.priority)
            .field("pending", &self.state.pending.get())
            .field("in_flight", &self.state.in_flight.get())
            .field("active", &self.subscription.is_some())
            .finish()
    }
}
