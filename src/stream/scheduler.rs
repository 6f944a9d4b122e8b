//! Flush schedulers.
//!
//! A [`FlushScheduler`] decides when a deferred task runs. The interval and
//! frame schedulers are driven by the host loop: the host calls
//! [`IntervalScheduler::run_due`] with the current time or
//! [`FrameScheduler::run_frame`] once per frame. Tasks never run while the
//! scheduler's own state is borrowed, so they may schedule or cancel
//! other tasks.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::time::Duration;

/// Default delay of [`IntervalScheduler`].
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(50);

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce()>;

/// Handle of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Strategy deciding when a scheduled task runs.
pub trait FlushScheduler {
    /// Schedule `task`; the returned id can cancel it before it runs.
    fn schedule(&self, task: Task) -> TaskId;

    /// Cancel a task that has not run yet; unknown ids are ignored.
    fn cancel(&self, id: TaskId);
}

#[derive(Debug, Default)]
struct IdSource(Cell<u64>);

impl IdSource {
    fn next(&self) -> TaskId {
        let id = self.0.get();
        self.0.set(id + 1);
        TaskId(id)
    }
}

/// Runs every task inside [`schedule`](FlushScheduler::schedule), so no
/// updates are coalesced.
#[derive(Debug, Default)]
pub struct ImmediateScheduler {
    ids: IdSource,
}

impl ImmediateScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlushScheduler for ImmediateScheduler {
    fn schedule(&self, task: Task) -> TaskId {
        let id = self.ids.next();
        task();
        id
    }

    fn cancel(&self, _id: TaskId) {}
}

struct Timer {
    id: TaskId,
    deadline: Duration,
    task: Task,
}

/// Runs each task a fixed delay after it was scheduled.
///
/// Time is a logical clock measured from an arbitrary origin (for example
/// `Instant::elapsed` of a start instant); it only moves forward when the
/// host calls [`run_due`](Self::run_due) or [`advance`](Self::advance).
pub struct IntervalScheduler {
    interval: Duration,
    now: Cell<Duration>,
    ids: IdSource,
    timers: RefCell<Vec<Timer>>,
}

impl IntervalScheduler {
    /// Create a scheduler with the given delay.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            now: Cell::new(Duration::ZERO),
            ids: IdSource::default(),
            timers: RefCell::new(Vec::new()),
        }
    }

    /// The configured delay.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Current logical time.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.borrow().iter().map(|timer| timer.deadline).min()
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Move the clock to `now` and run every task due by then, in deadline
    /// order. Tasks scheduled while running wait for a later call.
    /// Returns the number of tasks run.
    pub fn run_due(&self, now: Duration) -> usize {
        if now > self.now.get() {
            self.now.set(now);
        }
        let now = self.now.get();

        let mut due: Vec<Timer> = {
            let mut timers = self.timers.borrow_mut();
            let (due, waiting): (Vec<Timer>, Vec<Timer>) =
                timers.drain(..).partition(|timer| timer.deadline <= now);
            *timers = waiting;
            due
        };
        due.sort_by_key(|timer| (timer.deadline, timer.id));

        let count = due.len();
        for timer in due {
            log::trace!("Running timer {:?}", timer.id);
            (timer.task)();
        }
        count
    }

    /// Advance the clock by `elapsed` and run due tasks.
    pub fn advance(&self, elapsed: Duration) -> usize {
        self.run_due(self.now.get() + elapsed)
    }
}

impl Default for IntervalScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_INTERVAL)
    }
}

impl FlushScheduler for IntervalScheduler {
    fn schedule(&self, task: Task) -> TaskId {
        let id = self.ids.next();
        self.timers.borrow_mut().push(Timer {
            id,
            deadline: self.now.get() + self.interval,
            task,
        });
        id
    }

    fn cancel(&self, id: TaskId) {
        self.timers.borrow_mut().retain(|timer| timer.id != id);
    }
}

impl fmt::Debug for IntervalScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalScheduler")
            .field("interval", &self.interval)
            .field("now", &self.now.get())
            .field("pending", &self.pending())
            .finish()
    }
}

/// Runs tasks at the next frame.
#[derive(Default)]
pub struct FrameScheduler {
    ids: IdSource,
    queue: RefCell<Vec<(TaskId, Task)>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run the tasks queued before this frame began. Tasks queued while
    /// running wait for the next frame. Returns the number of tasks run.
    pub fn run_frame(&self) -> usize {
        let frame = std::mem::take(&mut *self.queue.borrow_mut());
        let count = frame.len();
        for (_, task) in frame {
            task();
        }
        count
    }
}

impl FlushScheduler for FrameScheduler {
    fn schedule(&self, task: Task) -> TaskId {
        let id = self.ids.next();
        self.queue.borrow_mut().push((id, task));
        id
    }

    fn cancel(&self, id: TaskId) {
        self.queue.borrow_mut().retain(|(queued, _)| *queued != id);
    }
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<u32>>>, impl Fn(u32) -> Task) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let handle = Rc::clone(&log);
        let make = move |n: u32| -> Task {
            let log = Rc::clone(&handle);
            Box::new(move || log.borrow_mut().push(n))
        };
        (log, make)
    }

    #[test]
    fn test_immediate_runs_inline() {
        let (log, task) = recorder();
        let scheduler = ImmediateScheduler::new();
        let a = scheduler.schedule(task(1));
        let b = scheduler.schedule(task(2));
        assert_ne!(a, b);
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_interval_runs_after_delay() {
        let (log, task) = recorder();
        let scheduler = IntervalScheduler::default();
        assert_eq!(scheduler.interval(), Duration::from_millis(50));

        scheduler.schedule(task(1));
        assert_eq!(scheduler.next_deadline(), Some(Duration::from_millis(50)));

        assert_eq!(scheduler.run_due(Duration::from_millis(49)), 0);
        assert!(log.borrow().is_empty());

        assert_eq!(scheduler.run_due(Duration::from_millis(50)), 1);
        assert_eq!(*log.borrow(), vec![1]);
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn test_interval_cancel() {
        let (log, task) = recorder();
        let scheduler = IntervalScheduler::new(Duration::from_millis(10));
        let id = scheduler.schedule(task(1));
        scheduler.schedule(task(2));
        scheduler.cancel(id);

        scheduler.advance(Duration::from_millis(10));
        assert_eq!(*log.borrow(), vec![2]);
    }

    #[test]
    fn test_interval_deadline_order() {
        let (log, task) = recorder();
        let scheduler = IntervalScheduler::new(Duration::from_millis(10));
        scheduler.schedule(task(1));
        scheduler.advance(Duration::from_millis(5));
        scheduler.schedule(task(2));

        assert_eq!(scheduler.advance(Duration::from_millis(20)), 2);
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_interval_task_can_reschedule() {
        let scheduler = Rc::new(IntervalScheduler::new(Duration::from_millis(10)));
        let ran = Rc::new(Cell::new(0));

        let inner_scheduler = Rc::clone(&scheduler);
        let inner_ran = Rc::clone(&ran);
        scheduler.schedule(Box::new(move || {
            inner_ran.set(inner_ran.get() + 1);
            let again = Rc::clone(&inner_ran);
            inner_scheduler.schedule(Box::new(move || again.set(again.get() + 1)));
        }));

        assert_eq!(scheduler.advance(Duration::from_millis(10)), 1);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.advance(Duration::from_millis(10)), 1);
        assert_eq!(ran.get(), 2);
    }

    #[test]
    fn test_frame_runs_queued_tasks_only() {
        let scheduler = Rc::new(FrameScheduler::new());
        let ran = Rc::new(Cell::new(0));

        let inner_scheduler = Rc::clone(&scheduler);
        let inner_ran = Rc::clone(&ran);
        scheduler.schedule(Box::new(move || {
            inner_ran.set(inner_ran.get() + 1);
            let again = Rc::clone(&inner_ran);
            inner_scheduler.schedule(Box::new(move || again.set(again.get() + 10)));
        }));

        assert_eq!(scheduler.run_frame(), 1);
        assert_eq!(ran.get(), 1);
        assert_eq!(scheduler.run_frame(), 1);
        assert_eq!(ran.get(), 11);
        assert_eq!(scheduler.run_frame(), 0);
    }

    #[test]
    fn test_frame_cancel() {
        let (log, task) = recorder();
        let scheduler = FrameScheduler::new();
        let id = scheduler.schedule(task(1));
        scheduler.cancel(id);
        assert_eq!(scheduler.run_frame(), 0);
        assert!(log.borrow().is_empty());
    }
}
