//! Streaming session: an append-only text buffer with change listeners.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(T)>;

struct Listeners<T> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Callback<T>)>>,
}

/// Ordered set of callbacks.
///
/// Delivery iterates a snapshot, so callbacks may register or remove
/// listeners while being notified. A listener removed during delivery is
/// not called afterwards, and a panicking listener is logged and skipped.
pub struct ListenerSet<T> {
    inner: Rc<Listeners<T>>,
}

impl<T: Copy + 'static> ListenerSet<T> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Listeners {
                next_id: Cell::new(0),
                entries: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Register `callback`; it stays registered until the returned
    /// subscription is dropped or unsubscribed.
    pub fn add<F>(&self, callback: F) -> Subscription
    where
        F: Fn(T) + 'static,
    {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .entries
            .borrow_mut()
            .push((id, Rc::new(callback)));

        let weak: Weak<Listeners<T>> = Rc::downgrade(&self.inner);
        Subscription {
            remove: Some(Box::new(move || {
                if let Some(listeners) = weak.upgrade() {
                    listeners.entries.borrow_mut().retain(|(entry, _)| *entry != id);
                }
            })),
        }
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call every registered callback with `value`, in registration order.
    pub fn notify(&self, value: T) {
        let snapshot: Vec<(u64, Callback<T>)> = self.inner.entries.borrow().clone();

        for (id, callback) in snapshot {
            let registered = self
                .inner
                .entries
                .borrow()
                .iter()
                .any(|(entry, _)| *entry == id);
            if !registered {
                continue;
            }
            if catch_unwind(AssertUnwindSafe(|| callback(value))).is_err() {
                log::error!("Session listener {} panicked; continuing delivery", id);
            }
        }
    }
}

impl<T: Copy + 'static> Default for ListenerSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ListenerSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.inner.entries.borrow().len())
            .finish()
    }
}

/// Registration handle returned when adding a listener.
///
/// Dropping the handle removes the listener; [`Subscription::unsubscribe`]
/// does the same explicitly.
#[must_use = "dropping a Subscription removes the listener immediately"]
pub struct Subscription {
    remove: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Remove the listener. It is not called again once this returns.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.remove.is_some())
            .finish()
    }
}

struct SessionState {
    text: RefCell<String>,
    highlight: Cell<usize>,
    listeners: ListenerSet<()>,
    highlight_listeners: ListenerSet<usize>,
}

/// Append-only text buffer fed by a stream of chunks.
///
/// Cloning yields another handle to the same session. Text listeners are
/// notified once per [`append`](Self::append) or [`clear`](Self::clear);
/// highlight listeners once per change of the highlight position. No
/// borrow is held while listeners run, so they may read the session or
/// subscribe re-entrantly.
#[derive(Clone)]
pub struct MarkdownSession {
    state: Rc<SessionState>,
}

impl MarkdownSession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self {
            state: Rc::new(SessionState {
                text: RefCell::new(String::new()),
                highlight: Cell::new(0),
                listeners: ListenerSet::new(),
                highlight_listeners: ListenerSet::new(),
            }),
        }
    }

    /// Append a chunk and notify text listeners.
    pub fn append(&self, chunk: &str) {
        self.state.text.borrow_mut().push_str(chunk);
        log::trace!("Appended {} bytes to session", chunk.len());
        self.state.listeners.notify(());
    }

    /// Empty the buffer and notify text listeners.
    pub fn clear(&self) {
        self.state.text.borrow_mut().clear();
        self.state.listeners.notify(());
    }

    /// Empty the buffer and move the highlight back to the start.
    pub fn reset(&self) {
        self.clear();
        self.set_highlight_position(0);
    }

    /// Copy of the full buffer.
    pub fn all_text(&self) -> String {
        self.state.text.borrow().clone()
    }

    /// Buffer length in bytes.
    pub fn len(&self) -> usize {
        self.state.text.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.text.borrow().is_empty()
    }

    /// Current highlight position.
    pub fn highlight_position(&self) -> usize {
        self.state.highlight.get()
    }

    /// Move the highlight; highlight listeners are notified on change.
    pub fn set_highlight_position(&self, position: usize) {
        if self.state.highlight.replace(position) != position {
            self.state.highlight_listeners.notify(position);
        }
    }

    /// Register a callback for text changes.
    pub fn add_listener<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + 'static,
    {
        self.state.listeners.add(move |()| listener())
    }

    /// Register a callback for highlight position changes.
    pub fn add_highlight_listener<F>(&self, listener: F) -> Subscription
    where
        F: Fn(usize) + 'static,
    {
        self.state.highlight_listeners.add(listener)
    }

    /// Number of registered text listeners.
    pub fn listener_count(&self) -> usize {
        self.state.listeners.len()
    }
}

impl Default for MarkdownSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MarkdownSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkdownSession")
            .field("len", &self.len())
            .field("highlight", &self.highlight_position())
            .field("listeners", &self.state.listeners)
            .field("highlight_listeners", &self.state.highlight_listeners)
            .finish()
    }
}
