//! Streaming view: keeps a rendered view tree in step with a session.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::coalesce::{CoalescedUpdates, StreamUpdate, UpdatePriority};
use super::scheduler::FlushScheduler;
use super::session::MarkdownSession;
use crate::model::ViewNode;
use crate::parser::MarkdownParser;
use crate::render::Markdown;

type UpdateCallback = Box<dyn FnMut(&ViewNode, UpdatePriority)>;

struct StreamState {
    markdown: Markdown,
    parser: Box<dyn MarkdownParser>,
    view: RefCell<ViewNode>,
    text: RefCell<String>,
    revision: Cell<u64>,
    on_update: RefCell<Option<UpdateCallback>>,
}

impl StreamState {
    fn apply(&self, update: StreamUpdate) {
        let view = self.markdown.render(&update.text, self.parser.as_ref());
        self.view.replace(view);
        self.text.replace(update.text);
        self.revision.set(self.revision.get() + 1);
        log::debug!("Stream re-rendered, revision {}", self.revision.get());

        // Taken out while it runs so the callback can read the stream.
        let callback = self.on_update.borrow_mut().take();
        if let Some(mut callback) = callback {
            callback(&self.view.borrow(), update.priority);
            let mut slot = self.on_update.borrow_mut();
            if slot.is_none() {
                *slot = Some(callback);
            }
        }
    }
}

/// View tree of a streaming session.
///
/// Every coalesced update re-parses the full session text and replaces the
/// stored view. The initial view renders whatever the session held at
/// construction, at revision 0.
pub struct MarkdownStream {
    state: Rc<StreamState>,
    updates: CoalescedUpdates,
}

impl MarkdownStream {
    /// Follow `session`, flushing through `scheduler` with normal priority.
    pub fn new<P>(
        session: &MarkdownSession,
        scheduler: Rc<dyn FlushScheduler>,
        markdown: Markdown,
        parser: P,
    ) -> Self
    where
        P: MarkdownParser + 'static,
    {
        Self::with_priority(session, scheduler, UpdatePriority::Normal, markdown, parser)
    }

    /// Follow `session` with an explicit update priority.
    pub fn with_priority<P>(
        session: &MarkdownSession,
        scheduler: Rc<dyn FlushScheduler>,
        priority: UpdatePriority,
        markdown: Markdown,
        parser: P,
    ) -> Self
    where
        P: MarkdownParser + 'static,
    {
        let text = session.all_text();
        let view = markdown.render(&text, &parser);
        let state = Rc::new(StreamState {
            markdown,
            parser: Box::new(parser),
            view: RefCell::new(view),
            text: RefCell::new(text),
            revision: Cell::new(0),
            on_update: RefCell::new(None),
        });

        let weak: Weak<StreamState> = Rc::downgrade(&state);
        let updates = CoalescedUpdates::subscribe(session, scheduler, priority, move |update| {
            if let Some(state) = weak.upgrade() {
                state.apply(update);
            }
        });

        Self { state, updates }
    }

    /// The latest rendered view.
    pub fn view(&self) -> ViewNode {
        self.state.view.borrow().clone()
    }

    /// The text the latest view was rendered from.
    pub fn text(&self) -> String {
        self.state.text.borrow().clone()
    }

    /// Number of re-renders since construction.
    pub fn revision(&self) -> u64 {
        self.state.revision.get()
    }

    /// Check if session changes are waiting for a flush.
    pub fn is_pending(&self) -> bool {
        self.updates.has_outstanding_flush()
    }

    /// Register the callback run after each re-render, replacing any
    /// previous one.
    pub fn on_update<F>(&self, callback: F)
    where
        F: FnMut(&ViewNode, UpdatePriority) + 'static,
    {
        self.state.on_update.replace(Some(Box::new(callback)));
    }
}

impl fmt::Debug for MarkdownStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkdownStream")
            .field("revision", &self.revision())
            .field("updates", &self.updates)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::model::{DocumentNode, Role};
    use crate::parser::ParserOptions;
    use crate::render::PARSE_ERROR_MESSAGE;
    use crate::stream::scheduler::{ImmediateScheduler, IntervalScheduler};
    use std::time::Duration;

    fn paragraph_parser(text: &str, _: &ParserOptions) -> Result<DocumentNode> {
        Ok(DocumentNode::document(vec![DocumentNode::paragraph(vec![
            DocumentNode::text(text),
        ])]))
    }

    #[test]
    fn test_initial_render_at_revision_zero() {
        let session = MarkdownSession::new();
        session.append("hello");
        let stream = MarkdownStream::new(
            &session,
            Rc::new(ImmediateScheduler::new()),
            Markdown::new(),
            paragraph_parser,
        );

        assert_eq!(stream.revision(), 0);
        assert_eq!(stream.text(), "hello");
        assert_eq!(stream.view().plain_text(), "hello");
    }

    #[test]
    fn test_rerenders_once_per_flush() {
        let session = MarkdownSession::new();
        let scheduler = Rc::new(IntervalScheduler::default());
        let stream = MarkdownStream::new(
            &session,
            scheduler.clone(),
            Markdown::new(),
            paragraph_parser,
        );

        session.append("to");
        session.append("ken");
        assert!(stream.is_pending());
        assert_eq!(stream.revision(), 0);

        scheduler.advance(Duration::from_millis(50));
        assert_eq!(stream.revision(), 1);
        assert_eq!(stream.view().plain_text(), "token");
        assert!(!stream.is_pending());
    }

    #[test]
    fn test_on_update_sees_new_view() {
        let session = MarkdownSession::new();
        let stream = MarkdownStream::with_priority(
            &session,
            Rc::new(ImmediateScheduler::new()),
            UpdatePriority::Transition,
            Markdown::new(),
            paragraph_parser,
        );
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        stream.on_update(move |view, priority| {
            sink.borrow_mut().push((view.plain_text(), priority));
        });

        session.append("a");
        session.append("b");
        assert_eq!(
            *seen.borrow(),
            vec![
                ("a".to_string(), UpdatePriority::Transition),
                ("ab".to_string(), UpdatePriority::Transition),
            ]
        );
    }

    #[test]
    fn test_parse_failure_renders_error_marker() {
        let session = MarkdownSession::new();
        let failing = |_: &str, _: &ParserOptions| -> Result<DocumentNode> {
            Err(Error::parse("unterminated"))
        };
        let stream = MarkdownStream::new(
            &session,
            Rc::new(ImmediateScheduler::new()),
            Markdown::new(),
            failing,
        );

        session.append("x");
        let view = stream.view();
        assert!(view
            .find(&|n| n.role() == Some(&Role::ErrorMarker))
            .is_some());
        assert!(view.plain_text().contains(PARSE_ERROR_MESSAGE));
    }

    #[test]
    fn test_dropping_stream_stops_updates() {
        let session = MarkdownSession::new();
        let stream = MarkdownStream::new(
            &session,
            Rc::new(ImmediateScheduler::new()),
            Markdown::new(),
            paragraph_parser,
        );
        assert_eq!(session.listener_count(), 1);
        drop(stream);
        assert_eq!(session.listener_count(), 0);
        session.append("late");
    }
}
