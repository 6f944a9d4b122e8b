//! Integration tests for playback-synchronized highlighting.

use std::cell::RefCell;
use std::rc::Rc;

use markstream::stream::resolve_highlight_position;
use markstream::{HighlightSync, MarkdownSession, Timeline};

#[test]
fn test_timeline_from_json_word_timings() {
    let timeline = Timeline::from_json(r#"{"0": 0, "1": 320, "2": 610, "3": 900}"#).unwrap();
    assert!(timeline.is_monotonic());
    assert_eq!(timeline.len(), 4);

    assert_eq!(resolve_highlight_position(&timeline, -10.0), 0);
    assert_eq!(resolve_highlight_position(&timeline, 0.0), 1);
    assert_eq!(resolve_highlight_position(&timeline, 609.9), 2);
    assert_eq!(resolve_highlight_position(&timeline, 610.0), 3);
    assert_eq!(resolve_highlight_position(&timeline, 5_000.0), 4);
}

#[test]
fn test_playback_drives_session_highlight() {
    let session = MarkdownSession::new();
    session.append("one two three");

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _sub = session.add_highlight_listener(move |pos| sink.borrow_mut().push(pos));

    let mut sync = HighlightSync::with_timeline(Timeline::new([
        (0.0, 100.0),
        (1.0, 220.0),
        (2.0, 420.0),
    ]));

    // Playback ticks every 40ms.
    let mut time = 0.0;
    while time <= 500.0 {
        sync.sync(&session, time);
        time += 40.0;
    }

    assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    assert_eq!(session.highlight_position(), 3);
}

#[test]
fn test_out_of_order_observations() {
    let timeline = Timeline::new([(0.0, 300.0), (1.0, 100.0), (2.0, 500.0)]);
    assert!(!timeline.is_monotonic());

    let session = MarkdownSession::new();
    let mut sync = HighlightSync::with_timeline(timeline);
    assert_eq!(sync.sync(&session, 150.0), Some(2));
    assert_eq!(sync.sync(&session, 350.0), None);
    assert_eq!(sync.sync(&session, 700.0), Some(3));
}

#[test]
fn test_seek_back_after_timeline_swap() {
    let session = MarkdownSession::new();
    let mut sync = HighlightSync::with_timeline(Timeline::new([(0.0, 0.0), (1.0, 100.0)]));
    assert_eq!(sync.sync(&session, 150.0), Some(2));

    sync.set_timeline(Some(Timeline::new([(0.0, 200.0)])));
    assert_eq!(sync.sync(&session, 150.0), Some(0));
    assert_eq!(session.highlight_position(), 0);

    sync.set_timeline(None);
    assert_eq!(sync.sync(&session, 999.0), None);
    assert_eq!(session.highlight_position(), 0);
}

#[test]
fn test_malformed_json_entries_filtered() {
    let timeline =
        Timeline::from_json(r#"{"0": 10, "-1": 5, "1.5": 7, "two": 8, "2": "late", "3": 40}"#)
            .unwrap();
    let indices: Vec<usize> = timeline.entries().iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![0, 3]);
    assert_eq!(timeline.resolve(40.0), 4);
}
