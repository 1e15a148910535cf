#![cfg(feature = "tracing")]

use handover::CoupledList;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Metadata, Subscriber};

/// Keeps the level and message of every event it sees.
#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

struct Message(String);

impl Visit for Message {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl Subscriber for Recorder {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _: &Id, _: &Record<'_>) {}

    fn record_follows_from(&self, _: &Id, _: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let mut message = Message(String::new());
        event.record(&mut message);
        self.events
            .lock()
            .unwrap()
            .push((*event.metadata().level(), message.0));
    }

    fn enter(&self, _: &Id) {}

    fn exit(&self, _: &Id) {}
}

#[test]
fn test_removal_emits_events() {
    let recorder = Recorder::default();
    let list: CoupledList<u32> = (0..6).collect();

    let removed = tracing::subscriber::with_default(recorder.clone(), || {
        list.remove_if(|&x| x % 2 == 0)
    });
    assert_eq!(removed, 3);

    let events = recorder.events.lock().unwrap();
    let unlinks = events
        .iter()
        .filter(|(level, msg)| *level == Level::TRACE && msg == "unlinked list node")
        .count();
    assert_eq!(unlinks, 3);
    assert_eq!(
        events.last(),
        Some(&(Level::DEBUG, String::from("remove pass finished")))
    );
}

#[test]
fn test_reads_are_silent() {
    let recorder = Recorder::default();
    let list: CoupledList<u32> = (0..4).collect();

    tracing::subscriber::with_default(recorder.clone(), || {
        list.for_each(|_| {});
        assert_eq!(list.find_first_of(|&x| x == 2), Some(2));
        list.try_push_front(9).unwrap();
    });

    assert!(recorder.events.lock().unwrap().is_empty());
}
