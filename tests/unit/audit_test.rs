//! Tests for pipeline event sinks

use emote_batch::core::{EventKind, EventSink, InMemoryEventSink, PipelineEvent, TracingEventSink};

#[test]
fn test_in_memory_event_sink() {
    let sink = InMemoryEventSink::new(10);

    sink.record(PipelineEvent::now(0, EventKind::Admitted));
    sink.record(PipelineEvent::now(0, EventKind::Started));
    assert_eq!(sink.events().len(), 2);

    let events = sink.events();
    assert_eq!(events[0].index, 0);
    assert_eq!(events[0].kind, EventKind::Admitted);
    assert_eq!(events[1].kind, EventKind::Started);
}

#[test]
fn test_event_sink_overflow() {
    let sink = InMemoryEventSink::new(2);

    sink.record(PipelineEvent::now(1, EventKind::Admitted));
    sink.record(PipelineEvent::now(2, EventKind::Admitted));
    sink.record(PipelineEvent::now(3, EventKind::Admitted));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].index, 2); // First one popped
    assert_eq!(events[1].index, 3);
}

#[test]
fn test_clones_share_buffer() {
    let sink = InMemoryEventSink::new(8);
    let handle = sink.clone();

    handle.record(PipelineEvent::now(4, EventKind::Finished));

    assert_eq!(sink.times_of(EventKind::Finished).len(), 1);
    assert!(sink.times_of(EventKind::Started).is_empty());
}

#[test]
fn test_tracing_sink_accepts_events() {
    let sink: Box<dyn EventSink> = Box::new(TracingEventSink);
    sink.record(PipelineEvent::now(0, EventKind::Started));
}
