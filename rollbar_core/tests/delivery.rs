//! Integration tests for the delivery queue, worker and drain barrier.

mod common;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use common::{options, Failing, Gate, Recorder};
use rollbar_core::{Client, Level};

#[test]
fn reports_are_delivered_in_acceptance_order() {
    let recorder = Recorder::default();
    let client = Client::with_transport(options(100), recorder.clone()).unwrap();

    for i in 0..50 {
        assert!(client.report_message(Level::Info, &format!("message {i}")));
    }
    client.wait_until_drained();

    let expected: Vec<String> = (0..50).map(|i| format!("message {i}")).collect();
    assert_eq!(recorder.titles(), expected);
    assert_eq!(client.pending(), 0);
}

#[test]
fn full_queue_rejects_without_blocking_or_counting() {
    let recorder = Recorder::default();
    let (gate, entered, release) = Gate::new(recorder.clone());
    let client = Client::with_transport(options(2), gate).unwrap();

    /*
     * Park the worker inside its first POST so the queue itself is empty
     * and can be filled to exactly its capacity.
     */
    assert!(client.report_message(Level::Info, "in flight"));
    entered.recv_timeout(Duration::from_secs(5)).expect("worker should start delivering");

    assert!(client.report_message(Level::Info, "queued 1"));
    assert!(client.report_message(Level::Info, "queued 2"));
    assert_eq!(client.pending(), 3);

    let started = Instant::now();
    assert!(!client.report_message(Level::Info, "overflow"));
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(client.pending(), 3);

    for _ in 0..3 {
        release.send(()).unwrap();
    }
    client.wait_until_drained();

    assert_eq!(recorder.titles(), vec!["in flight", "queued 1", "queued 2"]);
    assert_eq!(client.pending(), 0);
}

#[test]
fn concurrent_producers_all_drain() {
    let recorder = Recorder::default();
    let client = Arc::new(Client::with_transport(options(1000), recorder.clone()).unwrap());

    let producers: Vec<_> = (0..8)
        .map(|t| {
            let client = client.clone();
            thread::spawn(move || {
                (0..25)
                    .filter(|i| client.report_message(Level::Debug, &format!("{t}-{i}")))
                    .count()
            })
        })
        .collect();
    let accepted: usize = producers.into_iter().map(|h| h.join().unwrap()).sum();

    client.wait_until_drained();
    assert_eq!(accepted, 200);
    assert_eq!(recorder.bodies().len(), 200);
    assert_eq!(client.pending(), 0);
}

#[test]
fn failed_deliveries_still_drain() {
    let failing = Failing::default();
    let client = Client::with_transport(options(10), failing.clone()).unwrap();

    for i in 0..5 {
        assert!(client.report_error(Level::Error, format!("failure {i}")));
    }
    client.wait_until_drained();

    assert_eq!(*failing.attempts.lock().unwrap(), 5);
    assert_eq!(client.pending(), 0);
}

#[test]
fn panicking_transport_does_not_stop_the_worker() {
    let failing = Failing {
        panic: true,
        ..Default::default()
    };
    let client = Client::with_transport(options(10), failing.clone()).unwrap();

    assert!(client.report_message(Level::Warning, "first"));
    assert!(client.report_message(Level::Warning, "second"));
    client.wait_until_drained();

    assert_eq!(*failing.attempts.lock().unwrap(), 2);
    assert_eq!(client.pending(), 0);
}

#[test]
fn missing_access_token_discards_without_posting() {
    let recorder = Recorder::default();
    let client = Client::with_transport(
        rollbar_core::Options {
            access_token: String::new(),
            ..options(10)
        },
        recorder.clone(),
    )
    .unwrap();

    assert!(client.report_message(Level::Info, "nobody will see this"));
    client.wait_until_drained();

    assert!(recorder.bodies().is_empty());
    assert_eq!(client.pending(), 0);
}

#[test]
fn message_report_end_to_end() {
    let recorder = Recorder::default();
    let client = Client::with_transport(options(10), recorder.clone()).unwrap();

    assert!(client.report_message(Level::Info, "hello\nworld"));
    client.wait_until_drained();

    let bodies = recorder.bodies();
    assert_eq!(bodies.len(), 1);
    let raw = String::from_utf8(bodies[0].clone()).unwrap();
    assert!(raw.contains(r#""level":"info""#), "got {raw}");

    let json = &recorder.json()[0];
    assert_eq!(json["access_token"], "test-token");
    assert_eq!(json["data"]["environment"], "test");
    assert_eq!(json["data"]["title"], "hello");
    assert_eq!(json["data"]["body"]["message"]["body"], "hello\nworld");
    assert_eq!(json["data"]["language"], "rust");
    assert!(json["data"].get("fingerprint").is_none());
}

#[test]
fn error_report_stack_starts_at_reporting_function() {
    let recorder = Recorder::default();
    let client = Client::with_transport(options(10), recorder.clone()).unwrap();

    assert!(client.report_error(Level::Critical, "boom\nsecond line"));
    client.wait_until_drained();

    let json = &recorder.json()[0];
    let data = &json["data"];
    assert_eq!(data["title"], "boom");
    assert_eq!(data["level"], "critical");
    assert_eq!(data["body"]["trace"]["exception"]["message"], "boom\nsecond line");
    assert!(data["body"]["trace"]["exception"]["class"]
        .as_str()
        .unwrap()
        .starts_with('{'));
    assert_eq!(data["fingerprint"].as_str().unwrap().len(), 8);

    let first = data["body"]["trace"]["frames"][0]["method"].as_str().unwrap();
    assert!(first.ends_with("error_report_stack_starts_at_reporting_function"), "got {first}");
}

#[inline(never)]
fn report_from_helper(client: &Client) {
    // Not in tail position, so the helper keeps its own frame.
    let queued = client.report_error_with_skip(Level::Error, "from helper", 1);
    assert!(queued);
}

#[test]
fn skip_hides_reporting_helpers() {
    let recorder = Recorder::default();
    let client = Client::with_transport(options(10), recorder.clone()).unwrap();

    report_from_helper(&client);
    client.wait_until_drained();

    let json = &recorder.json()[0];
    let first = json["data"]["body"]["trace"]["frames"][0]["method"].as_str().unwrap();
    assert!(first.ends_with("skip_hides_reporting_helpers"), "got {first}");
}

#[test]
fn same_call_site_groups_under_one_fingerprint() {
    let recorder = Recorder::default();
    let client = Client::with_transport(options(10), recorder.clone()).unwrap();

    for _ in 0..2 {
        assert!(client.report_error(Level::Error, "same place"));
    }
    client.wait_until_drained();

    let json = recorder.json();
    assert_eq!(json[0]["data"]["fingerprint"], json[1]["data"]["fingerprint"]);
}
