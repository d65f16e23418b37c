// Event log under one notifier thread and several readers

use poolwatch::core::event_log::{EventLog, Notification};
use poolwatch::core::severity::{Severity, SeverityClassMap};
use std::sync::Arc;
use std::thread;

#[test]
fn test_concurrent_appends_and_snapshots_stay_ordered() {
    const CAPACITY: usize = 64;
    const MESSAGES: usize = 2000;

    let log = Arc::new(EventLog::new(CAPACITY, SeverityClassMap::default()));

    let writer = {
        let log = Arc::clone(&log);
        thread::spawn(move || {
            for i in 0..MESSAGES {
                log.append(Notification::message(Severity::Info, i.to_string()));
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                for _ in 0..500 {
                    let seq: Vec<usize> = log
                        .snapshot()
                        .iter()
                        .map(|e| e.text.parse().unwrap())
                        .collect();
                    assert!(seq.len() <= CAPACITY);
                    // arrival order, no gaps, no duplicates
                    for pair in seq.windows(2) {
                        assert_eq!(pair[0] + 1, pair[1]);
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    let last: Vec<String> = log.snapshot().into_iter().map(|e| e.text).collect();
    let expected: Vec<String> = (MESSAGES - CAPACITY..MESSAGES)
        .map(|i| i.to_string())
        .collect();
    assert_eq!(last, expected);
}

#[test]
fn test_message_attachment_sequence() {
    let log = EventLog::new(10, SeverityClassMap::default());
    log.append(Notification::message(Severity::Warning, "pool tank is DEGRADED"));
    log.append(Notification::attachment(
        Severity::Warning,
        "  pool: tank\n state: DEGRADED",
    ));
    log.append(Notification::message(Severity::Info, "scrub finished"));
    log.append(Notification::attachment(Severity::Info, "scan: scrub repaired 0B"));
    log.append(Notification::attachment(Severity::Info, "extra"));

    let entries = log.snapshot();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].text, "pool tank is DEGRADED");
    assert_eq!(entries[0].attachment, "  pool: tank\n state: DEGRADED");
    assert_eq!(entries[1].text, "scrub finished");
    assert_eq!(entries[1].attachment, "scan: scrub repaired 0B");
    assert_eq!(entries[2].text, "");
    assert_eq!(entries[2].attachment, "extra");
}
