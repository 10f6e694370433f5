use super::*;
use async_trait::async_trait;

/// Test cleaner scripted by record body: `fail` errors, `absent` yields no
/// content, `panic` panics, anything else echoes the body as cleaned text.
struct ScriptedCleaner;

#[async_trait]
impl Clean for ScriptedCleaner {
    async fn clean(&self, record: ArchiveRecord) -> CleanOutcome {
        let uri = record.target_uri().to_string();
        let body = String::from_utf8_lossy(&record.body).to_string();
        match body.as_str() {
            "fail" => Err(CleanError::Parse {
                uri,
                reason: "scripted failure".to_string(),
            }),
            "absent" => Ok(None),
            "panic" => panic!("scripted panic"),
            _ => Ok(Some(CleanedRecord {
                uri,
                cleaned_text: body,
            })),
        }
    }
}

fn dispatcher(capacity: usize) -> (Dispatcher, broadcast::Receiver<Event>) {
    let (tx, rx) = broadcast::channel(capacity);
    (Dispatcher::new(4, tx), rx)
}

fn record(uri: &str, body: &str) -> ArchiveRecord {
    ArchiveRecord::response(uri, body.as_bytes().to_vec())
}

#[tokio::test]
async fn collects_all_successful_records() {
    let (dispatcher, _rx) = dispatcher(16);
    let records = vec![
        record("https://a.example/", "alpha"),
        record("https://b.example/", "beta"),
        record("https://c.example/", "gamma"),
    ];

    let outcome = dispatcher.run(records, Arc::new(ScriptedCleaner)).await;

    assert_eq!(outcome.cleaned, 3);
    assert_eq!(outcome.absent, 0);
    assert_eq!(outcome.failed, 0);

    // Completion order is unspecified; compare as a set.
    let mut texts: Vec<_> = outcome
        .records
        .iter()
        .map(|r| r.cleaned_text.as_str())
        .collect();
    texts.sort_unstable();
    assert_eq!(texts, vec!["alpha", "beta", "gamma"]);
}

#[tokio::test]
async fn one_failing_record_never_aborts_the_batch() {
    // Fault isolation must hold no matter which position fails.
    for k in 0..5 {
        let (dispatcher, _rx) = dispatcher(16);
        let records: Vec<_> = (0..5)
            .map(|i| {
                let body = if i == k { "fail" } else { "ok" };
                record(&format!("https://ex.com/{i}"), body)
            })
            .collect();

        let outcome = dispatcher.run(records, Arc::new(ScriptedCleaner)).await;

        assert_eq!(outcome.cleaned, 4, "failing position {k}");
        assert_eq!(outcome.failed, 1, "failing position {k}");
        assert_eq!(outcome.records.len(), 4);
    }
}

#[tokio::test]
async fn a_panicking_unit_is_contained() {
    let (dispatcher, _rx) = dispatcher(16);
    let records = vec![
        record("https://a.example/", "alpha"),
        record("https://b.example/", "panic"),
        record("https://c.example/", "gamma"),
    ];

    let outcome = dispatcher.run(records, Arc::new(ScriptedCleaner)).await;

    assert_eq!(outcome.cleaned, 2);
    assert_eq!(outcome.failed, 1);
}

#[tokio::test]
async fn absent_records_are_tallied_not_collected() {
    let (dispatcher, _rx) = dispatcher(16);
    let records = vec![
        record("https://a.example/", "alpha"),
        record("https://b.example/", "absent"),
    ];

    let outcome = dispatcher.run(records, Arc::new(ScriptedCleaner)).await;

    assert_eq!(outcome.cleaned, 1);
    assert_eq!(outcome.absent, 1);
    assert_eq!(outcome.records.len(), 1);
}

#[tokio::test]
async fn emits_cleaned_and_failed_events() {
    let (dispatcher, mut rx) = dispatcher(16);
    let records = vec![
        record("https://a.example/", "alpha"),
        record("https://b.example/", "fail"),
    ];

    dispatcher.run(records, Arc::new(ScriptedCleaner)).await;

    let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
    assert_eq!(events.len(), 2);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::RecordCleaned { uri } if uri == "https://a.example/"
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        Event::RecordFailed { uri, .. } if uri == "https://b.example/"
    )));
}

#[tokio::test]
async fn cancelled_token_stops_submission() {
    let (dispatcher, _rx) = dispatcher(16);
    dispatcher.cancellation_token().cancel();

    let records = vec![
        record("https://a.example/", "alpha"),
        record("https://b.example/", "beta"),
    ];
    let outcome = dispatcher.run(records, Arc::new(ScriptedCleaner)).await;

    assert_eq!(outcome.cleaned, 0);
    assert!(outcome.records.is_empty());
}

#[tokio::test]
async fn empty_input_completes_immediately() {
    let (dispatcher, _rx) = dispatcher(16);
    let outcome = dispatcher
        .run(Vec::<ArchiveRecord>::new(), Arc::new(ScriptedCleaner))
        .await;

    assert_eq!(outcome.cleaned, 0);
    assert_eq!(outcome.absent, 0);
    assert_eq!(outcome.failed, 0);
}
