//! Contract Test: Instruction Dispatch
//!
//! Constraints verified:
//! - Instructions run in input order, each routed by its command
//! - A missing zone or failed operation marks the run, but the run continues
//! - PTR commands, unknown commands and nameless zones never reach the provider
//! - The zone's SOA TTL is the default TTL for its records
//!
//! If this test fails, panel changes are lost or applied to the wrong zone.

mod common;

use common::*;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use zonesync_core::dispatch::{Command, Dispatcher, Instruction, SyncEvent, decode_instructions};
use zonesync_core::record::{DesiredRecord, RecordType, ZoneId};

fn dispatcher(provider: &MockZoneProvider) -> (Dispatcher, mpsc::Receiver<SyncEvent>) {
    Dispatcher::new(Box::new(provider.clone()), &mock_config()).expect("valid config")
}

fn drain(rx: &mut mpsc::Receiver<SyncEvent>) -> Vec<SyncEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn instructions_are_routed_in_order() {
    let provider = MockZoneProvider::new()
        .with_zone("example.com", "7", vec![])
        .with_zone("old.example", "8", vec![]);
    let (dispatcher, mut events) = dispatcher(&provider);

    let instructions = vec![
        Instruction::new(Command::Update, "example.com.")
            .with_records(vec![rr(RecordType::A, "www.example.com.", "192.0.2.1", 300)]),
        Instruction::new(Command::CreatePtrs, "2.0.192.in-addr.arpa."),
        Instruction::new(Command::Unknown("rename".to_string()), "example.com."),
        Instruction::new(Command::Update, ""),
        Instruction::new(Command::Delete, "old.example."),
    ];

    let report = dispatcher.run(instructions).await;

    assert_eq!(report.processed, 5);
    assert!(!report.had_errors);
    assert!(report.finished_at >= report.started_at);

    assert_eq!(
        provider.calls(),
        vec![
            Call::LookupZone("example.com".to_string()),
            Call::ZoneRecords(ZoneId::from("7")),
            Call::Create(
                ZoneId::from("7"),
                zonesync_core::record::NormalizedRecord {
                    record_type: RecordType::A,
                    name: Some("www.example.com".to_string()),
                    priority: None,
                    content: "192.0.2.1".to_string(),
                    ttl: 300,
                }
            ),
            Call::DeleteZone("old.example".to_string()),
        ]
    );
    assert!(!provider.has_zone("old.example"));

    let events = drain(&mut events);
    assert!(events.contains(&SyncEvent::ZoneSynchronized {
        zone: "example.com.".to_string(),
        created: 1,
        updated: 0,
        deleted: 0,
        unchanged: 0,
    }));
    assert!(events.contains(&SyncEvent::ZoneDeleted {
        zone: "old.example.".to_string()
    }));
    assert_eq!(
        events.last(),
        Some(&SyncEvent::RunFinished {
            processed: 5,
            had_errors: false
        })
    );
}

#[tokio::test]
async fn missing_zone_marks_run_and_continues() {
    let provider = MockZoneProvider::new().with_zone("example.com", "7", vec![]);
    let (dispatcher, mut events) = dispatcher(&provider);

    let instructions = vec![
        Instruction::new(Command::Create, "absent.example.")
            .with_records(vec![rr(RecordType::A, "www.absent.example.", "192.0.2.1", 300)]),
        Instruction::new(Command::Update, "example.com.")
            .with_records(vec![rr(RecordType::A, "www.example.com.", "192.0.2.1", 300)]),
    ];

    let report = dispatcher.run(instructions).await;

    assert!(report.had_errors);
    assert_eq!(report.processed, 2);
    assert_eq!(provider.records("7").len(), 1, "second zone still synchronized");

    let events = drain(&mut events);
    assert!(events.contains(&SyncEvent::ZoneNotFound {
        zone: "absent.example.".to_string()
    }));
}

#[tokio::test]
async fn record_failure_marks_run() {
    let provider = MockZoneProvider::new()
        .with_zone("example.com", "7", vec![])
        .failing_content("192.0.2.66");
    let (dispatcher, mut events) = dispatcher(&provider);

    let report = dispatcher
        .run(vec![Instruction::new(Command::Update, "example.com").with_records(vec![
            rr(RecordType::A, "bad.example.com.", "192.0.2.66", 300),
            rr(RecordType::A, "good.example.com.", "192.0.2.1", 300),
        ])])
        .await;

    assert!(report.had_errors);
    assert_eq!(provider.records("7").len(), 1);

    let failed: Vec<_> = drain(&mut events)
        .into_iter()
        .filter(|event| matches!(event, SyncEvent::OperationFailed { .. }))
        .collect();
    assert_eq!(failed.len(), 1);
}

#[tokio::test]
async fn failed_zone_deletion_marks_run() {
    let provider = MockZoneProvider::new()
        .with_zone("example.com", "7", vec![])
        .failing_zone_deletion("example.com");
    let (dispatcher, _events) = dispatcher(&provider);

    let report = dispatcher
        .run(vec![Instruction::new(Command::Delete, "example.com.")])
        .await;

    assert!(report.had_errors);
    assert!(provider.has_zone("example.com"));
}

#[tokio::test]
async fn soa_ttl_is_default_ttl() {
    let provider = MockZoneProvider::new().with_zone("example.com", "7", vec![]);
    let (dispatcher, _events) = dispatcher(&provider);

    let with_soa = Instruction::new(Command::Update, "example.com.")
        .with_soa_ttl(86400)
        .with_records(vec![DesiredRecord::new(RecordType::A, "192.0.2.1").with_host("a.example.com.")]);
    let without_soa = Instruction::new(Command::Update, "example.com.")
        .with_records(vec![DesiredRecord::new(RecordType::A, "192.0.2.2").with_host("b.example.com.")]);

    dispatcher.run(vec![with_soa, without_soa]).await;

    let ttls: Vec<_> = provider
        .records("7")
        .into_iter()
        .map(|record| (record.name, record.ttl))
        .collect();
    assert_eq!(
        ttls,
        vec![
            ("a.example.com".to_string(), 86400),
            ("b.example.com".to_string(), 3600)
        ]
    );
}

#[tokio::test]
async fn zone_without_record_list_is_only_resolved() {
    let provider = MockZoneProvider::new().with_zone(
        "example.com",
        "7",
        vec![existing("1", RecordType::A, "www.example.com", None, "192.0.2.1", 3600)],
    );
    let (dispatcher, _events) = dispatcher(&provider);

    let report = dispatcher
        .run(vec![Instruction::new(Command::Create, "example.com")])
        .await;

    assert!(!report.had_errors);
    assert_eq!(provider.calls(), vec![Call::LookupZone("example.com".to_string())]);
}

#[tokio::test]
async fn decoded_payload_runs_from_stream() {
    let provider = MockZoneProvider::new().with_zone(
        "example.com",
        "7",
        vec![existing("1", RecordType::Mx, "example.com", Some(10), "old.example.com.", 3600)],
    );
    let (dispatcher, _events) = dispatcher(&provider);

    let payload = r#"[
        {"command": "update", "zone": {"name": "example.com.", "soa": {"ttl": 3600},
          "rr": [{"host": "example.com.", "type": "MX", "opt": "10", "value": "mail.example.com."}]}},
        {"command": "deletePTRs", "zone": {"name": "2.0.192.in-addr.arpa."}}
    ]"#;
    let instructions = decode_instructions(payload).expect("valid payload");

    let (tx, rx) = mpsc::channel(4);
    for instruction in instructions {
        tx.send(instruction).await.expect("receiver alive");
    }
    drop(tx);

    let report = dispatcher.run_stream(ReceiverStream::new(rx)).await;

    assert_eq!(report.processed, 2);
    assert!(!report.had_errors);
    assert_eq!(provider.records("7")[0].content, "mail.example.com.");
    assert_eq!(ids(&provider.records("7")), vec!["1"]);
}

#[test]
fn run_is_usable_from_blocking_code() {
    let provider = MockZoneProvider::new().with_zone("example.com", "7", vec![]);
    let (dispatcher, _events) = dispatcher(&provider);

    let report = tokio_test::block_on(dispatcher.run(Vec::new()));

    assert_eq!(report.processed, 0);
    assert!(!report.had_errors);
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn disabled_dispatcher_never_calls_provider() {
    let provider = MockZoneProvider::new().with_zone("example.com", "7", vec![]);
    let config = mock_config().with_enabled(false);
    let (dispatcher, mut events) =
        Dispatcher::new(Box::new(provider.clone()), &config).expect("valid config");

    let report = dispatcher
        .run(vec![
            Instruction::new(Command::Update, "example.com.")
                .with_records(vec![rr(RecordType::A, "www.example.com.", "192.0.2.1", 300)]),
            Instruction::new(Command::Delete, "example.com."),
        ])
        .await;

    assert_eq!(report.processed, 2);
    assert!(!report.had_errors);
    assert!(provider.calls().is_empty());
    assert!(provider.has_zone("example.com"));

    let skipped = drain(&mut events)
        .into_iter()
        .filter(|event| {
            matches!(
                event,
                SyncEvent::InstructionSkipped { reason, .. } if reason == "synchronization disabled"
            )
        })
        .count();
    assert_eq!(skipped, 2);
}
