use packetguardian::config::DetectionConfig;
use packetguardian::detect::{self, AlertReason};
use packetguardian::flow::{self, FlowKey};
use packetguardian::ingest;

fn config(threshold: u64, run: usize) -> DetectionConfig {
    DetectionConfig {
        byte_threshold: threshold,
        increasing_run_length: run,
        ..DetectionConfig::default()
    }
}

fn bracketed(src: &str, dst: &str, sizes: &[u64]) -> String {
    sizes
        .iter()
        .enumerate()
        .map(|(i, size)| {
            format!(
                "[2025-11-04 09:00:{:02}] SRC={} DST={} PROTO=HTTP SIZE={}",
                i, src, dst, size
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_end_to_end_increasing_run() {
    let text = bracketed(
        "192.168.10.22",
        "104.27.122.12",
        &[512, 525, 540, 560, 1200, 1300, 1500, 1900, 2000],
    );
    let alerts = packetguardian::run(&text, &config(1_000_000, 3)).unwrap();

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].source, "192.168.10.22");
    assert_eq!(alerts[0].destination, "104.27.122.12");
    assert_eq!(alerts[0].total_bytes, 9937);
    assert_eq!(alerts[0].reason, AlertReason::IncreasingRun { run_length: 3 });
}

#[test]
fn test_stages_compose_like_run() {
    let text = packetguardian::SAMPLE_LOG;
    let cfg = DetectionConfig::default();

    let staged = detect::detect(&flow::aggregate(ingest::parse(text)), &cfg).unwrap();
    assert_eq!(staged, packetguardian::run(text, &cfg).unwrap());
}

#[test]
fn test_threshold_boundary_end_to_end() {
    let text = "a,b,400\na,b,600";
    let hit = packetguardian::run(text, &config(1000, 3)).unwrap();
    assert_eq!(hit.len(), 1);
    assert_eq!(
        hit[0].reason,
        AlertReason::ByteThresholdExceeded { threshold: 1000 }
    );

    let miss = packetguardian::run(text, &config(1001, 3)).unwrap();
    assert!(miss.is_empty());
}

#[test]
fn test_one_alert_when_both_rules_match() {
    let text = bracketed("a", "b", &[100, 200, 300]);
    let alerts = packetguardian::run(&text, &config(600, 3)).unwrap();
    assert_eq!(alerts.len(), 1);
    assert!(matches!(
        alerts[0].reason,
        AlertReason::ByteThresholdExceeded { .. }
    ));
}

#[test]
fn test_reverse_direction_is_separate_flow() {
    let text = "SRC=a DST=b SIZE=1\nSRC=b DST=a SIZE=2\nSRC=a DST=b SIZE=3";
    let flows = flow::aggregate(ingest::parse(text));
    assert_eq!(flows.len(), 2);
    assert_eq!(flows[&FlowKey::new("a", "b")].sizes(), &[1, 3]);
    assert_eq!(flows[&FlowKey::new("b", "a")].sizes(), &[2]);

    // Neither direction alone has three increasing sizes.
    assert!(packetguardian::run(text, &config(1_000_000, 3))
        .unwrap()
        .is_empty());
}

#[test]
fn test_mixed_formats_feed_one_flow() {
    let text = "\
[t] SRC=h1 DST=h2 PROTO=TCP SIZE=10
h1,h2,20
junk line
SIZE=30 DST=h2 SRC=h1";
    let records = ingest::parse(text);
    assert_eq!(records.len(), 3);

    let flows = flow::aggregate_at(records, 100.0);
    let flow = &flows[&FlowKey::new("h1", "h2")];
    assert_eq!(flow.sizes(), &[10, 20, 30]);
    assert_eq!(flow.timestamps(), &[100.0, 101.0, 102.0]);
}
