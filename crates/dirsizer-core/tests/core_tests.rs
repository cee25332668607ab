use dirsizer_core::{
    CollectPolicy, EntryFailure, ErrorPolicy, FailureKind, FileEntry, GatherReport, IgnorePolicy,
    InodeInfo, LogPolicy, NoProgress, ProgressCounter, ProgressSink, RootOutcome, SizeError,
    SizeReport, SizerConfig,
};
use std::io;
use std::time::Duration;

fn report(total_bytes: u64) -> SizeReport {
    SizeReport {
        root: "/r".into(),
        total_bytes,
        files: 2,
        directories: 1,
        failures: 0,
        reparse_points_skipped: 0,
        cancelled_subtrees: 0,
        elapsed: Duration::from_millis(3),
    }
}

#[test]
fn test_entry_failure_from_io() {
    let err = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
    let failure = EntryFailure::from_io("/locked", &err);

    assert_eq!(failure.kind, FailureKind::AccessDenied);
    assert_eq!(failure.path, std::path::PathBuf::from("/locked"));
    assert!(failure.message.contains("nope"));
}

#[test]
fn test_file_entry_inode() {
    let plain = FileEntry::new("/f", 10);
    assert!(plain.inode.is_none());

    let linked = FileEntry::new("/g", 10).with_inode(InodeInfo::new(1, 2));
    assert_eq!(linked.inode, Some(InodeInfo::new(1, 2)));
}

#[test]
fn test_policies_as_trait_objects() {
    let collector = CollectPolicy::new();
    let policies: Vec<&dyn ErrorPolicy> = vec![&IgnorePolicy, &LogPolicy, &collector];

    let failure = EntryFailure::new("/x", FailureKind::Other, "weird");
    for policy in policies {
        policy.handle(&failure);
    }

    assert_eq!(collector.snapshot(), vec![failure]);
}

#[test]
fn test_progress_sinks_as_trait_objects() {
    let counter = ProgressCounter::new();
    let sinks: Vec<&dyn ProgressSink> = vec![&NoProgress, &counter];

    for sink in sinks {
        sink.report(64);
    }

    assert_eq!(counter.bytes(), 64);
}

#[test]
fn test_size_report_serializes() {
    let json = serde_json::to_value(report(42)).unwrap();
    assert_eq!(json["total_bytes"], 42);
    assert_eq!(json["root"], "/r");
}

#[test]
fn test_config_roundtrip_through_json() {
    let config = SizerConfig::builder().threads(8usize).build().unwrap();
    let json = serde_json::to_string(&config).unwrap();
    let back: SizerConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_gather_report_empty() {
    let gather = GatherReport::default();
    assert_eq!(gather.total_bytes(), 0);
    assert!(!gather.has_failures());
    assert_eq!(gather.into_result().unwrap(), 0);
}

#[test]
fn test_root_outcome_failed_contributes_zero() {
    let failed = RootOutcome {
        path: "/gone".into(),
        result: Err(SizeError::not_found("/gone")),
    };
    let ok = RootOutcome {
        path: "/r".into(),
        result: Ok(report(9)),
    };

    assert_eq!(failed.total_bytes(), 0);
    assert_eq!(ok.total_bytes(), 9);
}
