mod common;

use locus_engine::source::{LocateError, SourceError};
use locus_engine::{
    AttributePredicate, FileSnapshotSource, Locator, LocatorSpec, MemorySnapshotSource,
    ResolverError, SnapshotSource, StrategyId,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn snapshot_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    let json = serde_json::to_string(&common::login_page()).unwrap();
    write!(file, "{}", json).unwrap();
    file
}

#[tokio::test]
async fn test_file_source_reads_snapshot() {
    let file = snapshot_file();
    let mut source = FileSnapshotSource::new(file.path());

    let tree = source.snapshot().await.expect("snapshot should load");

    assert_eq!(tree.len(), 9);
    assert_eq!(tree.url(), "https://example.test/login");
    assert_eq!(tree.root().unwrap().tag(), "div");
}

#[tokio::test]
async fn test_file_source_recaptures_fresh_tree() {
    let file = snapshot_file();
    let mut source = FileSnapshotSource::new(file.path());

    let first = source.snapshot().await.unwrap();
    first.handle().invalidate();
    let second = source.snapshot().await.unwrap();

    assert!(first.root().is_err());
    assert!(second.root().is_ok());
}

#[tokio::test]
async fn test_file_source_missing_file() {
    let mut source = FileSnapshotSource::new("/nonexistent/snapshot.json");
    let result = source.snapshot().await;
    assert!(matches!(result, Err(SourceError::Io(_))));
}

#[tokio::test]
async fn test_file_source_bad_json() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{\"root\": [").unwrap();

    let mut source = FileSnapshotSource::new(file.path());
    let result = source.snapshot().await;
    assert!(matches!(result, Err(SourceError::Parse(_))));
}

#[tokio::test]
async fn test_locate_returns_node_with_its_tree() {
    let mut source = MemorySnapshotSource::new(common::login_page());
    let spec = LocatorSpec::new("input", AttributePredicate::equals("data-testid", "signup-email"));

    let located = Locator::default()
        .locate(&mut source, &spec)
        .await
        .expect("should locate");

    assert_eq!(located.resolved.strategy, StrategyId::TestAttribute);
    let node = located.tree.node(located.resolved.node).unwrap();
    assert_eq!(node.attribute("name"), Some("email"));
}

#[tokio::test]
async fn test_locate_reports_resolution_failure() {
    let mut source = MemorySnapshotSource::new(common::login_page());
    let spec = LocatorSpec::new("button", AttributePredicate::equals("class", "btn"));

    let result = Locator::default().locate(&mut source, &spec).await;

    match result {
        Err(LocateError::Resolve(ResolverError::AmbiguousMatch { count, .. })) => {
            assert_eq!(count, 2)
        }
        other => panic!("expected ambiguous match, got {:?}", other.map(|l| l.resolved)),
    }
}

#[tokio::test]
async fn test_locate_through_trait_object() {
    let mut source: Box<dyn SnapshotSource> = Box::new(MemorySnapshotSource::new(common::login_page()));
    let spec = LocatorSpec::any(AttributePredicate::equals("id", "signup"));

    let located = Locator::default().locate(source.as_mut(), &spec).await.unwrap();

    assert_eq!(located.resolved.node, common::find(&located.tree, "id", "signup"));
}
