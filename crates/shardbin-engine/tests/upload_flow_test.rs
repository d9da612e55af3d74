//! End-to-end lifecycle tests for the upload coordinator, running against
//! the in-memory staging store, catalog, and blob backend.

use bytes::Bytes;
use shardbin_core::{StorageBackend, UploadError};
use shardbin_engine::{NewSessionParams, UploadCoordinator, UploadLimits};
use shardbin_staging::{keys, Catalog, MemoryCatalog, MemoryStagingStore, StagingStore};
use shardbin_storage::{BackendSet, BlobStore, BotRelay};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

struct Fixture {
    staging: Arc<MemoryStagingStore>,
    catalog: Arc<MemoryCatalog>,
    blob: BlobStore,
    coordinator: UploadCoordinator,
}

fn limits() -> UploadLimits {
    UploadLimits {
        max_file_size_bytes: 10_000,
        chunk_size_bytes: 4,
        max_chunk_count: 100,
        staging_ttl: Duration::from_secs(60),
        default_backend: StorageBackend::Blob,
    }
}

fn fixture() -> Fixture {
    fixture_with_backends(|blob| BackendSet::new().with_blob(blob))
}

fn fixture_with_backends(backends: impl FnOnce(BlobStore) -> BackendSet) -> Fixture {
    let staging = Arc::new(MemoryStagingStore::new());
    let catalog = Arc::new(MemoryCatalog::new());
    let blob = BlobStore::in_memory();
    let coordinator = UploadCoordinator::new(
        staging.clone(),
        catalog.clone(),
        backends(blob.clone()),
        limits(),
    );
    Fixture {
        staging,
        catalog,
        blob,
        coordinator,
    }
}

fn params(total_chunks: u32) -> NewSessionParams {
    NewSessionParams {
        file_name: "report.pdf".to_string(),
        file_size: 12,
        content_type: "application/pdf".to_string(),
        total_chunks,
        backend_choice: None,
    }
}

#[tokio::test]
async fn test_full_upload_lifecycle() {
    let f = fixture();
    let session = f.coordinator.create_session(params(3)).await.unwrap();
    let id = session.session_id;

    // out of order on purpose
    f.coordinator
        .ingest_chunk(id, 2, Bytes::from_static(b"ghij"))
        .await
        .unwrap();
    f.coordinator
        .ingest_chunk(id, 0, Bytes::from_static(b"abcd"))
        .await
        .unwrap();
    let progress = f
        .coordinator
        .ingest_chunk(id, 1, Bytes::from_static(b"ef"))
        .await
        .unwrap();
    assert!(progress.complete);
    assert_eq!(progress.uploaded_chunks, 3);

    let completed = f.coordinator.complete_upload(id).await.unwrap();
    assert_eq!(completed.backend, StorageBackend::Blob);
    assert_eq!(completed.total_chunks, 3);
    assert_eq!(completed.file_size, 12);

    // bytes landed in ascending index order
    let object_key = completed.blob_key.as_deref().unwrap();
    let stored = f.blob.download(object_key).await.unwrap();
    assert_eq!(&stored[..], b"abcdefghij");

    // exactly one catalog record, keyed by the committed file key
    let record = f
        .catalog
        .get(&completed.file_key)
        .await
        .unwrap()
        .expect("catalog record written");
    assert_eq!(record.file_name, "report.pdf");
    assert_eq!(record.storage_backend, StorageBackend::Blob);
    assert!(record.chunked);
    assert_eq!(record.total_chunks, Some(3));
    assert_eq!(f.catalog.len(), 1);

    // staging fully purged
    assert!(f.staging.is_empty());

    // and the session is gone
    let err = f.coordinator.get_session(id).await.unwrap_err();
    assert!(matches!(err, UploadError::SessionNotFound(_)));
}

#[tokio::test]
async fn test_duplicate_chunk_is_acknowledged_not_reapplied() {
    let f = fixture();
    let session = f.coordinator.create_session(params(2)).await.unwrap();
    let id = session.session_id;

    let first = f
        .coordinator
        .ingest_chunk(id, 0, Bytes::from_static(b"aa"))
        .await
        .unwrap();
    assert!(first.newly_recorded);
    assert_eq!(first.uploaded_chunks, 1);

    // retry with different bytes: acknowledged, stored bytes untouched
    let retry = f
        .coordinator
        .ingest_chunk(id, 0, Bytes::from_static(b"zz"))
        .await
        .unwrap();
    assert!(!retry.newly_recorded);
    assert_eq!(retry.uploaded_chunks, 1);

    f.coordinator
        .ingest_chunk(id, 1, Bytes::from_static(b"bb"))
        .await
        .unwrap();
    let completed = f.coordinator.complete_upload(id).await.unwrap();
    let stored = f
        .blob
        .download(completed.blob_key.as_deref().unwrap())
        .await
        .unwrap();
    assert_eq!(&stored[..], b"aabb");
}

#[tokio::test]
async fn test_incomplete_completion_reports_exact_missing_chunks() {
    let f = fixture();
    let session = f.coordinator.create_session(params(4)).await.unwrap();
    let id = session.session_id;

    f.coordinator
        .ingest_chunk(id, 1, Bytes::from_static(b"b"))
        .await
        .unwrap();
    f.coordinator
        .ingest_chunk(id, 3, Bytes::from_static(b"d"))
        .await
        .unwrap();

    let err = f.coordinator.complete_upload(id).await.unwrap_err();
    match err {
        UploadError::IncompleteUpload {
            uploaded,
            total,
            missing,
        } => {
            assert_eq!(uploaded, 2);
            assert_eq!(total, 4);
            assert_eq!(missing, vec![0, 2]);
        }
        other => panic!("expected IncompleteUpload, got {:?}", other),
    }

    // failed completion leaves the session usable; filling the gaps works
    f.coordinator
        .ingest_chunk(id, 0, Bytes::from_static(b"a"))
        .await
        .unwrap();
    f.coordinator
        .ingest_chunk(id, 2, Bytes::from_static(b"c"))
        .await
        .unwrap();
    let completed = f.coordinator.complete_upload(id).await.unwrap();
    let stored = f
        .blob
        .download(completed.blob_key.as_deref().unwrap())
        .await
        .unwrap();
    assert_eq!(&stored[..], b"abcd");
}

#[tokio::test]
async fn test_evicted_chunk_blob_fails_completion_as_chunk_lost() {
    let f = fixture();
    let session = f.coordinator.create_session(params(3)).await.unwrap();
    let id = session.session_id;

    for (i, body) in [&b"aa"[..], b"bb", b"cc"].iter().enumerate() {
        f.coordinator
            .ingest_chunk(id, i as u32, Bytes::copy_from_slice(body))
            .await
            .unwrap();
    }

    // staging dropped a blob the session record still claims
    f.staging.delete(&keys::chunk_key(id, 1)).await.unwrap();

    let err = f.coordinator.complete_upload(id).await.unwrap_err();
    assert!(matches!(err, UploadError::ChunkLost { index: 1 }));

    // nothing committed for a session that cannot reassemble
    assert_eq!(f.catalog.len(), 0);
}

#[tokio::test]
async fn test_out_of_range_chunk_index_rejected() {
    let f = fixture();
    let session = f.coordinator.create_session(params(3)).await.unwrap();
    let err = f
        .coordinator
        .ingest_chunk(session.session_id, 3, Bytes::from_static(b"x"))
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_empty_chunk_body_rejected() {
    let f = fixture();
    let session = f.coordinator.create_session(params(1)).await.unwrap();
    let err = f
        .coordinator
        .ingest_chunk(session.session_id, 0, Bytes::new())
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_unknown_session_rejected_everywhere() {
    let f = fixture();
    let id = Uuid::new_v4();
    assert!(matches!(
        f.coordinator.get_session(id).await.unwrap_err(),
        UploadError::SessionNotFound(_)
    ));
    assert!(matches!(
        f.coordinator
            .ingest_chunk(id, 0, Bytes::from_static(b"x"))
            .await
            .unwrap_err(),
        UploadError::SessionNotFound(_)
    ));
    assert!(matches!(
        f.coordinator.complete_upload(id).await.unwrap_err(),
        UploadError::SessionNotFound(_)
    ));
}

#[tokio::test]
async fn test_session_validation() {
    let f = fixture();

    let mut p = params(2);
    p.file_size = 10_001;
    assert!(matches!(
        f.coordinator.create_session(p).await.unwrap_err(),
        UploadError::FileTooLarge { max: 10_000, .. }
    ));

    let mut p = params(2);
    p.file_name = "  ".to_string();
    assert!(matches!(
        f.coordinator.create_session(p).await.unwrap_err(),
        UploadError::InvalidRequest(_)
    ));

    let p = params(0);
    assert!(matches!(
        f.coordinator.create_session(p).await.unwrap_err(),
        UploadError::InvalidRequest(_)
    ));

    let p = params(101);
    assert!(matches!(
        f.coordinator.create_session(p).await.unwrap_err(),
        UploadError::InvalidRequest(_)
    ));
}

#[tokio::test]
async fn test_unrecognized_backend_choice_falls_back_to_default() {
    let f = fixture();
    let mut p = params(1);
    p.backend_choice = Some("ftp".to_string());
    let session = f.coordinator.create_session(p).await.unwrap();
    assert_eq!(session.backend, StorageBackend::Blob);
}

#[tokio::test]
async fn test_explicit_backend_choice_overrides_default() {
    let f = fixture();
    let mut p = params(1);
    p.backend_choice = Some("relay".to_string());
    let session = f.coordinator.create_session(p).await.unwrap();
    assert_eq!(session.backend, StorageBackend::Relay);
}

#[tokio::test]
async fn test_backend_failure_leaves_staging_intact() {
    // relay pointed at an unroutable local port: commit fails fast with a
    // transport error, which must surface as retryable BackendUnavailable
    let relay = BotRelay::new(
        "test-token".to_string(),
        "42".to_string(),
        "http://127.0.0.1:9".to_string(),
        Duration::from_secs(2),
    )
    .unwrap();
    let f = fixture_with_backends(|blob| BackendSet::new().with_blob(blob).with_relay(relay));

    let mut p = params(2);
    p.backend_choice = Some("relay".to_string());
    let session = f.coordinator.create_session(p).await.unwrap();
    let id = session.session_id;

    f.coordinator
        .ingest_chunk(id, 0, Bytes::from_static(b"aa"))
        .await
        .unwrap();
    f.coordinator
        .ingest_chunk(id, 1, Bytes::from_static(b"bb"))
        .await
        .unwrap();

    let err = f.coordinator.complete_upload(id).await.unwrap_err();
    assert!(matches!(err, UploadError::BackendUnavailable(_)));

    // nothing committed, nothing purged: the client can retry completion
    assert_eq!(f.catalog.len(), 0);
    let session = f.coordinator.get_session(id).await.unwrap();
    assert_eq!(session.uploaded_chunks, vec![0, 1]);
}

#[tokio::test]
async fn test_unconfigured_backend_fails_completion() {
    // blob-only deployment, relay session
    let f = fixture();
    let mut p = params(1);
    p.backend_choice = Some("relay".to_string());
    let session = f.coordinator.create_session(p).await.unwrap();
    f.coordinator
        .ingest_chunk(session.session_id, 0, Bytes::from_static(b"x"))
        .await
        .unwrap();
    let err = f
        .coordinator
        .complete_upload(session.session_id)
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::BackendUnavailable(_)));
}

#[tokio::test]
async fn test_concurrent_ingestion_loses_no_indices() {
    let f = Arc::new(fixture());
    let mut p = params(32);
    p.file_size = 64;
    let session = f.coordinator.create_session(p).await.unwrap();
    let id = session.session_id;

    let tasks: Vec<_> = (0..32u32)
        .map(|i| {
            let f = f.clone();
            tokio::spawn(async move {
                f.coordinator
                    .ingest_chunk(id, i, Bytes::from(vec![i as u8; 2]))
                    .await
                    .unwrap();
            })
        })
        .collect();
    futures::future::join_all(tasks).await;

    let session = f.coordinator.get_session(id).await.unwrap();
    assert!(session.is_complete());
    assert_eq!(session.uploaded_chunks, (0..32).collect::<Vec<u32>>());

    let completed = f.coordinator.complete_upload(id).await.unwrap();
    let stored = f
        .blob
        .download(completed.blob_key.as_deref().unwrap())
        .await
        .unwrap();
    let expected: Vec<u8> = (0..32u32).flat_map(|i| [i as u8, i as u8]).collect();
    assert_eq!(&stored[..], &expected[..]);
}

#[tokio::test]
async fn test_session_progress_reporting() {
    let f = fixture();
    let session = f.coordinator.create_session(params(4)).await.unwrap();
    let id = session.session_id;
    assert_eq!(session.progress_percent(), 0.0);

    f.coordinator
        .ingest_chunk(id, 0, Bytes::from_static(b"a"))
        .await
        .unwrap();
    let progress = f
        .coordinator
        .ingest_chunk(id, 1, Bytes::from_static(b"b"))
        .await
        .unwrap();
    assert_eq!(progress.progress_percent, 50.0);
    assert!(!progress.complete);

    let fetched = f.coordinator.get_session(id).await.unwrap();
    assert_eq!(fetched.uploaded_chunks, vec![0, 1]);
    assert_eq!(fetched.missing_chunks(), vec![2, 3]);
}
