//! Recovery from interrupted uploads: durable bytes without a metadata
//! record are an orphan, not data loss. A retried upload detects them,
//! skips the re-upload, and only re-records the metadata.

mod common;

use common::{harness, harness_with_limits, pdf_bytes, pdf_upload};
use folio_core::{Digest, DocumentView, Error, StoreLimits};
use uuid::Uuid;

#[tokio::test]
async fn orphaned_durable_bytes_heal_without_reupload() {
    // Quota far below the file size: proof that the dedup short-circuit
    // (step 3) skips the limit checks for bytes the store already holds.
    let h = harness_with_limits(StoreLimits {
        max_file_bytes: 4,
        quota_bytes: 4,
    })
    .await;
    let project = Uuid::now_v7();
    let bytes = pdf_bytes("orphan");
    let digest = Digest::compute(&bytes);

    // The state a crashed upload leaves behind: bytes durable, no record.
    h.durable.seed(&digest.storage_path(), &bytes).await;
    assert!(h.workspace.blob_exists(&digest).await.unwrap());

    let doc = h
        .workspace
        .add_document(project, pdf_upload("Healed", "orphan"))
        .await
        .expect("retried upload must heal the orphan");

    assert_eq!(h.durable.upload_count(), 0, "heal path must not re-upload");
    assert_eq!(
        h.workspace.storage_usage().await,
        bytes.len() as u64,
        "metadata record re-created"
    );

    let (read, media_type) = h.workspace.read_document(project, doc.id).await.unwrap();
    assert_eq!(read, bytes);
    assert_eq!(media_type, "application/pdf");
}

#[tokio::test]
async fn failed_upload_leaves_no_document_and_retry_succeeds() {
    let h = harness().await;
    let project = Uuid::now_v7();
    let digest = Digest::compute(&pdf_bytes("flaky"));

    h.durable.set_fail_uploads(true);
    let upload = pdf_upload("Flaky", "flaky");
    let reuse_id = upload.id;
    match h.workspace.add_document(project, upload).await {
        Err(Error::DurableUpload(_)) => {}
        other => panic!("expected DurableUpload, got {:?}", other.map(|d| d.id)),
    }

    // No partially-created document, no blob, nothing to clean up
    assert!(h
        .workspace
        .list_documents(project, DocumentView::Active)
        .await
        .unwrap()
        .is_empty());
    assert!(!h.workspace.blob_exists(&digest).await.unwrap());
    assert_eq!(h.durable.object_count().await, 0);

    // Safe to retry from scratch, even with the same document id
    h.durable.set_fail_uploads(false);
    let mut retry = pdf_upload("Flaky", "flaky");
    retry.id = reuse_id;
    let doc = h
        .workspace
        .add_document(project, retry)
        .await
        .expect("retry after upload failure must succeed");
    assert_eq!(doc.id, reuse_id);
    assert!(h.workspace.blob_exists(&digest).await.unwrap());
}

#[tokio::test]
async fn abandoned_upload_is_invisible_to_listings() {
    let h = harness().await;
    let project = Uuid::now_v7();

    h.durable.set_fail_uploads(true);
    let _ = h
        .workspace
        .add_document(project, pdf_upload("Abandoned", "abandoned"))
        .await;

    for view in [DocumentView::Active, DocumentView::Trashed] {
        assert!(
            h.workspace
                .list_documents(project, view)
                .await
                .unwrap()
                .is_empty(),
            "an abandoned upload must leave the registry untouched"
        );
    }
}
