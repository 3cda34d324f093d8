//! Trash lifecycle: soft delete opens a ten-day retention window, restore
//! closes it, and a collector run at or past the boundary removes the
//! document exactly once.

mod common;

use common::{harness, pdf_upload};
use folio_core::DocumentView;

#[tokio::test]
async fn deleted_document_moves_to_trash_listing() {
    let h = harness().await;
    let project = uuid::Uuid::now_v7();
    let doc = h
        .workspace
        .add_document(project, pdf_upload("Paper", "to-trash"))
        .await
        .unwrap();

    let changed = h.workspace.delete_documents(project, &[doc.id]).await.unwrap();
    assert_eq!(changed, 1);

    let active = h.workspace.list_documents(project, DocumentView::Active).await.unwrap();
    let trashed = h.workspace.list_documents(project, DocumentView::Trashed).await.unwrap();
    assert!(active.is_empty());
    assert_eq!(trashed.len(), 1);
    assert_eq!(trashed[0].id, doc.id);

    let markers = trashed[0].lifecycle;
    let deleted_at = markers.deleted_at().expect("deleted_at set");
    let trash_until = markers.trash_until().expect("trash_until set");
    assert_eq!(
        trash_until - deleted_at,
        chrono::Duration::days(folio_core::defaults::TRASH_RETENTION_DAYS),
        "retention window is exactly ten days"
    );
}

#[tokio::test]
async fn document_survives_sweeps_inside_retention_window() {
    let h = harness().await;
    let project = uuid::Uuid::now_v7();
    let doc = h
        .workspace
        .add_document(project, pdf_upload("Kept", "inside-window"))
        .await
        .unwrap();
    h.workspace.delete_documents(project, &[doc.id]).await.unwrap();

    let trashed = h.workspace.list_documents(project, DocumentView::Trashed).await.unwrap();
    let trash_until = trashed[0].lifecycle.trash_until().unwrap();

    // Sweeps strictly inside the window must not remove it
    for now in [
        trash_until - chrono::Duration::days(10) + chrono::Duration::seconds(1),
        trash_until - chrono::Duration::days(5),
        trash_until - chrono::Duration::seconds(1),
    ] {
        let report = h.workspace.sweep_trash_at(now).await;
        assert_eq!(report.removed, 0, "sweep at {} must remove nothing", now);
    }
    assert_eq!(
        h.workspace
            .list_documents(project, DocumentView::Trashed)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn document_is_gone_from_all_listings_after_expiry_sweep() {
    let h = harness().await;
    let project = uuid::Uuid::now_v7();
    let doc = h
        .workspace
        .add_document(project, pdf_upload("Expired", "past-window"))
        .await
        .unwrap();
    h.workspace.delete_documents(project, &[doc.id]).await.unwrap();

    let trashed = h.workspace.list_documents(project, DocumentView::Trashed).await.unwrap();
    let trash_until = trashed[0].lifecycle.trash_until().unwrap();

    let report = h.workspace.sweep_trash_at(trash_until).await;
    assert_eq!(report.examined, 1);
    assert_eq!(report.removed, 1);

    assert!(h
        .workspace
        .list_documents(project, DocumentView::Active)
        .await
        .unwrap()
        .is_empty());
    assert!(h
        .workspace
        .list_documents(project, DocumentView::Trashed)
        .await
        .unwrap()
        .is_empty());

    // A second sweep finds nothing: removal happens exactly once
    let again = h.workspace.sweep_trash_at(trash_until + chrono::Duration::days(1)).await;
    assert_eq!(again.examined, 0);
    assert_eq!(again.removed, 0);
}

#[tokio::test]
async fn restore_before_expiry_clears_markers_and_reactivates() {
    let h = harness().await;
    let project = uuid::Uuid::now_v7();
    let doc = h
        .workspace
        .add_document(project, pdf_upload("Recovered", "restore-me"))
        .await
        .unwrap();

    h.workspace.delete_documents(project, &[doc.id]).await.unwrap();
    let changed = h.workspace.restore_documents(project, &[doc.id]).await.unwrap();
    assert_eq!(changed, 1);

    let active = h.workspace.list_documents(project, DocumentView::Active).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, doc.id);
    assert!(active[0].lifecycle.is_active());
    assert_eq!(active[0].lifecycle.deleted_at(), None);
    assert_eq!(active[0].lifecycle.trash_until(), None);

    // A restored document is untouchable by any later sweep
    let report = h
        .workspace
        .sweep_trash_at(chrono::Utc::now() + chrono::Duration::days(365))
        .await;
    assert_eq!(report.removed, 0);
}

#[tokio::test]
async fn restore_of_active_document_is_counted_no_op() {
    let h = harness().await;
    let project = uuid::Uuid::now_v7();
    let doc = h
        .workspace
        .add_document(project, pdf_upload("Already Active", "active-restore"))
        .await
        .unwrap();

    let changed = h.workspace.restore_documents(project, &[doc.id]).await.unwrap();
    assert_eq!(changed, 0, "restoring an active document changes nothing");
}

#[tokio::test]
async fn repeated_delete_does_not_extend_retention() {
    let h = harness().await;
    let project = uuid::Uuid::now_v7();
    let doc = h
        .workspace
        .add_document(project, pdf_upload("Once", "idempotent-delete"))
        .await
        .unwrap();

    h.workspace.delete_documents(project, &[doc.id]).await.unwrap();
    let first = h.workspace.list_documents(project, DocumentView::Trashed).await.unwrap()[0]
        .lifecycle;

    let changed = h.workspace.delete_documents(project, &[doc.id]).await.unwrap();
    assert_eq!(changed, 0, "second delete is a no-op");
    let second = h.workspace.list_documents(project, DocumentView::Trashed).await.unwrap()[0]
        .lifecycle;
    assert_eq!(first, second, "retention clock must not move");
}

#[tokio::test]
async fn annotations_die_with_their_expired_document() {
    let h = harness().await;
    let project = uuid::Uuid::now_v7();
    let doc = h
        .workspace
        .add_document(project, pdf_upload("Annotated", "annotated"))
        .await
        .unwrap();

    h.workspace
        .annotate(
            project,
            doc.id,
            folio_core::AnnotationKind::Highlight,
            "key passage",
            Some(7),
        )
        .await
        .unwrap();
    assert_eq!(h.workspace.annotations(project, doc.id).await.unwrap().len(), 1);

    h.workspace.delete_documents(project, &[doc.id]).await.unwrap();
    let trash_until = h
        .workspace
        .list_documents(project, DocumentView::Trashed)
        .await
        .unwrap()[0]
        .lifecycle
        .trash_until()
        .unwrap();
    h.workspace.sweep_trash_at(trash_until).await;

    assert!(
        h.workspace.annotations(project, doc.id).await.unwrap().is_empty(),
        "annotations are owned by the document and deleted with it"
    );
}
