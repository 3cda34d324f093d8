//! Per-project document registry with a trash lifecycle.
//!
//! Records are lightweight references to blobs by digest, held in memory
//! for every known project and persisted as one JSON file per project.
//! Loading is wholesale at open so that reference scans see every local
//! project, not just the ones a caller happened to touch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use folio_core::{
    defaults, Annotation, Digest, Document, DocumentView, Error, Lifecycle, Result,
};
use uuid::Uuid;

/// On-disk form of one project's records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProjectRecords {
    documents: Vec<Document>,
    #[serde(default)]
    annotations: Vec<Annotation>,
}

/// Registry of all local projects' documents and annotations.
///
/// Constructed once per process and shared by reference, with no ambient
/// global state, so tests can instantiate isolated registries.
pub struct DocumentRegistry {
    dir: PathBuf,
    projects: tokio::sync::RwLock<HashMap<Uuid, ProjectRecords>>,
}

impl DocumentRegistry {
    /// Open the registry under `data_dir`, loading every project file.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir: PathBuf = data_dir.into();
        let dir = data_dir.join(defaults::REGISTRY_DIR);
        fs::create_dir_all(&dir).await?;

        let mut projects = HashMap::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Ok(project_id) = stem.parse::<Uuid>() else {
                warn!(file = %path.display(), "registry: skipping file with non-uuid name");
                continue;
            };
            let raw = fs::read(&path).await?;
            let records: ProjectRecords = serde_json::from_slice(&raw)?;
            projects.insert(project_id, records);
        }
        debug!(project_count = projects.len(), "registry: loaded");

        Ok(Self {
            dir,
            projects: tokio::sync::RwLock::new(projects),
        })
    }

    /// Insert a new document.
    ///
    /// Fails with `DuplicateDocument` if the id already exists in the
    /// project; on a failed persist the insert is rolled back so no
    /// partially-created document survives.
    pub async fn create(&self, doc: Document) -> Result<Document> {
        let mut projects = self.projects.write().await;
        let records = projects.entry(doc.project_id).or_default();
        if records.documents.iter().any(|d| d.id == doc.id) {
            return Err(Error::DuplicateDocument(doc.id));
        }
        records.documents.push(doc.clone());
        if let Err(e) = persist_project(&self.dir, doc.project_id, records).await {
            records.documents.retain(|d| d.id != doc.id);
            return Err(e);
        }
        Ok(doc)
    }

    /// Fetch a document by project and id.
    pub async fn get(&self, project_id: Uuid, id: Uuid) -> Result<Document> {
        self.projects
            .read()
            .await
            .get(&project_id)
            .and_then(|r| r.documents.iter().find(|d| d.id == id))
            .cloned()
            .ok_or(Error::DocumentNotFound(id))
    }

    /// Soft-delete documents at `now`, opening their retention windows.
    ///
    /// Idempotent per id: already-trashed documents keep their original
    /// clock, and unknown ids are skipped. Returns how many documents
    /// actually changed state.
    pub async fn soft_delete_at(
        &self,
        project_id: Uuid,
        ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let mut projects = self.projects.write().await;
        let Some(records) = projects.get_mut(&project_id) else {
            return Ok(0);
        };
        let mut changed = 0;
        for id in ids {
            if let Some(doc) = records.documents.iter_mut().find(|d| d.id == *id) {
                if doc.lifecycle.is_active() {
                    doc.lifecycle = Lifecycle::trashed_at(now);
                    doc.touch(now);
                    changed += 1;
                } else {
                    debug!(document_id = %id, "registry: soft delete of already-trashed document, keeping original clock");
                }
            }
        }
        if changed > 0 {
            persist_project(&self.dir, project_id, records).await?;
        }
        Ok(changed)
    }

    /// Restore trashed documents to the active state, clearing their
    /// retention markers. Non-trashed ids are a counted no-op.
    pub async fn restore(&self, project_id: Uuid, ids: &[Uuid]) -> Result<usize> {
        let now = Utc::now();
        let mut projects = self.projects.write().await;
        let Some(records) = projects.get_mut(&project_id) else {
            return Ok(0);
        };
        let mut changed = 0;
        for id in ids {
            if let Some(doc) = records.documents.iter_mut().find(|d| d.id == *id) {
                if doc.lifecycle.is_trashed() {
                    doc.lifecycle = Lifecycle::Active;
                    doc.touch(now);
                    changed += 1;
                }
            }
        }
        if changed > 0 {
            persist_project(&self.dir, project_id, records).await?;
        }
        Ok(changed)
    }

    /// List a project's documents partitioned by lifecycle, newest first.
    pub async fn list(&self, project_id: Uuid, view: DocumentView) -> Result<Vec<Document>> {
        let projects = self.projects.read().await;
        let mut docs: Vec<Document> = projects
            .get(&project_id)
            .map(|r| {
                r.documents
                    .iter()
                    .filter(|d| match view {
                        DocumentView::Active => d.lifecycle.is_active(),
                        DocumentView::Trashed => d.lifecycle.is_trashed(),
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(docs)
    }

    /// Permanently remove a document and its owned annotations.
    ///
    /// Does **not** touch the blob; blob deletion is a separate,
    /// explicitly safety-checked step.
    pub async fn hard_delete(&self, project_id: Uuid, id: Uuid) -> Result<()> {
        let mut projects = self.projects.write().await;
        let records = projects
            .get_mut(&project_id)
            .ok_or(Error::DocumentNotFound(id))?;
        let before = records.documents.len();
        records.documents.retain(|d| d.id != id);
        if records.documents.len() == before {
            return Err(Error::DocumentNotFound(id));
        }
        records.annotations.retain(|a| a.document_id != id);
        persist_project(&self.dir, project_id, records).await?;
        Ok(())
    }

    /// Attach an annotation to an existing document.
    pub async fn add_annotation(&self, project_id: Uuid, annotation: Annotation) -> Result<Annotation> {
        let mut projects = self.projects.write().await;
        let records = projects
            .get_mut(&project_id)
            .ok_or(Error::DocumentNotFound(annotation.document_id))?;
        if !records
            .documents
            .iter()
            .any(|d| d.id == annotation.document_id)
        {
            return Err(Error::DocumentNotFound(annotation.document_id));
        }
        records.annotations.push(annotation.clone());
        persist_project(&self.dir, project_id, records).await?;
        Ok(annotation)
    }

    /// List the annotations owned by a document.
    pub async fn list_annotations(
        &self,
        project_id: Uuid,
        document_id: Uuid,
    ) -> Result<Vec<Annotation>> {
        let projects = self.projects.read().await;
        Ok(projects
            .get(&project_id)
            .map(|r| {
                r.annotations
                    .iter()
                    .filter(|a| a.document_id == document_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    /// All documents, across every project, whose retention has elapsed.
    pub async fn expired_at(&self, now: DateTime<Utc>) -> Vec<Document> {
        self.projects
            .read()
            .await
            .values()
            .flat_map(|r| r.documents.iter())
            .filter(|d| d.lifecycle.is_expired(now))
            .cloned()
            .collect()
    }

    /// Count active local documents referencing a digest, minus the
    /// `(project, id)` pairs in `exclude`. Document ids are only unique
    /// within a project, so exclusion is keyed on the pair.
    pub async fn active_references(&self, digest: &Digest, exclude: &[(Uuid, Uuid)]) -> usize {
        self.projects
            .read()
            .await
            .values()
            .flat_map(|r| r.documents.iter())
            .filter(|d| {
                d.lifecycle.is_active()
                    && d.digest.as_ref() == Some(digest)
                    && !exclude.contains(&(d.project_id, d.id))
            })
            .count()
    }
}

/// Atomically rewrite one project's file; an emptied project's file is
/// removed instead.
async fn persist_project(dir: &Path, project_id: Uuid, records: &ProjectRecords) -> Result<()> {
    let path = dir.join(format!("{}.json", project_id));
    if records.documents.is_empty() && records.annotations.is_empty() {
        if fs::try_exists(&path).await? {
            fs::remove_file(&path).await?;
        }
        return Ok(());
    }

    let raw = serde_json::to_vec_pretty(records)?;
    let temp_path = path.with_extension("json.tmp");
    let mut file = fs::File::create(&temp_path).await?;
    file.write_all(&raw).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(&temp_path, &path).await?;
    Ok(())
}
