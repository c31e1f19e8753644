//! Project Persistence
//!
//! A project records the picked asset, its caption list and style config.
//! The store is a simple key-value record store: one JSON file per project,
//! written atomically (temp file + rename) so a crash never corrupts a
//! record.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CoreError, CoreResult};
use crate::style::StyleConfig;
use crate::timeline::CaptionItem;
use crate::types::{AssetId, ProjectId};

// =============================================================================
// Project Model
// =============================================================================

/// A captioning project keyed to one library asset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub asset_id: AssetId,
    pub captions: Vec<CaptionItem>,
    pub style: StyleConfig,
    pub created_at: String,
    pub modified_at: String,
}

impl Project {
    pub fn new(name: &str, asset_id: &str) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: ulid::Ulid::new().to_string(),
            name: name.to_string(),
            asset_id: asset_id.to_string(),
            captions: vec![],
            style: StyleConfig::default(),
            created_at: now.clone(),
            modified_at: now,
        }
    }

    /// Updates the modification timestamp.
    pub fn touch(&mut self) {
        self.modified_at = chrono::Utc::now().to_rfc3339();
    }
}

// =============================================================================
// Project Store
// =============================================================================

/// Persists projects keyed by id.
pub trait ProjectStore {
    fn list(&self) -> CoreResult<Vec<Project>>;
    fn save(&self, project: &Project) -> CoreResult<()>;
    fn delete(&self, id: &str) -> CoreResult<()>;
}

/// File-backed store: `<root>/<project-id>.json` per project.
pub struct JsonProjectStore {
    root: PathBuf,
}

impl JsonProjectStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> CoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }
}

impl ProjectStore for JsonProjectStore {
    /// Lists all readable project records, newest modification first.
    /// Corrupt records are skipped with a warning, never returned as errors.
    fn list(&self) -> CoreResult<Vec<Project>> {
        let mut projects = vec![];
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            match read_project(&path) {
                Ok(project) => projects.push(project),
                Err(err) => {
                    warn!("Skipping unreadable project record {}: {}", path.display(), err);
                }
            }
        }
        projects.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
        Ok(projects)
    }

    fn save(&self, project: &Project) -> CoreResult<()> {
        let path = self.record_path(&project.id);
        atomic_write_json(&path, project)
            .map_err(|err| CoreError::ProjectSaveFailed(err.to_string()))
    }

    fn delete(&self, id: &str) -> CoreResult<()> {
        let path = self.record_path(id);
        if !path.exists() {
            return Err(CoreError::ProjectNotFound(id.to_string()));
        }
        std::fs::remove_file(path)?;
        Ok(())
    }
}

fn read_project(path: &Path) -> CoreResult<Project> {
    let file = std::fs::File::open(path)?;
    serde_json::from_reader(std::io::BufReader::new(file))
        .map_err(|err| CoreError::ProjectCorrupted(err.to_string()))
}

/// Writes JSON to a sibling temp file, then renames over the target.
fn atomic_write_json<T: Serialize>(path: &Path, value: &T) -> CoreResult<()> {
    let tmp_path = path.with_extension("json.tmp");
    let json = serde_json::to_vec_pretty(value)?;
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, JsonProjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonProjectStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_save_and_list_round_trip() {
        let (_dir, store) = store();

        let mut project = Project::new("Holiday", "asset_1");
        project.captions.push(CaptionItem::with_text(0.0, 124.0, "hi"));
        store.save(&project).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], project);
    }

    #[test]
    fn test_list_orders_by_modification() {
        let (_dir, store) = store();

        let mut older = Project::new("Older", "a");
        older.modified_at = "2026-01-01T00:00:00+00:00".to_string();
        let mut newer = Project::new("Newer", "b");
        newer.modified_at = "2026-06-01T00:00:00+00:00".to_string();

        store.save(&older).unwrap();
        store.save(&newer).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed[0].name, "Newer");
        assert_eq!(listed[1].name, "Older");
    }

    #[test]
    fn test_corrupt_record_is_skipped() {
        let (dir, store) = store();

        store.save(&Project::new("Good", "a")).unwrap();
        std::fs::write(dir.path().join("bad.json"), b"{ not json").unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Good");
    }

    #[test]
    fn test_delete() {
        let (_dir, store) = store();
        let project = Project::new("Gone", "a");
        store.save(&project).unwrap();

        store.delete(&project.id).unwrap();
        assert!(store.list().unwrap().is_empty());

        let err = store.delete(&project.id).unwrap_err();
        assert!(matches!(err, CoreError::ProjectNotFound(_)));
    }

    #[test]
    fn test_save_overwrites_in_place() {
        let (_dir, store) = store();
        let mut project = Project::new("Draft", "a");
        store.save(&project).unwrap();

        project.name = "Final".to_string();
        project.touch();
        store.save(&project).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Final");
    }
}
