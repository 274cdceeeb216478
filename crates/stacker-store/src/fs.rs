//! Directory-backed object store.
//!
//! Layout: `<root>/<namespace>/<id>.json`, one file per entity. Writes go to
//! a temporary file in the same directory and are renamed into place, so a
//! reader never observes a half-written snapshot.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use stacker_types::{EntityId, EntityKind};
use tempfile::NamedTempFile;

use crate::error::StoreResult;
use crate::object::StoredEntity;
use crate::traits::ObjectStore;

const SNAPSHOT_EXT: &str = "json";

/// Object store persisting each snapshot as a JSON file.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        for kind in EntityKind::ALL {
            fs::create_dir_all(root.join(kind.namespace()))?;
        }
        tracing::debug!(root = %root.display(), "opened directory store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dir(&self, kind: EntityKind) -> PathBuf {
        self.root.join(kind.namespace())
    }

    fn path(&self, kind: EntityKind, id: &EntityId) -> PathBuf {
        self.dir(kind).join(format!("{id}.{SNAPSHOT_EXT}"))
    }
}

impl ObjectStore for FsObjectStore {
    fn read(&self, kind: EntityKind, id: &EntityId) -> StoreResult<Option<StoredEntity>> {
        match fs::read(self.path(kind, id)) {
            Ok(data) => Ok(Some(StoredEntity::new(kind, id.clone(), data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, object: &StoredEntity) -> StoreResult<()> {
        let dir = self.dir(object.kind);
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(&object.data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path(object.kind, &object.id))
            .map_err(|e| e.error)?;
        Ok(())
    }

    fn delete(&self, kind: EntityKind, id: &EntityId) -> StoreResult<bool> {
        match fs::remove_file(self.path(kind, id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self, kind: EntityKind) -> StoreResult<Vec<StoredEntity>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(self.dir(kind))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SNAPSHOT_EXT) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match EntityId::parse(stem) {
                Ok(id) => ids.push(id),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping stray file"),
            }
        }
        ids.sort();

        let mut objects = Vec::with_capacity(ids.len());
        for id in ids {
            // A concurrent delete between listing and reading is not an error.
            if let Some(obj) = self.read(kind, &id)? {
                objects.push(obj);
            }
        }
        Ok(objects)
    }
}
