//! Inventory store persistence with file locking.
//!
//! The whole inventory is one JSON document loaded and saved atomically.
//! Mutations go through [`InventoryStore::update`], which serializes the
//! load-modify-save cycle under an exclusive lock so concurrent operators
//! cannot interleave a read-modify-write on the same resource.

use crate::types::*;
use crate::{Error, Result};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Exclusive advisory lock on a sidecar `.lock` file, held for the whole
/// load-modify-save cycle. The sidecar never gets renamed, so the lock
/// stays on a stable inode across atomic saves. Released on drop.
struct StoreLock {
    file: File,
}

impl StoreLock {
    fn acquire(store_path: &Path) -> Result<Self> {
        let lock_path = Self::lock_path(store_path);
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)?;
        file.lock_exclusive()?;
        Ok(Self { file })
    }

    fn lock_path(store_path: &Path) -> PathBuf {
        let mut name = store_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "inventory".into());
        name.push(".lock");
        store_path.with_file_name(name)
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// All persistent farm records, keyed by id where lookups need it
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, Default)]
pub struct InventoryStore {
    #[serde(default)]
    pub resources: HashMap<Uuid, ConsumableResource>,
    #[serde(default)]
    pub animals: HashMap<Uuid, Animal>,
    #[serde(default)]
    pub vaccinations: Vec<VaccinationRecord>,
    #[serde(default)]
    pub medications: Vec<MedicationRecord>,
    #[serde(default)]
    pub workers: HashMap<Uuid, Worker>,
    #[serde(default)]
    pub issuances: Vec<EquipmentIssuance>,
    #[serde(default)]
    pub maintenance: Vec<MaintenanceTask>,
    #[serde(default)]
    pub payments: Vec<PaymentObligation>,
}

impl InventoryStore {
    /// Load the store from a file with shared locking.
    ///
    /// Returns an empty store if the file doesn't exist. A file that exists
    /// but cannot be parsed is an error: inventory must never be silently
    /// reset to empty and then overwritten on the next save.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No inventory file found, starting empty");
            return Ok(Self::default());
        }

        let file = File::open(path)?;

        // Shared lock for reading
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read_result = reader.read_to_string(&mut contents);
        file.unlock()?;
        read_result?;

        let store: InventoryStore = serde_json::from_str(&contents)
            .map_err(|e| Error::Store(format!("failed to parse inventory at {:?}: {}", path, e)))?;

        tracing::debug!(
            "Loaded inventory from {:?}: {} resources, {} animals",
            path,
            store.resources.len(),
            store.animals.len()
        );
        Ok(store)
    }

    /// Save the store to a file.
    ///
    /// Callers that mutate must go through [`InventoryStore::update`],
    /// which holds the store lock around the whole cycle.
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "inventory path missing parent")
        })?)?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved inventory to {:?}", path);
        Ok(())
    }

    /// Load the store, apply a mutation, and save it back atomically.
    ///
    /// This is the required path for mutations: an exclusive lock on the
    /// sidecar lock file is held across the entire load-modify-save, so
    /// concurrent updates serialize instead of overwriting each other.
    /// A failed closure leaves the file untouched.
    pub fn update<T, F>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce(&mut InventoryStore) -> Result<T>,
    {
        let _lock = StoreLock::acquire(path)?;
        let mut store = Self::load(path)?;
        let out = f(&mut store)?;
        store.save(path)?;
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    pub fn resource(&self, id: Uuid) -> Result<&ConsumableResource> {
        self.resources
            .get(&id)
            .ok_or_else(|| Error::NotFound(format!("resource {}", id)))
    }

    pub fn resource_mut(&mut self, id: Uuid) -> Result<&mut ConsumableResource> {
        self.resources
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("resource {}", id)))
    }

    pub fn animal(&self, id: Uuid) -> Result<&Animal> {
        self.animals
            .get(&id)
            .ok_or_else(|| Error::NotFound(format!("animal {}", id)))
    }

    pub fn animal_mut(&mut self, id: Uuid) -> Result<&mut Animal> {
        self.animals
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("animal {}", id)))
    }

    pub fn worker(&self, id: Uuid) -> Result<&Worker> {
        self.workers
            .get(&id)
            .ok_or_else(|| Error::NotFound(format!("worker {}", id)))
    }

    /// Find a resource by name (case-insensitive). Used by the CLI so
    /// operators can type names instead of ids.
    pub fn resource_by_name(&self, name: &str) -> Result<&ConsumableResource> {
        self.resources
            .values()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::NotFound(format!("resource '{}'", name)))
    }

    /// Find an animal by its external tag.
    pub fn animal_by_tag(&self, tag: &str) -> Result<&Animal> {
        self.animals
            .values()
            .find(|a| a.tag.eq_ignore_ascii_case(tag))
            .ok_or_else(|| Error::NotFound(format!("animal '{}'", tag)))
    }

    /// Find a worker by name (case-insensitive).
    pub fn worker_by_name(&self, name: &str) -> Result<&Worker> {
        self.workers
            .values()
            .find(|w| w.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::NotFound(format!("worker '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("inventory.json");

        let mut store = InventoryStore::default();
        let r = ConsumableResource::new("Heno", ResourceKind::Feed, Unit::Kilogram, Decimal::from(100)).unwrap();
        let resource_id = r.id;
        store.resources.insert(r.id, r);
        let a = Animal::new("MAT-001", "cattle", "Brahman", Sex::Female);
        store.animals.insert(a.id, a);

        store.save(&path).unwrap();
        let loaded = InventoryStore::load(&path).unwrap();

        assert_eq!(loaded.resources.len(), 1);
        assert_eq!(loaded.animals.len(), 1);
        assert_eq!(loaded.resources[&resource_id].ingested, Decimal::from(100));
    }

    #[test]
    fn test_load_nonexistent_returns_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nonexistent.json");

        let store = InventoryStore::load(&path).unwrap();
        assert!(store.resources.is_empty());
        assert!(store.animals.is_empty());
    }

    #[test]
    fn test_corrupted_store_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("corrupted.json");

        std::fs::write(&path, "{ invalid json }").unwrap();

        let result = InventoryStore::load(&path);
        assert!(matches!(result, Err(Error::Store(_))));
    }

    #[test]
    fn test_update_pattern() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("inventory.json");

        InventoryStore::default().save(&path).unwrap();

        let worker_id = InventoryStore::update(&path, |store| {
            let w = Worker::new("Ana");
            let id = w.id;
            store.workers.insert(id, w);
            Ok(id)
        })
        .unwrap();

        let loaded = InventoryStore::load(&path).unwrap();
        assert_eq!(loaded.worker(worker_id).unwrap().name, "Ana");
    }

    #[test]
    fn test_failed_update_leaves_file_untouched() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("inventory.json");

        let mut store = InventoryStore::default();
        let w = Worker::new("Luis");
        store.workers.insert(w.id, w);
        store.save(&path).unwrap();

        let result: Result<()> = InventoryStore::update(&path, |store| {
            store.workers.clear();
            Err(Error::Store("boom".into()))
        });
        assert!(result.is_err());

        let loaded = InventoryStore::load(&path).unwrap();
        assert_eq!(loaded.workers.len(), 1);
    }

    #[test]
    fn test_concurrent_updates_both_land() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("inventory.json");
        InventoryStore::default().save(&path).unwrap();

        // The first writer dawdles inside its closure so the two
        // load-modify-save windows overlap without the lock.
        let slow_path = path.clone();
        let slow = std::thread::spawn(move || {
            InventoryStore::update(&slow_path, |store| {
                std::thread::sleep(std::time::Duration::from_millis(100));
                let w = Worker::new("Ana");
                store.workers.insert(w.id, w);
                Ok(())
            })
            .unwrap();
        });

        std::thread::sleep(std::time::Duration::from_millis(20));
        InventoryStore::update(&path, |store| {
            let w = Worker::new("Luis");
            store.workers.insert(w.id, w);
            Ok(())
        })
        .unwrap();

        slow.join().unwrap();

        let loaded = InventoryStore::load(&path).unwrap();
        assert_eq!(loaded.workers.len(), 2);
    }

    #[test]
    fn test_lookup_by_name_and_tag() {
        let mut store = InventoryStore::default();
        let r = ConsumableResource::new("Ivermectina", ResourceKind::Medicine, Unit::Milliliter, Decimal::from(500)).unwrap();
        store.resources.insert(r.id, r);
        let a = Animal::new("MAT-042", "cattle", "Gyr", Sex::Male);
        store.animals.insert(a.id, a);

        assert!(store.resource_by_name("ivermectina").is_ok());
        assert!(store.animal_by_tag("mat-042").is_ok());
        assert!(matches!(
            store.resource_by_name("no-such"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("inventory.json");

        InventoryStore::default().save(&path).unwrap();

        assert!(path.exists());
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "inventory.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only inventory.json, found extras: {:?}",
            extras
        );
    }
}
