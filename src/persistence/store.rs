//! Form store implementations

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::errors::{StoreError, StoreResult};
use crate::observability::{Event, Logger};
use crate::schema::FormSchema;

/// Load-all / save-all access to the saved forms collection.
pub trait FormStore: Send + Sync {
    /// Reads every saved form in save order.
    ///
    /// Absent data is an empty collection. Data that is present but cannot
    /// be read or parsed is an error.
    fn try_load_forms(&self) -> StoreResult<Vec<FormSchema>>;

    /// Replaces the stored collection with `forms`.
    fn save_forms(&self, forms: &[FormSchema]) -> StoreResult<()>;

    /// Returns every saved form in save order.
    ///
    /// Unreadable data is logged and yields an empty list.
    fn load_forms(&self) -> Vec<FormSchema> {
        self.try_load_forms().unwrap_or_else(|e| {
            let reason = e.to_string();
            Logger::warn(Event::FormsLoadFailed.as_str(), &[("reason", reason.as_str())]);
            Vec::new()
        })
    }

    /// Appends one form: load everything, push, save everything.
    ///
    /// Refuses to write when the existing data is unreadable, so a bad record
    /// never takes the rest of the collection with it.
    fn add_form(&self, form: FormSchema) -> StoreResult<()> {
        let mut forms = self.try_load_forms()?;
        forms.push(form);
        self.save_forms(&forms)
    }

    /// Finds a saved form by id
    fn find_form(&self, id: &str) -> Option<FormSchema> {
        self.load_forms().into_iter().find(|f| f.id == id)
    }
}

/// Forms kept as one pretty-printed JSON array on disk.
pub struct FileFormStore {
    path: PathBuf,
}

impl FileFormStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn path_str(&self) -> String {
        self.path.display().to_string()
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    /// Writes `content` to the temp file and fsyncs it.
    fn write_temp(&self, tmp: &Path, content: &str) -> io::Result<()> {
        let mut file = File::create(tmp)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()
    }
}

impl FormStore for FileFormStore {
    fn try_load_forms(&self) -> StoreResult<Vec<FormSchema>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(self.path_str(), e)),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let forms: Vec<FormSchema> = serde_json::from_str(&content)
            .map_err(|e| StoreError::unreadable(self.path_str(), e))?;

        let count = forms.len().to_string();
        Logger::info(Event::FormsLoaded.as_str(), &[("count", count.as_str())]);
        Ok(forms)
    }

    fn save_forms(&self, forms: &[FormSchema]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| StoreError::io(parent.display().to_string(), e))?;
            }
        }

        let content = serde_json::to_string_pretty(forms)?;

        // Replace in one rename so readers never see a half-written file
        let tmp = self.temp_path();
        if let Err(e) = self.write_temp(&tmp, &content) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::io(tmp.display().to_string(), e));
        }
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::io(self.path_str(), e));
        }

        // fsync the directory so the rename itself is durable
        if let Some(parent) = self.path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        let count = forms.len().to_string();
        let path = self.path_str();
        Logger::info(
            Event::FormsSaved.as_str(),
            &[("count", count.as_str()), ("path", path.as_str())],
        );
        Ok(())
    }
}

/// In-memory form store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryFormStore {
    forms: Mutex<Vec<FormSchema>>,
}

impl MemoryFormStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<FormSchema>> {
        self.forms.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }
}

impl FormStore for MemoryFormStore {
    fn try_load_forms(&self) -> StoreResult<Vec<FormSchema>> {
        Ok(self.guard().clone())
    }

    fn save_forms(&self, forms: &[FormSchema]) -> StoreResult<()> {
        *self.guard() = forms.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldConfig, FieldType};
    use chrono::Utc;
    use tempfile::TempDir;

    fn form(id: &str) -> FormSchema {
        FormSchema::new(
            id,
            format!("Form {}", id),
            Utc::now(),
            vec![FieldConfig::new("1", FieldType::Text, "Name")],
        )
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileFormStore::new(temp_dir.path().join("forms.json"));
        assert!(store.load_forms().is_empty());
        assert!(store.try_load_forms().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("forms.json");
        fs::write(&path, "{ not json").unwrap();

        let store = FileFormStore::new(&path);
        assert!(store.load_forms().is_empty());
        assert!(matches!(
            store.try_load_forms(),
            Err(StoreError::Unreadable { .. })
        ));
    }

    #[test]
    fn test_add_refuses_to_overwrite_unreadable_data() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("forms.json");
        let before = r#"[{"id":"1","name":"Keep me","createdAt":"2024-01-01T00:00:00Z","fields":[]},
            {"id":"2","name":"Legacy","createdAt":"2024-01-01T00:00:00Z","fields":[
                {"id":"a","type":"text","label":"A",
                 "validations":[{"type":"minLength","value":-3,"message":"short"}]}]}]"#;
        fs::write(&path, before).unwrap();

        let store = FileFormStore::new(&path);
        assert!(store.load_forms().is_empty());

        let result = store.add_form(form("3"));
        assert!(matches!(result, Err(StoreError::Unreadable { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_save_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileFormStore::new(temp_dir.path().join("forms.json"));

        store.save_forms(&[form("1"), form("2")]).unwrap();
        assert_eq!(store.load_forms().len(), 2);

        store.save_forms(&[form("3")]).unwrap();
        let forms = store.load_forms();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].id, "3");
        assert!(!temp_dir.path().join("forms.json.tmp").exists());
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("forms.json");
        // A non-empty directory in the target's place makes the rename fail
        fs::create_dir_all(path.join("occupied")).unwrap();

        let store = FileFormStore::new(&path);
        assert!(matches!(store.save_forms(&[form("1")]), Err(StoreError::Io { .. })));
        assert!(!temp_dir.path().join("forms.json.tmp").exists());
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileFormStore::new(temp_dir.path().join("nested").join("forms.json"));
        store.save_forms(&[form("1")]).unwrap();
        assert_eq!(store.load_forms().len(), 1);
    }

    #[test]
    fn test_add_and_find() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileFormStore::new(temp_dir.path().join("forms.json"));

        store.add_form(form("1")).unwrap();
        store.add_form(form("2")).unwrap();

        let ids: Vec<String> = store.load_forms().into_iter().map(|f| f.id).collect();
        assert_eq!(ids, ["1", "2"]);
        assert_eq!(store.find_form("2").unwrap().name, "Form 2");
        assert!(store.find_form("9").is_none());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryFormStore::new();
        assert!(store.is_empty());

        store.add_form(form("1")).unwrap();
        store.add_form(form("2")).unwrap();
        assert_eq!(store.len(), 2);

        store.save_forms(&[]).unwrap();
        assert!(store.is_empty());
    }
}
