//! Directory-backed suite storage.
//!
//! Layout under a branch root:
//!
//! ```text
//! <root>/<name>/suite.toml
//! <root>/<name>/bin/<alias>     one wrapper per exposed tool
//! ```

use super::{SavedSuite, SuiteStorage};
use crate::error::StorageError;
use crate::suite::SuiteDocument;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SUITE_FILE: &str = "suite.toml";
const BIN_DIR: &str = "bin";

pub struct FsSuiteStorage {
    root: PathBuf,
    branch: String,
}

impl FsSuiteStorage {
    /// Storage rooted at `root`; the branch defaults to the root's basename.
    pub fn new(root: impl Into<PathBuf>, branch: Option<&str>) -> Self {
        let root = root.into();
        let branch = match branch {
            Some(b) => b.to_string(),
            None => root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        Self { root, branch }
    }

    fn suite_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn suite_bin(&self, name: &str) -> PathBuf {
        self.suite_dir(name).join(BIN_DIR)
    }

    fn suite_file(&self, name: &str) -> PathBuf {
        self.suite_dir(name).join(SUITE_FILE)
    }

    fn saved(&self, name: &str) -> SavedSuite {
        SavedSuite {
            name: name.to_string(),
            branch: self.branch.clone(),
            root: self.root.clone(),
            bin: self.suite_bin(name),
            filepath: self.suite_file(name),
        }
    }

    /// Read a suite file from any location.
    pub fn read_document(filepath: &Path) -> Result<SuiteDocument, StorageError> {
        let content = std::fs::read_to_string(filepath)?;
        let mut document: SuiteDocument =
            toml::from_str(&content).map_err(|e| StorageError::Deserialize {
                path: filepath.display().to_string(),
                message: e.to_string(),
            })?;
        document.load_path = Some(filepath.to_path_buf());
        Ok(document)
    }

    fn write_wrappers(&self, document: &SuiteDocument, name: &str) -> Result<(), StorageError> {
        let bin = self.suite_bin(name);
        if bin.exists() {
            std::fs::remove_dir_all(&bin)?;
        }
        std::fs::create_dir_all(&bin)?;

        let suite_file = self.suite_file(name);
        for (alias, (ctx_name, tool)) in document.saved_tools() {
            if !valid_file_name(alias) {
                warn!(alias, "Skipping tool wrapper with unsafe alias");
                continue;
            }
            let wrapper = bin.join(alias);
            let script = format!(
                "#!/bin/sh\n# context: {}, tool: {}\nexec sweet run \"{}\" \"{}\" -- \"$@\"\n",
                ctx_name,
                tool,
                suite_file.display(),
                alias
            );
            std::fs::write(&wrapper, script)?;
            make_executable(&wrapper)?;
        }
        Ok(())
    }
}

impl SuiteStorage for FsSuiteStorage {
    fn branch(&self) -> &str {
        &self.branch
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn list(&self) -> Result<Vec<SavedSuite>, StorageError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut saved = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(
                        "Failed to read directory entry in {}: {}",
                        self.root.display(),
                        e
                    );
                    continue;
                }
            };
            let name = match entry.file_name().to_str() {
                Some(n) => n.to_string(),
                None => {
                    warn!("Invalid suite directory name (non-UTF8): {:?}", entry.path());
                    continue;
                }
            };
            if self.suite_file(&name).is_file() {
                saved.push(self.saved(&name));
            }
        }
        saved.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(saved)
    }

    fn load(&self, filepath: &Path) -> Result<SuiteDocument, StorageError> {
        Self::read_document(filepath)
    }

    fn save(&self, document: &SuiteDocument, name: &str) -> Result<SavedSuite, StorageError> {
        if !valid_file_name(name) {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        let content =
            toml::to_string_pretty(document).map_err(|e| StorageError::Serialize(e.to_string()))?;

        std::fs::create_dir_all(self.suite_dir(name))?;
        std::fs::write(self.suite_file(name), content)?;
        self.write_wrappers(document, name)?;

        debug!(branch = %self.branch, suite = name, "Suite saved");
        Ok(self.saved(name))
    }
}

fn valid_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), StorageError> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), StorageError> {
    Ok(())
}
