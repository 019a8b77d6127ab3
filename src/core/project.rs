//! Project discovery and on-disk structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::EntityId;

/// Marker directory at the project root
const MARKER_DIR: &str = ".carton";

/// Directory holding product files
const PRODUCTS_DIR: &str = "products";

/// Suffix for product files
pub const PRODUCT_FILE_SUFFIX: &str = ".carton.yaml";

/// Represents a catalog project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .carton/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            let marker = current.join(MARKER_DIR);
            if marker.is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Find the project root, preferring an explicit override when given
    pub fn discover_or(explicit: Option<&Path>) -> Result<Self, ProjectError> {
        match explicit {
            Some(path) => Self::discover_from(path),
            None => Self::discover(),
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let marker = root.join(MARKER_DIR);
        if marker.exists() {
            return Err(ProjectError::AlreadyExists(root.clone()));
        }

        Self::create_structure(&root)?;
        Ok(Self { root })
    }

    /// Force initialization even if .carton/ exists
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::create_structure(&root)?;
        Ok(Self { root })
    }

    fn create_structure(root: &Path) -> Result<(), ProjectError> {
        let marker = root.join(MARKER_DIR);
        std::fs::create_dir_all(&marker).map_err(|e| ProjectError::IoError(e.to_string()))?;

        std::fs::write(marker.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        // The cache and short-ID index are user-local; keep them out of git
        std::fs::write(marker.join(".gitignore"), "cache.db*\nshortids.json\n")
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        std::fs::create_dir_all(root.join(PRODUCTS_DIR))
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Ok(())
    }

    fn default_config() -> &'static str {
        r#"# Carton Project Configuration

# Default author for new products (can be overridden by global config)
# author: ""

# Editor to use for `carton product edit` (default: $EDITOR)
# editor: ""

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .carton configuration directory
    pub fn carton_dir(&self) -> PathBuf {
        self.root.join(MARKER_DIR)
    }

    /// Get the directory holding product files
    pub fn products_dir(&self) -> PathBuf {
        self.root.join(PRODUCTS_DIR)
    }

    /// Get the path for a product file
    pub fn product_path(&self, id: &EntityId) -> PathBuf {
        self.products_dir()
            .join(format!("{}{}", id, PRODUCT_FILE_SUFFIX))
    }

    /// Iterate all product files in the project
    pub fn iter_product_files(&self) -> impl Iterator<Item = PathBuf> {
        walkdir::WalkDir::new(self.products_dir())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().to_string_lossy().ends_with(PRODUCT_FILE_SUFFIX))
            .map(|e| e.path().to_path_buf())
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a catalog project (searched from {searched_from:?}). Run 'carton init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("catalog project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.carton_dir().exists());
        assert!(project.carton_dir().join("config.yaml").exists());
        assert!(project.carton_dir().join(".gitignore").exists());
        assert!(project.products_dir().is_dir());
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_project_init_force_overwrites() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();
        assert!(Project::init_force(tmp.path()).is_ok());
    }

    #[test]
    fn test_project_discover_finds_marker_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_marker_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn test_product_path_uses_id_and_suffix() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let id = EntityId::new(EntityPrefix::Prod);

        let path = project.product_path(&id);
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("PROD-"));
        assert!(name.ends_with(".carton.yaml"));
        assert!(path.starts_with(project.products_dir()));
    }

    #[test]
    fn test_iter_product_files_filters_suffix() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        std::fs::write(project.products_dir().join("a.carton.yaml"), "id: x").unwrap();
        std::fs::write(project.products_dir().join("notes.txt"), "ignore").unwrap();

        let files: Vec<_> = project.iter_product_files().collect();
        assert_eq!(files.len(), 1);
    }
}
