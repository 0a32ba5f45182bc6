//! Project management
//!
//! A project is a directory holding a `.taskmage/` marker directory. Active
//! Mtask files live anywhere below the root; the archive counterpart of
//! `<root>/<rel>` is `<root>/.taskmage/<rel>`.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::PROJECT_DIR;
use super::{Config, MtaskStore, ProjectConfig};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a taskmage project. Run 'taskmage init' first.")]
    NotInProject,

    #[error("{0} is outside the project at {1}")]
    OutsideProject(PathBuf, PathBuf),

    #[error("{0} is already an archive file")]
    AlreadyArchived(PathBuf),
}

/// A TaskMage project
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = std::path::absolute(root.as_ref())
            .with_context(|| format!("Failed to resolve {}", root.as_ref().display()))?;

        if !root.join(PROJECT_DIR).is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a project at the given path; existing files are kept
    pub fn init(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let project_dir = root.join(PROJECT_DIR);

        fs::create_dir_all(&project_dir).with_context(|| {
            format!(
                "Failed to create {} directory: {}",
                PROJECT_DIR,
                project_dir.display()
            )
        })?;

        let config_path = Config::project_config_path(root);
        if !config_path.exists() {
            let settings = toml::to_string_pretty(&ProjectConfig::default())
                .context("Failed to serialize project config")?;
            let content = format!("# TaskMage project configuration\n\n{}", settings);
            fs::write(&config_path, content)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = project_dir.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(&gitignore_path, "# Interrupted saves\n*.tmp\n").with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .taskmage directory path
    pub fn project_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Maps an active Mtask file to its archive counterpart
    pub fn archive_path(&self, active: &Path) -> Result<PathBuf, ProjectError> {
        let absolute = self.root.join(active);
        let relative = absolute
            .strip_prefix(&self.root)
            .map_err(|_| ProjectError::OutsideProject(absolute.clone(), self.root.clone()))?;

        if relative.components().any(|c| c == Component::ParentDir) {
            return Err(ProjectError::OutsideProject(absolute, self.root.clone()));
        }
        if relative.starts_with(PROJECT_DIR) {
            return Err(ProjectError::AlreadyArchived(absolute));
        }

        Ok(self.project_dir().join(relative))
    }

    /// Returns the store for the archive counterpart of `active`
    pub fn archive_store(&self, active: &Path) -> Result<MtaskStore> {
        Ok(MtaskStore::new(self.archive_path(active)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.project_dir().is_dir());
        assert!(project.project_dir().join("config.toml").is_file());
        assert!(project.project_dir().join(".gitignore").is_file());
        assert_eq!(project.config().project, ProjectConfig::default());
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();

        Project::init(dir.path()).unwrap();
        fs::write(
            Config::project_config_path(dir.path()),
            "archive_on_save = true\n",
        )
        .unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.config().project.archive_on_save);
    }

    #[test]
    fn open_existing_project() {
        let dir = TempDir::new().unwrap();
        Project::init(dir.path()).unwrap();

        let project = Project::open(dir.path()).unwrap();
        assert_eq!(project.root(), dir.path());
    }

    #[test]
    fn open_non_project_fails() {
        let dir = TempDir::new().unwrap();
        let err = Project::open(dir.path()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ProjectError>(),
            Some(ProjectError::NotInProject)
        ));
    }

    #[test]
    fn archive_path_mirrors_layout() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        let active = dir.path().join("home").join("chores.mtask");
        assert_eq!(
            project.archive_path(&active).unwrap(),
            dir.path().join(".taskmage").join("home").join("chores.mtask")
        );
        assert_eq!(
            project.archive_path(Path::new("todo.mtask")).unwrap(),
            dir.path().join(".taskmage").join("todo.mtask")
        );
    }

    #[test]
    fn archive_path_rejects_outside_and_archived() {
        let dir = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(matches!(
            project.archive_path(&other.path().join("x.mtask")),
            Err(ProjectError::OutsideProject(..))
        ));
        assert!(matches!(
            project.archive_path(&project.project_dir().join("x.mtask")),
            Err(ProjectError::AlreadyArchived(_))
        ));
    }

    #[test]
    fn archive_path_rejects_parent_components() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        let escaped = dir.path().join("..").join("elsewhere").join("x.mtask");
        assert!(matches!(
            project.archive_path(&escaped),
            Err(ProjectError::OutsideProject(..))
        ));
    }
}
