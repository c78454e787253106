//! Configuration file resolution.
//!
//! Priority order:
//!
//! 1. `--config` flag
//! 2. `async-naming.toml` or `.async-naming.toml` in the analyzed directory
//!    or one of its ancestors, up to the enclosing repository root
//! 3. `config.toml` in the global directory (`$ASYNC_NAMING_CONFIG_DIR`,
//!    else `~/.async-naming/`)
//! 4. built-in defaults

use anyhow::{Context, Result};
use async_naming_core::Config;
use std::path::{Path, PathBuf};

/// Project-level config file names, checked in order within a directory.
const PROJECT_CONFIG_NAMES: &[&str] = &["async-naming.toml", ".async-naming.toml"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Environment variable overriding the global config directory.
const CONFIG_DIR_ENV: &str = "ASYNC_NAMING_CONFIG_DIR";

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found in the project tree.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Loads the configuration this source points at.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            return Ok(Config::default());
        };
        if matches!(self, Self::Global(_)) {
            tracing::info!("Using global config: {}", path.display());
        }
        Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

/// Resolves the configuration for analyzing `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(project_dir, explicit, global_config_dir())
}

fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = find_project_config(project_dir) {
        tracing::debug!("Found project config: {}", found.display());
        return ConfigSource::Project(found);
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, |candidate| {
            tracing::debug!("Found global config: {}", candidate.display());
            ConfigSource::Global(candidate)
        })
}

/// Searches `start` and its ancestors. The search stops after the first
/// directory containing `.git`.
fn find_project_config(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());

    for dir in start.ancestors() {
        let found = PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file());
        if found.is_some() {
            return found;
        }
        if dir.join(".git").exists() {
            break;
        }
    }

    None
}

/// Returns the global config directory.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".async-naming"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// A project directory marked as a repository root.
    fn repo() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join(".git")).unwrap();
        tmp
    }

    #[test]
    fn explicit_wins_and_is_not_checked() {
        let tmp = repo();
        fs::write(tmp.path().join("async-naming.toml"), "").unwrap();

        let result = resolve_inner(tmp.path(), Some(Path::new("/nonexistent.toml")), None);
        assert_eq!(
            result,
            ConfigSource::Explicit(PathBuf::from("/nonexistent.toml"))
        );
    }

    #[test]
    fn plain_name_preferred_over_dot_prefix() {
        let tmp = repo();
        fs::write(tmp.path().join("async-naming.toml"), "").unwrap();
        fs::write(tmp.path().join(".async-naming.toml"), "").unwrap();

        let result = resolve_inner(tmp.path(), None, None);
        let found = result.path().unwrap();
        assert!(found.ends_with("async-naming.toml"));
        assert!(!found.ends_with(".async-naming.toml"));
    }

    #[test]
    fn found_in_ancestor_directory() {
        let tmp = repo();
        fs::write(tmp.path().join(".async-naming.toml"), "").unwrap();
        let nested = tmp.path().join("crates/app/src");
        fs::create_dir_all(&nested).unwrap();

        let result = resolve_inner(&nested, None, None);
        assert!(
            matches!(result, ConfigSource::Project(ref p) if p.ends_with(".async-naming.toml"))
        );
    }

    #[test]
    fn search_stops_at_repository_root() {
        let outer = TempDir::new().unwrap();
        fs::write(outer.path().join("async-naming.toml"), "").unwrap();
        let project = outer.path().join("project");
        fs::create_dir_all(project.join(".git")).unwrap();

        let result = resolve_inner(&project, None, None);
        assert_eq!(result, ConfigSource::Default);
    }

    #[test]
    fn global_fallback_when_no_project_config() {
        let project = repo();
        let global = TempDir::new().unwrap();
        fs::write(global.path().join("config.toml"), "fail_on = \"warning\"\n").unwrap();

        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(
            result,
            ConfigSource::Global(global.path().join("config.toml"))
        );
        assert_eq!(
            result.load().unwrap().fail_on(),
            async_naming_core::Severity::Warning
        );
    }

    #[test]
    fn global_dir_without_config_gives_default() {
        let project = repo();
        let global = TempDir::new().unwrap();

        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Default);
        assert!(result.load().unwrap().rules.is_empty());
    }

    #[test]
    fn invalid_config_fails_to_load() {
        let tmp = repo();
        fs::write(tmp.path().join("async-naming.toml"), "fail_on = 3\n").unwrap();

        let result = resolve_inner(tmp.path(), None, None);
        assert!(result.load().is_err());
    }
}
