use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// Platform base directory the default subdirectory lives under.
/// Windows: %APPDATA%; Unix/macOS: $HOME.
fn platform_base_dir() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let base = std::env::var_os("APPDATA")
        .map(PathBuf::from)
        .or_else(dirs::config_dir);
    #[cfg(not(target_os = "windows"))]
    let base = dirs::home_dir();

    base.ok_or_else(|| anyhow!("could not determine the user's home directory"))
}

/// Expand a leading `~` and make the path absolute.
fn expand(raw: &str) -> Result<PathBuf> {
    let path = if raw == "~" {
        dirs::home_dir().ok_or_else(|| anyhow!("cannot expand '~' without a home directory"))?
    } else if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        dirs::home_dir()
            .ok_or_else(|| anyhow!("cannot expand '~' without a home directory"))?
            .join(rest)
    } else {
        PathBuf::from(raw)
    };

    if path.is_absolute() {
        Ok(path)
    } else {
        let cwd = std::env::current_dir().context("failed to read current directory")?;
        Ok(cwd.join(path))
    }
}

/// Resolve the server home directory.
///
/// `None` selects `<platform base>/<default_subdir>`. When `create` is set the
/// directory is created if missing.
pub fn resolve_home_dir(configured: Option<String>, default_subdir: &str, create: bool) -> Result<PathBuf> {
    let dir = match configured {
        Some(raw) => expand(raw.trim())?,
        None => platform_base_dir()?.join(default_subdir),
    };

    if create {
        ensure_dir(&dir)?;
    }
    Ok(dir)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(anyhow!("home_dir '{}' exists but is not a directory", dir.display()));
    }
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create '{}'", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn explicit_absolute_dir_is_created() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("a/b");
        let resolved = resolve_home_dir(Some(target.to_string_lossy().into_owned()), ".x", true).unwrap();
        assert_eq!(resolved, target);
        assert!(target.is_dir());
    }

    #[test]
    fn relative_dir_becomes_absolute() {
        let resolved = resolve_home_dir(Some("relative/dir".into()), ".x", false).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("relative/dir"));
    }

    #[test]
    fn file_in_the_way_is_an_error() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("file");
        std::fs::write(&file, "x").unwrap();
        assert!(resolve_home_dir(Some(file.to_string_lossy().into_owned()), ".x", true).is_err());
    }
}
