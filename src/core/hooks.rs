//! Git pre-commit hook management.
//!
//! The hook runs `precheck` with no arguments, so the checked files are the
//! ones `git status` reports as added or modified.

use crate::core::error::{Error, Result};
use crate::core::vcs::{Detection, Vcs};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Hook script template.
pub const HOOK_SCRIPT: &str = r#"#!/bin/sh
# precheck hook - installed by `precheck install`

# Skip if PRECHECK_SKIP is set
if [ "$PRECHECK_SKIP" = "1" ]; then
    exit 0
fi

exec precheck
"#;

/// Marker identifying hooks written by precheck.
pub const HOOK_MARKER: &str = "# precheck hook";

/// Hook file name.
pub const HOOK_NAME: &str = "pre-commit";

/// What `install` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// A new hook was written.
    Installed(PathBuf),
    /// Our hook was already present.
    AlreadyInstalled(PathBuf),
    /// A foreign hook was moved aside and ours written.
    Replaced {
        /// Path of the new hook.
        hook: PathBuf,
        /// Where the previous hook was moved.
        backup: PathBuf,
    },
}

/// What `uninstall` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallOutcome {
    /// Our hook was removed; a backup may remain.
    Removed {
        /// Path of the removed hook.
        hook: PathBuf,
        /// Backup left by a forced install, if any.
        backup: Option<PathBuf>,
    },
    /// No hook file exists.
    NotInstalled(PathBuf),
    /// The hook file was not written by precheck and was left alone.
    Foreign(PathBuf),
}

/// Returns the hooks directory of the working copy.
///
/// Honours `core.hooksPath`. Only git has client-side hooks.
pub fn hooks_dir(detection: &Detection) -> Result<PathBuf> {
    if detection.vcs != Vcs::Git {
        return Err(Error::HooksUnsupported {
            vcs: detection.vcs.to_string(),
        });
    }

    let output = Command::new("git")
        .args(["rev-parse", "--git-path", "hooks"])
        .current_dir(&detection.root)
        .output()
        .map_err(|e| Error::io("run git rev-parse", e))?;

    if output.status.success() {
        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !path.is_empty() {
            let hooks = PathBuf::from(path);
            return Ok(if hooks.is_absolute() {
                hooks
            } else {
                detection.root.join(hooks)
            });
        }
    }

    tracing::debug!("git rev-parse failed, using .git/hooks");
    Ok(detection.root.join(".git").join("hooks"))
}

/// Writes the pre-commit hook into `hooks_dir`.
///
/// A foreign hook is only replaced with `force`, after being moved to
/// `pre-commit.bak`. An existing backup is never overwritten.
pub fn install(hooks_dir: &Path, force: bool) -> Result<InstallOutcome> {
    let hook_path = hooks_dir.join(HOOK_NAME);

    if !hooks_dir.exists() {
        std::fs::create_dir_all(hooks_dir).map_err(|e| Error::io("create hooks dir", e))?;
    }

    let mut backup = None;
    if hook_path.exists() {
        let content =
            std::fs::read_to_string(&hook_path).map_err(|e| Error::io("read existing hook", e))?;

        if content.contains(HOOK_MARKER) {
            return Ok(InstallOutcome::AlreadyInstalled(hook_path));
        }

        if !force {
            return Err(Error::HookExists { path: hook_path });
        }

        let backup_path = backup_path(hooks_dir);
        if backup_path.exists() {
            return Err(Error::HookInstall {
                message: format!(
                    "backup {} already exists; move it aside first",
                    backup_path.display()
                ),
            });
        }
        std::fs::rename(&hook_path, &backup_path).map_err(|e| Error::io("backup hook", e))?;
        backup = Some(backup_path);
    }

    std::fs::write(&hook_path, HOOK_SCRIPT).map_err(|e| Error::HookInstall {
        message: format!("write {}: {e}", hook_path.display()),
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(&hook_path)
            .map_err(|e| Error::io("get hook metadata", e))?
            .permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&hook_path, perms).map_err(|e| Error::io("set hook perms", e))?;
    }

    tracing::debug!(path = %hook_path.display(), "installed hook");

    Ok(match backup {
        Some(backup) => InstallOutcome::Replaced {
            hook: hook_path,
            backup,
        },
        None => InstallOutcome::Installed(hook_path),
    })
}

/// Removes the pre-commit hook from `hooks_dir` if precheck wrote it.
pub fn uninstall(hooks_dir: &Path) -> Result<UninstallOutcome> {
    let hook_path = hooks_dir.join(HOOK_NAME);

    if !hook_path.exists() {
        return Ok(UninstallOutcome::NotInstalled(hook_path));
    }

    let content = std::fs::read_to_string(&hook_path).map_err(|e| Error::io("read hook", e))?;
    if !content.contains(HOOK_MARKER) {
        return Ok(UninstallOutcome::Foreign(hook_path));
    }

    std::fs::remove_file(&hook_path).map_err(|e| Error::io("remove hook", e))?;

    let backup = backup_path(hooks_dir);
    Ok(UninstallOutcome::Removed {
        hook: hook_path,
        backup: backup.exists().then_some(backup),
    })
}

fn backup_path(hooks_dir: &Path) -> PathBuf {
    hooks_dir.join(format!("{HOOK_NAME}.bak"))
}
