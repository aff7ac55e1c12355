//! Live git adapter using `git` CLI commands.

use std::path::Path;
use std::process::Command;

use crate::error::PortError;
use crate::paths;
use crate::ports::git::GitRepo;

/// Live git adapter that shells out to the `git` CLI.
pub struct LiveGitRepo;

impl GitRepo for LiveGitRepo {
    fn show_file(
        &self,
        root: &Path,
        rev: &str,
        path: &Path,
    ) -> Result<Option<String>, PortError> {
        let relative = paths::relative_to(root, path);
        // `./` makes the path relative to `root` rather than the repository top.
        let object = format!("{rev}:./{relative}");

        // `cat-file -e` distinguishes "absent at rev" from a real failure.
        let probe = Command::new("git").current_dir(root).args(["cat-file", "-e", &object]).output()?;
        if !probe.status.success() {
            let verify =
                Command::new("git").current_dir(root).args(["rev-parse", "--verify", rev]).output()?;
            if !verify.status.success() {
                let stderr = String::from_utf8_lossy(&verify.stderr);
                return Err(format!("git rev-parse --verify {rev} failed: {stderr}").into());
            }
            return Ok(None);
        }

        let output = Command::new("git").current_dir(root).args(["show", &object]).output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("git show {object} failed: {stderr}").into());
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    }

    fn changed_files(&self, root: &Path, rev: &str) -> Result<Vec<String>, PortError> {
        let output = Command::new("git")
            .current_dir(root)
            .args(["diff", "--name-only", "--relative", rev])
            .output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("git diff --name-only {rev} failed: {stderr}").into());
        }
        let files = String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(String::from)
            .collect();
        Ok(files)
    }
}
