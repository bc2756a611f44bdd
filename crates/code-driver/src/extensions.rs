// Helper extension installation
//
// Remote mode needs one or two helper extensions copied into extension
// directories before launch. The copy itself is a collaborator behind a
// narrow trait so tests (and callers with their own packaging) can substitute
// it.

use crate::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Copies a named helper extension into a target extensions directory
#[async_trait]
pub trait ExtensionCopier: Send + Sync {
    /// Copy the extension named `name` from the source checkout at
    /// `repo_root` into `target_dir`.
    async fn copy_extension(&self, repo_root: &Path, name: &str, target_dir: &Path) -> Result<()>;
}

/// Default copier: recursively copies `<repo_root>/extensions/<name>` into
/// `<target_dir>/<name>`.
#[derive(Debug, Default)]
pub struct FsExtensionCopier;

#[async_trait]
impl ExtensionCopier for FsExtensionCopier {
    async fn copy_extension(&self, repo_root: &Path, name: &str, target_dir: &Path) -> Result<()> {
        let source = repo_root.join("extensions").join(name);
        if !source.is_dir() {
            return Err(Error::InvalidPath(format!(
                "extension source not found: {}",
                source.display()
            )));
        }
        let dest = target_dir.join(name);
        tracing::debug!(
            "Copying extension '{}' to {}",
            name,
            target_dir.display()
        );
        copy_dir(&source, &dest).await
    }
}

/// Recursive directory copy. Iterative with an explicit worklist because
/// async recursion would need boxing.
async fn copy_dir(source: &Path, dest: &Path) -> Result<()> {
    let mut pending: Vec<(PathBuf, PathBuf)> = vec![(source.to_path_buf(), dest.to_path_buf())];

    while let Some((src, dst)) = pending.pop() {
        tokio::fs::create_dir_all(&dst).await?;
        let mut entries = tokio::fs::read_dir(&src).await?;
        while let Some(entry) = entries.next_entry().await? {
            let from = entry.path();
            let to = dst.join(entry.file_name());
            if entry.file_type().await?.is_dir() {
                pending.push((from, to));
            } else {
                tokio::fs::copy(&from, &to).await?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_copies_extension_tree() {
        let repo = tempfile::tempdir().unwrap();
        let ext = repo.path().join("extensions").join("vscode-test-resolver");
        fs::create_dir_all(ext.join("out")).unwrap();
        fs::write(ext.join("package.json"), "{}").unwrap();
        fs::write(ext.join("out").join("extension.js"), "exports = {}").unwrap();

        let target = tempfile::tempdir().unwrap();
        FsExtensionCopier
            .copy_extension(repo.path(), "vscode-test-resolver", target.path())
            .await
            .unwrap();

        let copied = target.path().join("vscode-test-resolver");
        assert!(copied.join("package.json").is_file());
        assert!(copied.join("out").join("extension.js").is_file());
    }

    #[tokio::test]
    async fn test_missing_source_is_an_error() {
        let repo = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let err = FsExtensionCopier
            .copy_extension(repo.path(), "nope", target.path())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPath(_)));
    }
}
