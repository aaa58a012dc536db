use crate::utils::error::{RelayError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    AlreadyPresent,
    Cloned,
}

/// 確認 scraper 工作目錄存在，不存在時 git clone
pub async fn ensure_scraper(repo_url: &str, root: &Path) -> Result<Provisioned> {
    if root.exists() {
        tracing::debug!("Scraper found at {}", root.display());
        return Ok(Provisioned::AlreadyPresent);
    }

    tracing::info!(
        "📥 Scraper not found at {}, cloning from {}",
        root.display(),
        repo_url
    );

    if let Some(parent) = root.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let output = Command::new("git")
        .arg("clone")
        .arg(repo_url)
        .arg(root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|source| RelayError::SpawnError {
            program: "git".to_string(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::error!("git clone exited with {}: {}", output.status, stderr);
        return Err(RelayError::CloneError {
            repo_url: repo_url.to_string(),
            message: stderr,
        });
    }

    tracing::info!("✅ Scraper cloned to {}", root.display());
    Ok(Provisioned::Cloned)
}

pub fn scripts_dir(root: &Path) -> PathBuf {
    root.join("scripts")
}

pub fn script_path(root: &Path, command: &str) -> Result<PathBuf> {
    let path = scripts_dir(root).join(format!("{}.py", command));
    if !path.is_file() {
        return Err(RelayError::ScriptNotFound { path });
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_existing_checkout_is_reused() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("rpscrape");
        std::fs::create_dir_all(&root).unwrap();

        let provisioned = ensure_scraper("https://invalid.example/repo.git", &root)
            .await
            .unwrap();
        assert_eq!(provisioned, Provisioned::AlreadyPresent);
    }

    fn git(args: &[&str], dir: &Path) {
        let status = std::process::Command::new("git")
            .args(["-c", "user.name=relay", "-c", "user.email=relay@example.com"])
            .args(args)
            .current_dir(dir)
            .status()
            .unwrap();
        assert!(status.success(), "git {:?} failed", args);
    }

    #[tokio::test]
    async fn test_missing_checkout_is_cloned() {
        let dir = TempDir::new().unwrap();
        let upstream = dir.path().join("upstream");
        std::fs::create_dir_all(upstream.join("scripts")).unwrap();
        std::fs::write(upstream.join("scripts").join("racecards.py"), "print('ok')\n").unwrap();
        git(&["init", "-q"], &upstream);
        git(&["add", "."], &upstream);
        git(&["commit", "-q", "-m", "init"], &upstream);

        let repo_url = url::Url::from_file_path(&upstream).unwrap().to_string();
        let root = dir.path().join("work").join("rpscrape");

        let provisioned = ensure_scraper(&repo_url, &root).await.unwrap();
        assert_eq!(provisioned, Provisioned::Cloned);
        assert!(script_path(&root, "racecards").is_ok());

        let again = ensure_scraper(&repo_url, &root).await.unwrap();
        assert_eq!(again, Provisioned::AlreadyPresent);
    }

    #[tokio::test]
    async fn test_clone_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("rpscrape");
        let missing_repo = dir.path().join("no-such-repo");

        let result = ensure_scraper(&missing_repo.to_string_lossy(), &root).await;
        match result {
            Err(RelayError::CloneError { repo_url, message }) => {
                assert_eq!(repo_url, missing_repo.to_string_lossy());
                assert!(!message.is_empty());
            }
            other => panic!("expected CloneError, got {:?}", other),
        }
        assert!(!root.exists());
    }

    #[test]
    fn test_script_path() {
        let dir = TempDir::new().unwrap();
        let scripts = scripts_dir(dir.path());
        std::fs::create_dir_all(&scripts).unwrap();
        std::fs::write(scripts.join("racecards.py"), "print('hi')").unwrap();

        assert_eq!(
            script_path(dir.path(), "racecards").unwrap(),
            scripts.join("racecards.py")
        );
        match script_path(dir.path(), "racedays") {
            Err(RelayError::ScriptNotFound { path }) => {
                assert!(path.ends_with("scripts/racedays.py"))
            }
            other => panic!("expected ScriptNotFound, got {:?}", other),
        }
    }
}
