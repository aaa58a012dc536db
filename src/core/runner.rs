use crate::utils::error::{RelayError, Result};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;

#[derive(Debug, Clone)]
pub struct ScriptInvocation {
    pub interpreter: String,
    pub script_file: String,
    pub date: String,
    pub working_dir: PathBuf,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ScriptOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

/// 執行 `<interpreter> <script> <date>`，逾時則終止子程序
pub async fn run_script(invocation: &ScriptInvocation) -> Result<ScriptOutput> {
    tracing::info!(
        interpreter = %invocation.interpreter,
        script = %invocation.script_file,
        date = %invocation.date,
        working_dir = %invocation.working_dir.display(),
        timeout_secs = invocation.timeout.as_secs(),
        "▶️ Executing scraper script"
    );

    let start = Instant::now();
    let child = Command::new(&invocation.interpreter)
        .arg(&invocation.script_file)
        .arg(&invocation.date)
        .current_dir(&invocation.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| RelayError::SpawnError {
            program: invocation.interpreter.clone(),
            source,
        })?;

    // 逾時時 future 被丟棄，kill_on_drop 會終止子程序
    let output = match timeout(invocation.timeout, child.wait_with_output()).await {
        Ok(result) => result?,
        Err(_) => {
            tracing::error!(
                "Script execution timed out after {:?}",
                invocation.timeout
            );
            return Err(RelayError::TimeoutError {
                seconds: invocation.timeout.as_secs(),
            });
        }
    };

    let result = ScriptOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        duration: start.elapsed(),
    };

    if !output.status.success() {
        tracing::error!(
            "Script failed with code {:?}: {}",
            result.exit_code,
            result.stderr.trim()
        );
        tracing::error!("stdout: {}", result.stdout.trim());
        return Err(RelayError::ScriptFailed {
            code: result.exit_code,
            stderr: result.stderr.trim().to_string(),
        });
    }

    tracing::info!(
        duration_ms = result.duration.as_millis() as u64,
        stdout_bytes = result.stdout.len(),
        "✅ Script executed successfully"
    );

    Ok(result)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn invocation(dir: &TempDir, body: &str, timeout: Duration) -> ScriptInvocation {
        std::fs::write(dir.path().join("racecards.py"), body).unwrap();
        ScriptInvocation {
            interpreter: "sh".to_string(),
            script_file: "racecards.py".to_string(),
            date: "today".to_string(),
            working_dir: dir.path().to_path_buf(),
            timeout,
        }
    }

    #[tokio::test]
    async fn test_captures_stdout_and_argument() {
        let dir = TempDir::new().unwrap();
        let inv = invocation(&dir, "echo \"date=$1\"\n", Duration::from_secs(10));

        let output = run_script(&inv).await.unwrap();
        assert_eq!(output.exit_code, Some(0));
        assert_eq!(output.stdout.trim(), "date=today");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_an_error() {
        let dir = TempDir::new().unwrap();
        let inv = invocation(&dir, "echo oops >&2\nexit 3\n", Duration::from_secs(10));

        match run_script(&inv).await {
            Err(RelayError::ScriptFailed { code, stderr }) => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "oops");
            }
            other => panic!("expected ScriptFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_kills_script() {
        let dir = TempDir::new().unwrap();
        let inv = invocation(&dir, "sleep 5\n", Duration::from_millis(200));

        let start = Instant::now();
        let result = run_script(&inv).await;
        assert!(matches!(result, Err(RelayError::TimeoutError { .. })));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_missing_interpreter() {
        let dir = TempDir::new().unwrap();
        let mut inv = invocation(&dir, "", Duration::from_secs(1));
        inv.interpreter = "definitely-not-an-interpreter-xyz".to_string();

        assert!(matches!(
            run_script(&inv).await,
            Err(RelayError::SpawnError { .. })
        ));
    }
}
