//! Screen capture providers.
//!
//! A provider first resolves a screen source, then encodes one still image
//! from it. Either step may fail; the scheduler records a permission gap
//! instead of an image when that happens.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

/// Opaque identifier of a capturable screen (an X11 display, a Wayland
/// socket, a monitor name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceId(pub String);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to launch capture command: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("capture timed out after {0:?}")]
    Timeout(Duration),

    #[error("capture command exited with {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("capture produced no image data")]
    Empty,
}

/// Source of still images for the screenshot scheduler.
#[async_trait]
pub trait CaptureProvider: Send + Sync {
    /// The screen to capture, or `None` when permission is denied or no
    /// screen is available.
    async fn acquire_source_id(&self) -> Option<SourceId>;

    /// Encode one still image (PNG or JPEG) from `source`.
    async fn capture_still(&self, source: &SourceId) -> Result<Vec<u8>, CaptureError>;
}

/// Provider that never has a source. Every tick becomes a permission gap.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCaptureProvider;

#[async_trait]
impl CaptureProvider for DisabledCaptureProvider {
    async fn acquire_source_id(&self) -> Option<SourceId> {
        None
    }

    async fn capture_still(&self, _source: &SourceId) -> Result<Vec<u8>, CaptureError> {
        Err(CaptureError::Empty)
    }
}

/// Captures by running an external program (`grim`, `import`,
/// `screencapture`...) with the source id as its last argument and reading
/// the encoded image from stdout.
#[derive(Debug, Clone)]
pub struct CommandCaptureProvider {
    program: String,
    args: Vec<String>,
    source: Option<String>,
    timeout: Duration,
}

impl CommandCaptureProvider {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        source: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            source,
            timeout,
        }
    }

    /// Build from a whitespace-separated command line. `None` if empty.
    pub fn from_command_line(
        command_line: &str,
        source: Option<String>,
        timeout: Duration,
    ) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect(), source, timeout))
    }
}

#[async_trait]
impl CaptureProvider for CommandCaptureProvider {
    async fn acquire_source_id(&self) -> Option<SourceId> {
        self.source
            .clone()
            .or_else(|| std::env::var("WAYLAND_DISPLAY").ok())
            .or_else(|| std::env::var("DISPLAY").ok())
            .filter(|s| !s.trim().is_empty())
            .map(SourceId)
    }

    async fn capture_still(&self, source: &SourceId) -> Result<Vec<u8>, CaptureError> {
        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.program)
                .args(&self.args)
                .arg(&source.0)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| CaptureError::Timeout(self.timeout))??;

        if !output.status.success() {
            return Err(CaptureError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if output.stdout.is_empty() {
            return Err(CaptureError::Empty);
        }
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn source() -> SourceId {
        SourceId(":0".into())
    }

    #[tokio::test]
    async fn disabled_provider_has_no_source() {
        assert!(DisabledCaptureProvider.acquire_source_id().await.is_none());
    }

    #[tokio::test]
    async fn configured_source_wins() {
        let provider = CommandCaptureProvider::new(
            "true",
            vec![],
            Some(":7".into()),
            Duration::from_secs(1),
        );
        assert_eq!(provider.acquire_source_id().await, Some(SourceId(":7".into())));
    }

    #[test]
    fn command_line_is_split_on_whitespace() {
        let provider =
            CommandCaptureProvider::from_command_line("grim -t png -", None, Duration::from_secs(1))
                .unwrap();
        assert_eq!(provider.program, "grim");
        assert_eq!(provider.args, vec!["-t", "png", "-"]);

        assert!(CommandCaptureProvider::from_command_line("   ", None, Duration::from_secs(1))
            .is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stdout_is_the_image() {
        let provider = CommandCaptureProvider::new("echo", vec![], None, Duration::from_secs(5));
        let bytes = provider.capture_still(&source()).await.unwrap();
        assert_eq!(bytes, b":0\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_is_reported() {
        let provider = CommandCaptureProvider::new("false", vec![], None, Duration::from_secs(5));
        assert_matches!(
            provider.capture_still(&source()).await,
            Err(CaptureError::Failed { .. })
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn empty_output_is_reported() {
        let provider = CommandCaptureProvider::new("true", vec![], None, Duration::from_secs(5));
        assert_matches!(
            provider.capture_still(&source()).await,
            Err(CaptureError::Empty)
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_command_times_out() {
        let provider = CommandCaptureProvider::new(
            "sh",
            vec!["-c".into(), "sleep 5".into(), "capture".into()],
            None,
            Duration::from_millis(50),
        );
        assert_matches!(
            provider.capture_still(&source()).await,
            Err(CaptureError::Timeout(_))
        );
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let provider = CommandCaptureProvider::new(
            "worktrace-no-such-capture-program",
            vec![],
            None,
            Duration::from_secs(1),
        );
        assert_matches!(
            provider.capture_still(&source()).await,
            Err(CaptureError::Spawn(_))
        );
    }
}
