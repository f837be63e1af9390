use std::process::Stdio;

use camino::Utf8Path;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::MediaError;

/// Replaced by the clip path in every template argument.
pub const CLIP_PLACEHOLDER: &str = "{clip}";

/// Plays clips through an external program, e.g. `mpv --fs --no-osc {clip}`.
///
/// The clip counts as finished when the process exits, whatever its status.
/// Stopping kills the process.
pub struct CommandClipPlayer {
    program: String,
    args: Vec<String>,
    current: Option<CancellationToken>,
}

impl CommandClipPlayer {
    /// Parse a shell-style template. Without a `{clip}` placeholder the clip
    /// path is appended as the last argument.
    pub fn from_template(template: &str) -> Result<Self, MediaError> {
        let parts =
            shlex::split(template).ok_or_else(|| MediaError::Template(template.to_string()))?;
        let (program, args) = parts
            .split_first()
            .ok_or_else(|| MediaError::Template(template.to_string()))?;

        let mut args = args.to_vec();
        if !args.iter().any(|a| a.contains(CLIP_PLACEHOLDER)) {
            args.push(CLIP_PLACEHOLDER.to_string());
        }

        Ok(Self {
            program: program.clone(),
            args,
            current: None,
        })
    }

    pub(crate) fn resolve(&self, clip: &Utf8Path) -> (String, Vec<String>) {
        let args = self
            .args
            .iter()
            .map(|a| a.replace(CLIP_PLACEHOLDER, clip.as_str()))
            .collect();
        (self.program.clone(), args)
    }

    pub fn play(&mut self, clip: &Utf8Path) -> Result<oneshot::Receiver<()>, MediaError> {
        self.stop();

        let (program, args) = self.resolve(clip);
        let mut child = tokio::process::Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| MediaError::Spawn {
                program: program.clone(),
                source,
            })?;
        info!(%program, %clip, "player started");

        let (done, finished) = oneshot::channel();
        let token = CancellationToken::new();
        self.current = Some(token.clone());

        tokio::spawn(async move {
            let exited = tokio::select! {
                _ = token.cancelled() => None,
                status = child.wait() => Some(status),
            };

            match exited {
                None => {
                    let _ = child.kill().await;
                    debug!(%program, "player stopped");
                }
                Some(status) => {
                    match status {
                        Ok(status) if status.success() => debug!(%program, "player finished"),
                        Ok(status) => warn!(%program, %status, "player exited with failure"),
                        Err(e) => warn!(%program, error = %e, "failed waiting for player"),
                    }
                    let _ = done.send(());
                }
            }
        });

        Ok(finished)
    }

    pub fn stop(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }
}

impl Drop for CommandClipPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}
