//! Runner for the external gpg binary.
//!
//! The library core only produces argument lists and consumes captured
//! output; spawning the subprocess, the invocation timeout and the
//! missing-binary precondition live here.

use std::error::Error;
use std::path::PathBuf;
use std::process::Output;
use std::time::Duration;

use gpg_keyscan::invocation;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Handle to the gpg binary with an explicit per-invocation timeout.
pub struct GpgTool {
    program: PathBuf,
    timeout: Duration,
}

impl GpgTool {
    pub const fn new(program: PathBuf, timeout: Duration) -> Self {
        Self { program, timeout }
    }

    /// Capture the secret-key listing, optionally narrowed to one primary
    /// key fingerprint.
    pub async fn secret_key_listing(
        &self,
        primary: Option<&str>,
    ) -> Result<String, Box<dyn Error>> {
        let output = self
            .run(&invocation::secret_key_listing_args(primary))
            .await?;
        if !output.status.success() {
            return Err(format!(
                "gpg exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )
            .into());
        }
        Ok(String::from_utf8(output.stdout)?)
    }

    /// Capture card status, or `None` when no card is present.
    ///
    /// gpg exits non-zero when no card is inserted; that is a normal
    /// outcome here, not an error.
    pub async fn card_status(&self) -> Result<Option<String>, Box<dyn Error>> {
        let output = self.run(&invocation::card_status_args()).await?;
        if !output.status.success() {
            debug!(
                "gpg --card-status exited with {}; treating as no card present",
                output.status
            );
            return Ok(None);
        }
        Ok(Some(String::from_utf8(output.stdout)?))
    }

    async fn run(&self, args: &[String]) -> Result<Output, Box<dyn Error>> {
        debug!("running {:?} {}", self.program, args.join(" "));

        let result = timeout(
            self.timeout,
            Command::new(&self.program).args(args).output(),
        )
        .await;

        match result {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(gpg_keyscan::Error::ToolUnavailable {
                    program: self.program.display().to_string(),
                }
                .into())
            }
            Ok(Err(err)) => Err(err.into()),
            Err(_) => Err(format!(
                "gpg did not finish within {} second(s)",
                self.timeout.as_secs()
            )
            .into()),
        }
    }
}
