//! Native image chooser.
//!
//! Runs `zenity` and falls back to `kdialog`. Both print the chosen path on
//! stdout and exit with status 1 when the user cancels.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::thread;

use futures::channel::oneshot;
use thiserror::Error;

pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

#[derive(Debug, Clone, Error)]
pub enum PickerError {
    #[error("No file chooser available (install zenity or kdialog)")]
    Unavailable,

    #[error("{program} failed: {reason}")]
    Failed { program: &'static str, reason: String },
}

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

fn zenity() -> Command {
    let mut command = Command::new("zenity");
    command.args([
        "--file-selection",
        "--title=Select image",
        "--file-filter=Images | *.png *.jpg *.jpeg *.gif *.PNG *.JPG *.JPEG *.GIF",
    ]);
    command
}

fn kdialog() -> Command {
    let mut command = Command::new("kdialog");
    command.args([
        "--title",
        "Select image",
        "--getopenfilename",
        ".",
        "*.png *.jpg *.jpeg *.gif|Images",
    ]);
    command
}

/// Interprets a chooser's exit: a path, a cancel, or a failure.
fn parse_output(program: &'static str, output: &Output) -> Result<Option<PathBuf>, PickerError> {
    match output.status.code() {
        Some(0) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let chosen = stdout.trim_end_matches(['\r', '\n']);
            Ok((!chosen.is_empty()).then(|| PathBuf::from(chosen)))
        }
        Some(1) => Ok(None),
        _ => Err(PickerError::Failed {
            program,
            reason: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        }),
    }
}

/// Blocks until the user picks an image or cancels.
pub fn pick_image() -> Result<Option<PathBuf>, PickerError> {
    let choosers: [(&'static str, fn() -> Command); 2] = [("zenity", zenity), ("kdialog", kdialog)];

    for (program, build) in choosers {
        match build().output() {
            Ok(output) => return parse_output(program, &output),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("{program} not found, trying next file chooser");
            }
            Err(err) => {
                return Err(PickerError::Failed {
                    program,
                    reason: err.to_string(),
                });
            }
        }
    }

    Err(PickerError::Unavailable)
}

/// [`pick_image`] on a dedicated thread, so the chooser never holds a worker
/// of the UI runtime while the user browses.
pub async fn pick_image_in_background() -> Result<Option<PathBuf>, PickerError> {
    off_thread(pick_image).await?
}

async fn off_thread<T, F>(job: F) -> Result<T, PickerError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (sender, receiver) = oneshot::channel();

    thread::Builder::new()
        .name(CHOOSER_THREAD.into())
        .spawn(move || {
            // The receiver is gone only if the app already exited.
            let _ = sender.send(job());
        })
        .map_err(|err| PickerError::Failed {
            program: CHOOSER_THREAD,
            reason: err.to_string(),
        })?;

    receiver.await.map_err(|_| PickerError::Failed {
        program: CHOOSER_THREAD,
        reason: "stopped without a result".to_owned(),
    })
}

const CHOOSER_THREAD: &str = "file chooser";
