//! Screenshot capture through an external command, and preview thumbnails.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::context::CaptureError;

/// Placeholder in the command argv replaced by the output file path.
pub const PATH_PLACEHOLDER: &str = "{path}";

#[derive(Debug, Clone)]
pub struct CommandCapture {
    command: Option<Vec<String>>,
    dir: PathBuf,
}

impl CommandCapture {
    /// `command` is argv with [`PATH_PLACEHOLDER`]; `None` means capture is unavailable.
    pub fn new(command: Option<Vec<String>>, dir: PathBuf) -> Self {
        Self { command, dir }
    }

    /// Fresh output path in the screenshot directory.
    pub fn next_path(&self) -> PathBuf {
        self.dir.join(format!("{}.png", uuid::Uuid::new_v4()))
    }

    /// Run the capture command and return the written file.
    #[instrument(skip(self))]
    pub async fn capture(&self) -> Result<PathBuf, CaptureError> {
        let argv = self.command.as_ref().ok_or(CaptureError::NoCommand)?;
        let (program, args) = argv.split_first().ok_or(CaptureError::NoCommand)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.next_path();
        let path_str = path.to_string_lossy();
        let args: Vec<String> = args
            .iter()
            .map(|a| a.replace(PATH_PLACEHOLDER, &path_str))
            .collect();

        let output = Command::new(program)
            .args(&args)
            .output()
            .await
            .map_err(|e| CaptureError::Command {
                command: program.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(CaptureError::Command {
                command: program.clone(),
                reason: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        if !tokio::fs::try_exists(&path).await? {
            return Err(CaptureError::MissingOutput { path });
        }

        debug!(path = %path.display(), "Screenshot written");
        Ok(path)
    }
}

/// PNG thumbnail of an image as a `data:` URL, longest edge at most `max_size`.
pub fn preview_data_url(path: &Path, max_size: u32) -> Result<String, CaptureError> {
    let image_error = |reason: String| CaptureError::Image {
        path: path.to_path_buf(),
        reason,
    };

    let image = image::open(path).map_err(|e| image_error(e.to_string()))?;
    let thumbnail = image.thumbnail(max_size, max_size);

    let mut png_data = Vec::new();
    thumbnail
        .write_to(&mut Cursor::new(&mut png_data), image::ImageFormat::Png)
        .map_err(|e| image_error(e.to_string()))?;

    Ok(format!("data:image/png;base64,{}", BASE64.encode(&png_data)))
}

/// [`preview_data_url`] off the event loop thread.
pub async fn preview_data_url_async(path: &Path, max_size: u32) -> Result<String, CaptureError> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || preview_data_url(&owned, max_size))
        .await
        .map_err(|e| CaptureError::Image {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
}
