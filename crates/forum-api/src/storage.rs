use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

/// Route prefix the media directory is served under.
pub const MEDIA_ROUTE: &str = "/media";

const POST_IMAGE_DIR: &str = "post";
const MAX_NAME_ATTEMPTS: usize = 5;

/// Manages uploaded media on disk.
///
/// Paths handed out are relative to the media root (`post/{name}`) and are
/// what the store records; [`public_url`] turns them into URLs.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub async fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(root.join(POST_IMAGE_DIR)).await?;
        info!("Media directory: {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write an uploaded post image under a fresh generated name and return
    /// its relative path.
    pub async fn store_post_image(&self, post_id: i64, original_name: &str, data: &[u8]) -> Result<String> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = post_image_name(post_id, unix_nanos(), original_name);
            let relative = format!("{POST_IMAGE_DIR}/{name}");

            let path = self.root.join(&relative);
            let opened = fs::OpenOptions::new().write(true).create_new(true).open(&path).await;

            let file = match opened {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };

            fill_new_file(&path, file, data).await?;
            return Ok(relative);
        }

        bail!("could not find a free name for {}", original_name)
    }

    /// Remove a stored file. A file that is already gone is not an error.
    pub async fn delete_file(&self, relative: &str) -> Result<()> {
        let path = self.root.join(relative);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Media file {} already gone", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Write `data` into a file this call just created. A failed write removes
/// the file again so no partial upload stays on disk.
async fn fill_new_file<W>(path: &Path, mut file: W, data: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        file.write_all(data).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = written {
        drop(file);
        if let Err(rm) = fs::remove_file(path).await {
            warn!("Failed to remove partial upload {}: {}", path.display(), rm);
        }
        return Err(e.into());
    }
    Ok(())
}

pub fn public_url(relative: &str) -> String {
    format!("{MEDIA_ROUTE}/{relative}")
}

/// `{post_id}-{nanos}-{name}` with the client's file name reduced to its last
/// path component and stripped of whitespace.
pub fn post_image_name(post_id: i64, nanos: i64, original_name: &str) -> String {
    format!("{}-{}-{}", post_id, nanos, sanitize_file_name(original_name))
}

fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base.chars().filter(|c| !c.is_whitespace()).collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}

fn unix_nanos() -> i64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
}
