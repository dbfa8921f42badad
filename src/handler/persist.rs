//! Body persistence
//!
//! Writes a raw request body to a single file, or every file part of a
//! multipart form into a destination directory. Any failure aborts the whole
//! request; files already written for the same form are left in place.

use hyper::body::Bytes;
use multer::Multipart;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use super::error::HandlerError;
use crate::logger;

/// Write `body` verbatim to `dest`, replacing any existing file
pub async fn write_raw(dest: &Path, body: &Bytes) -> Result<(), HandlerError> {
    if tokio::fs::metadata(dest)
        .await
        .is_ok_and(|meta| meta.is_dir())
    {
        return Err(HandlerError::DestinationIsDirectory(dest.to_path_buf()));
    }

    let mut file = create_file(dest).await?;
    write_chunk(&mut file, dest, body).await?;
    finish_file(&mut file, dest).await
}

/// Save each uploaded file of `multipart` as `<dest_dir>/<file name>`
///
/// Non-file values are drained and must stay within `form_memory_limit` bytes in total.
/// Returns the written paths in upload order.
pub async fn write_multipart(
    dest_dir: &Path,
    mut multipart: Multipart<'_>,
    form_memory_limit: usize,
) -> Result<Vec<PathBuf>, HandlerError> {
    let mut saved = Vec::new();
    let mut form_bytes = 0usize;

    while let Some(mut field) = multipart.next_field().await? {
        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_owned);

        let Some(file_name) = file_name else {
            while let Some(chunk) = field.chunk().await? {
                form_bytes += chunk.len();
                if form_bytes > form_memory_limit {
                    return Err(HandlerError::FormTooLarge {
                        limit: form_memory_limit,
                    });
                }
            }
            continue;
        };

        let name = upload_file_name(&file_name)
            .ok_or_else(|| HandlerError::InvalidFileName(file_name.clone()))?;
        let path = dest_dir.join(name);

        let mut file = create_file(&path).await?;
        while let Some(chunk) = field.chunk().await? {
            write_chunk(&mut file, &path, &chunk).await?;
        }
        finish_file(&mut file, &path).await?;

        logger::log_info(&format!("Saved file: {}", path.display()));
        saved.push(path);
    }

    logger::log_info(&format!("Received form data with {} files", saved.len()));
    Ok(saved)
}

/// Final path component of a client-supplied file name
///
/// `None` when nothing usable remains (`""`, `"."`, `".."`, `"/"`).
fn upload_file_name(name: &str) -> Option<&str> {
    Path::new(name).file_name().and_then(|n| n.to_str())
}

async fn create_file(path: &Path) -> Result<File, HandlerError> {
    File::create(path)
        .await
        .map_err(|source| HandlerError::CreateFile {
            path: path.to_path_buf(),
            source,
        })
}

async fn write_chunk(file: &mut File, path: &Path, chunk: &[u8]) -> Result<(), HandlerError> {
    file.write_all(chunk)
        .await
        .map_err(|source| HandlerError::WriteFile {
            path: path.to_path_buf(),
            source,
        })
}

/// Flush pending writes so the file is complete before the response goes out
async fn finish_file(file: &mut File, path: &Path) -> Result<(), HandlerError> {
    file.flush()
        .await
        .map_err(|source| HandlerError::WriteFile {
            path: path.to_path_buf(),
            source,
        })
}
