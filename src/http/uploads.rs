//! Multipart image upload handling.
//!
//! Uploaded files land as static files in the uploads directory, which the
//! router serves under `/uploads`. Services only ever see the resulting
//! URL string.

use axum::extract::Multipart;
use std::path::Path;
use uuid::Uuid;

use super::error::AppError;

/// Read the named file field out of a multipart body, store it in the
/// uploads directory, and return the URL it is served under.
pub async fn store_image(
    uploads_dir: &Path,
    field_name: &str,
    mut multipart: Multipart,
) -> Result<String, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {}", e)))?
    {
        if field.name() != Some(field_name) {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload: {}", e)))?;

        let filename = format!("{}-{}", Uuid::new_v4(), sanitize(&original_name));
        let target = uploads_dir.join(&filename);
        tokio::fs::create_dir_all(uploads_dir)
            .await
            .map_err(|e| AppError::Internal(format!("create uploads dir: {}", e)))?;
        tokio::fs::write(&target, &data)
            .await
            .map_err(|e| AppError::Internal(format!("store upload: {}", e)))?;

        tracing::info!(file = %filename, bytes = data.len(), "image uploaded");
        return Ok(format!("/uploads/{}", filename));
    }

    Err(AppError::BadRequest("No file uploaded".to_string()))
}

/// Keep only characters that are safe in a filename served back over HTTP.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_path_separators() {
        assert_eq!(sanitize("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize("photo 1.png"), "photo_1.png");
        assert_eq!(sanitize(""), "upload");
    }
}
