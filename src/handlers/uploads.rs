use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::extract::{multipart::MultipartRejection, Multipart};

use crate::error::ApiError;

#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Text fields plus the single file field named by the caller
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl UploadForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }
}

/// Reads the whole form, reporting a rejected or malformed body under `context`
pub async fn read_form(
    multipart: Result<Multipart, MultipartRejection>,
    file_field: &str,
    context: &str,
) -> Result<UploadForm, ApiError> {
    let mut multipart = multipart.map_err(|rejection| ApiError::bad_request(context, rejection.body_text()))?;
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(context, e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == file_field {
            let file_name = field.file_name().map(sanitize_file_name).unwrap_or_default();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(context, e.body_text()))?;
            form.file = Some(UploadedFile {
                file_name,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(context, e.body_text()))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

/// Keeps only the final path component of a client-supplied name
pub fn sanitize_file_name(name: &str) -> String {
    let normalized = name.replace('\\', "/");
    Path::new(&normalized)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Extension including the leading dot, or empty
pub fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// `"{user_id}-{original}"`, or `"{user_id}-{alias}{ext}"` when an alias is given
pub fn avatar_file_name(user_id: i64, original: &str, alias: Option<&str>) -> String {
    match alias.map(sanitize_file_name).filter(|a| !a.is_empty()) {
        Some(alias) => format!("{}-{}{}", user_id, alias, extension_of(original)),
        None => format!("{}-{}", user_id, original),
    }
}

pub fn campaign_image_file_name(campaign_id: i64, user_id: i64, original: &str) -> String {
    format!("campaign-{}-{}-{}", campaign_id, user_id, original)
}

pub async fn store(upload_dir: &Path, file_name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(upload_dir).await?;
    let location = upload_dir.join(file_name);
    tokio::fs::write(&location, bytes).await?;
    Ok(location)
}
