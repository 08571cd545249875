//! Multipart upload and file download plumbing shared by audio files and music

use crate::{ApiError, ApiResult};
use axum::{
    body::{Body, Bytes},
    extract::{Multipart, Request},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sonicstride_common::StoredAsset;
use std::collections::HashMap;
use std::str::FromStr;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

/// Upload bodies are capped at 100 MiB
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Reject an upload whose announced `Content-Length` exceeds the cap before
/// any of its body is read. Bodies without the header are still capped by
/// `DefaultBodyLimit` while streaming.
pub async fn reject_oversized_upload(request: Request, next: Next) -> ApiResult<Response> {
    let announced = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());

    if let Some(len) = announced {
        if len > MAX_UPLOAD_BYTES as u64 {
            warn!("Rejected upload of {} bytes (cap {})", len, MAX_UPLOAD_BYTES);
            return Err(ApiError::PayloadTooLarge(format!(
                "Upload of {} bytes exceeds the {} byte limit",
                len, MAX_UPLOAD_BYTES
            )));
        }
    }

    Ok(next.run(request).await)
}

/// File part of a multipart upload
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// Text fields plus the single file part of a multipart form
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    file: Option<UploadedFile>,
}

impl UploadForm {
    /// Drain the multipart stream, keeping the part named `file_field` as the file.
    ///
    /// A second part with that name is rejected.
    pub async fn read(mut multipart: Multipart, file_field: &str) -> ApiResult<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if name == file_field {
                if form.file.is_some() {
                    return Err(ApiError::BadRequest(format!(
                        "More than one '{}' part in the upload",
                        file_field
                    )));
                }
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| {
                        ApiError::BadRequest(format!("Part '{}' has no filename", file_field))
                    })?;
                let bytes = field.bytes().await?;
                debug!("Received file part '{}' ({} bytes)", filename, bytes.len());
                form.file = Some(UploadedFile { filename, bytes });
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Non-empty text field, trimmed
    pub fn required(&self, name: &str) -> ApiResult<String> {
        self.optional(name)
            .ok_or_else(|| ApiError::BadRequest(format!("Missing required field '{}'", name)))
    }

    /// Text field; absent and blank both read as `None`
    pub fn optional(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    pub fn required_parse<T>(&self, name: &str) -> ApiResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.required(name)?;
        parse_field(name, &raw)
    }

    pub fn optional_parse<T>(&self, name: &str) -> ApiResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(name)
            .map(|raw| parse_field(name, &raw))
            .transpose()
    }

    pub fn take_file(&mut self, name: &str) -> ApiResult<UploadedFile> {
        self.file
            .take()
            .ok_or_else(|| ApiError::BadRequest(format!("Missing file part '{}'", name)))
    }
}

fn parse_field<T>(name: &str, raw: &str) -> ApiResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| ApiError::BadRequest(format!("Invalid value for '{}': {}", name, e)))
}

/// Stream a stored file back as an attachment
pub fn download_response(asset: StoredAsset) -> ApiResult<Response> {
    let ascii_name: String = asset
        .download_name
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", ascii_name))
        .map_err(|e| ApiError::Internal(format!("Bad download name '{}': {}", ascii_name, e)))?;

    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        ),
        (header::CONTENT_DISPOSITION, disposition),
        (header::CONTENT_LENGTH, HeaderValue::from(asset.len)),
    ];

    let body = Body::from_stream(ReaderStream::new(asset.file));
    Ok((headers, body).into_response())
}
