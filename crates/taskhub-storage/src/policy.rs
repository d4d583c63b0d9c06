//! Upload policy enforcement.
//!
//! Every upload passes through here before anything touches disk:
//!
//! - **Avatars** — at most 5 MB, and the payload must carry a recognized
//!   image signature. The declared content type is ignored; the bytes decide.
//! - **Chat attachments** — at most 10 MB, extension must be on the
//!   allow-list.
//! - **Task attachments** — at most 20 MB, same allow-list, and at most 5
//!   per task (the count is enforced by the service, which owns the
//!   attachment repository).

use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;

/// Maximum avatar size in bytes (5 MB).
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// Maximum chat attachment size in bytes (10 MB).
pub const MAX_CHAT_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024;

/// Maximum task attachment size in bytes (20 MB).
pub const MAX_TASK_ATTACHMENT_BYTES: usize = 20 * 1024 * 1024;

/// Maximum number of attachments a single task may carry.
pub const MAX_ATTACHMENTS_PER_TASK: i64 = 5;

/// Extensions accepted for chat and task attachments, with their MIME types.
const ALLOWED_ATTACHMENT_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("pdf", "application/pdf"),
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("ppt", "application/vnd.ms-powerpoint"),
    (
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    ("zip", "application/zip"),
];

/// An upload that passed policy checks.
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    /// Sanitized original file name.
    pub file_name: String,
    /// Lowercase file extension.
    pub extension: String,
    /// MIME type derived from the extension (avatars: from the image
    /// signature).
    pub mime_type: String,
    /// Payload size in bytes.
    pub size_bytes: u64,
}

/// Gatekeeper for all file uploads.
#[derive(Debug, Clone, Default)]
pub struct UploadPolicy;

impl UploadPolicy {
    /// Creates a new upload policy.
    pub fn new() -> Self {
        Self
    }

    /// Validates an avatar upload. The payload must be a real image;
    /// the file name and declared content type are not trusted.
    pub fn validate_avatar(&self, file_name: &str, data: &[u8]) -> AppResult<ValidatedUpload> {
        if data.is_empty() {
            return Err(AppError::validation("Avatar file is empty"));
        }
        if data.len() > MAX_AVATAR_BYTES {
            return Err(AppError::payload_too_large(format!(
                "Avatar exceeds the {} MB limit",
                MAX_AVATAR_BYTES / (1024 * 1024)
            )));
        }

        let format = image::guess_format(data)
            .map_err(|_| AppError::validation("Avatar must be an image file"))?;

        let extension = format
            .extensions_str()
            .first()
            .copied()
            .unwrap_or("img")
            .to_string();

        Ok(ValidatedUpload {
            file_name: sanitize_file_name(file_name),
            extension,
            mime_type: format.to_mime_type().to_string(),
            size_bytes: data.len() as u64,
        })
    }

    /// Validates a chat attachment upload.
    pub fn validate_chat_attachment(
        &self,
        file_name: &str,
        data: &[u8],
    ) -> AppResult<ValidatedUpload> {
        self.validate_attachment(file_name, data, MAX_CHAT_ATTACHMENT_BYTES)
    }

    /// Validates a task attachment upload. The per-task count limit is
    /// checked separately by the caller.
    pub fn validate_task_attachment(
        &self,
        file_name: &str,
        data: &[u8],
    ) -> AppResult<ValidatedUpload> {
        self.validate_attachment(file_name, data, MAX_TASK_ATTACHMENT_BYTES)
    }

    fn validate_attachment(
        &self,
        file_name: &str,
        data: &[u8],
        max_bytes: usize,
    ) -> AppResult<ValidatedUpload> {
        if data.is_empty() {
            return Err(AppError::validation("Attachment file is empty"));
        }
        if data.len() > max_bytes {
            return Err(AppError::payload_too_large(format!(
                "Attachment exceeds the {} MB limit",
                max_bytes / (1024 * 1024)
            )));
        }

        let file_name = sanitize_file_name(file_name);
        let extension = extension_of(&file_name)
            .ok_or_else(|| AppError::validation("Attachment must have a file extension"))?;

        let mime_type = ALLOWED_ATTACHMENT_TYPES
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, mime)| (*mime).to_string())
            .ok_or_else(|| {
                AppError::validation(format!("File type '.{extension}' is not allowed"))
            })?;

        Ok(ValidatedUpload {
            file_name,
            extension,
            mime_type,
            size_bytes: data.len() as u64,
        })
    }
}

/// Strips path components and control characters from a client-supplied
/// file name. Falls back to "file" when nothing survives.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string();

    if base.is_empty() || base == "." || base == ".." {
        "file".to_string()
    } else {
        base
    }
}

/// Lowercase extension of a file name, if any.
fn extension_of(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use taskhub_core::error::ErrorKind;

    use super::*;

    // Magic bytes are all guess_format needs.
    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    #[test]
    fn test_avatar_accepts_real_image() {
        let policy = UploadPolicy::new();
        let checked = policy.validate_avatar("me.png", PNG_HEADER).unwrap();
        assert_eq!(checked.extension, "png");
        assert_eq!(checked.mime_type, "image/png");
    }

    #[test]
    fn test_avatar_rejects_non_image_regardless_of_name() {
        let policy = UploadPolicy::new();
        let err = policy
            .validate_avatar("fake.png", b"#!/bin/sh\necho hi")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_avatar_rejects_oversized_image() {
        let policy = UploadPolicy::new();
        let mut data = PNG_HEADER.to_vec();
        data.resize(MAX_AVATAR_BYTES + 1, 0);
        let err = policy.validate_avatar("big.png", &data).unwrap_err();
        assert_eq!(err.kind, ErrorKind::PayloadTooLarge);
    }

    #[test]
    fn test_attachment_allow_list() {
        let policy = UploadPolicy::new();
        assert!(
            policy
                .validate_chat_attachment("notes.pdf", b"%PDF-1.4")
                .is_ok()
        );
        let err = policy
            .validate_chat_attachment("tool.exe", b"MZ")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_attachment_without_extension_rejected() {
        let policy = UploadPolicy::new();
        assert!(policy.validate_task_attachment("README", b"hello").is_err());
    }

    #[test]
    fn test_task_attachment_size_cap() {
        let policy = UploadPolicy::new();
        let data = vec![0u8; MAX_TASK_ATTACHMENT_BYTES + 1];
        let err = policy
            .validate_task_attachment("dump.zip", &data)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PayloadTooLarge);

        // Chat cap is lower than the task cap.
        let mid = vec![0u8; MAX_CHAT_ATTACHMENT_BYTES + 1];
        assert!(policy.validate_task_attachment("dump.zip", &mid).is_ok());
        assert!(policy.validate_chat_attachment("dump.zip", &mid).is_err());
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\x\\doc.pdf"), "doc.pdf");
        assert_eq!(sanitize_file_name(""), "file");
        assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
    }
}
