//! Avatar upload acceptance rules.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::{AVATAR_CONTENT_TYPES, MAX_AVATAR_BYTES};
use crate::errors::{AppError, AppResult};

/// Image formats accepted as avatars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarFormat {
    Jpeg,
    Png,
    Webp,
}

impl AvatarFormat {
    fn from_content_type(content_type: &str) -> Option<Self> {
        if !AVATAR_CONTENT_TYPES.contains(&content_type) {
            return None;
        }
        match content_type {
            "image/jpeg" | "image/jpg" => Some(AvatarFormat::Jpeg),
            "image/png" => Some(AvatarFormat::Png),
            "image/webp" => Some(AvatarFormat::Webp),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AvatarFormat::Jpeg => "jpg",
            AvatarFormat::Png => "png",
            AvatarFormat::Webp => "webp",
        }
    }
}

/// An uploaded image that passed the type and size checks.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub format: AvatarFormat,
    pub bytes: Vec<u8>,
}

impl AvatarUpload {
    /// Accept an uploaded file, rejecting unsupported types and oversize
    /// payloads with a client error.
    pub fn accept(content_type: Option<&str>, bytes: Vec<u8>) -> AppResult<Self> {
        let format = content_type
            .and_then(AvatarFormat::from_content_type)
            .ok_or_else(|| AppError::bad_request("Only JPEG, PNG and WebP images are allowed"))?;

        if bytes.len() > MAX_AVATAR_BYTES {
            return Err(too_large());
        }

        Ok(Self { format, bytes })
    }

    /// File name for this upload: `{userId}_{epochMillis}.{ext}`.
    pub fn file_name(&self, user_id: Uuid, at: DateTime<Utc>) -> String {
        format!(
            "{}_{}.{}",
            user_id,
            at.timestamp_millis(),
            self.format.extension()
        )
    }
}

/// Error returned when an upload exceeds the avatar size cap.
pub fn too_large() -> AppError {
    AppError::bad_request(format!(
        "File too large. Maximum size allowed is {}MB for images.",
        MAX_AVATAR_BYTES / (1024 * 1024)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_accepts_allowed_types() {
        for (content_type, ext) in [
            ("image/jpeg", "jpg"),
            ("image/jpg", "jpg"),
            ("image/png", "png"),
            ("image/webp", "webp"),
        ] {
            let upload = AvatarUpload::accept(Some(content_type), vec![1, 2, 3]).unwrap();
            assert_eq!(upload.format.extension(), ext);
        }
    }

    #[test]
    fn test_rejects_other_types() {
        for content_type in [Some("image/gif"), Some("application/pdf"), None] {
            let err = AvatarUpload::accept(content_type, vec![1]).unwrap_err();
            assert_eq!(err.to_string(), "Only JPEG, PNG and WebP images are allowed");
        }
    }

    #[test]
    fn test_size_limit() {
        assert!(AvatarUpload::accept(Some("image/png"), vec![0; MAX_AVATAR_BYTES]).is_ok());

        let err = AvatarUpload::accept(Some("image/png"), vec![0; MAX_AVATAR_BYTES + 1]).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m.starts_with("File too large")));
    }

    #[test]
    fn test_file_name_is_namespaced() {
        let id = Uuid::new_v4();
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let upload = AvatarUpload::accept(Some("image/webp"), vec![1]).unwrap();

        assert_eq!(upload.file_name(id, at), format!("{}_1700000000123.webp", id));
    }
}
