//! Uploaded images on the local file store.
// region:    --- Imports
use crate::accounts::commands::update_profile_picture;
use crate::auth::AuthUser;
use crate::config::MediaConfig;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::fmt;
use tracing::info;
use uuid::Uuid;
// endregion: --- Imports

pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    AuctionImage,
    ProfilePicture,
}

impl MediaKind {
    pub fn dir(&self) -> &'static str {
        match self {
            MediaKind::AuctionImage => "auction_images",
            MediaKind::ProfilePicture => "profile_pictures",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir())
    }
}

/// Raster formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }

    /// Format named by a declared content type, parameters ignored.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next()?.trim().to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ImageFormat::Jpeg),
            "image/png" => Some(ImageFormat::Png),
            "image/gif" => Some(ImageFormat::Gif),
            "image/webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    /// Format recognised from the file's leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageFormat::Webp)
        } else {
            None
        }
    }
}

/// Extension for an upload whose declared type and contents agree.
pub fn image_extension(content_type: &str, bytes: &[u8]) -> Option<&'static str> {
    let declared = ImageFormat::from_content_type(content_type)?;
    (ImageFormat::sniff(bytes)? == declared).then(|| declared.extension())
}

pub struct MediaStore {
    config: MediaConfig,
}

impl MediaStore {
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    /// Public path prefix files of `kind` are served under, with a trailing slash.
    pub fn public_prefix(&self, kind: MediaKind) -> String {
        format!("{}/{}/", self.config.url_prefix.trim_end_matches('/'), kind)
    }

    /// Store `bytes` under `<root>/<kind>/<uuid>.<ext>` and return its public path.
    pub async fn save(&self, kind: MediaKind, content_type: &str, bytes: &[u8]) -> AppResult<String> {
        if bytes.is_empty() {
            return Err(AppError::Validation("The uploaded file is empty.".to_string()));
        }
        if bytes.len() > self.config.max_bytes {
            return Err(AppError::Validation(format!(
                "Images must be at most {} bytes.",
                self.config.max_bytes
            )));
        }
        let ext = image_extension(content_type, bytes).ok_or_else(|| {
            AppError::Validation("Only JPEG, PNG, GIF and WebP images are allowed.".to_string())
        })?;

        let dir = self.config.root.join(kind.dir());
        tokio::fs::create_dir_all(&dir).await?;
        let file_name = format!("{}.{}", Uuid::new_v4(), ext);
        tokio::fs::write(dir.join(&file_name), bytes).await?;

        let path = format!("{}{}", self.public_prefix(kind), file_name);
        info!("{:<12} --> Stored {} ({} bytes)", "Media", path, bytes.len());
        Ok(path)
    }
}

// region:    --- Handlers

/// First `image` field of a multipart body.
async fn read_image(multipart: &mut Multipart) -> AppResult<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        return Ok((content_type, bytes.to_vec()));
    }
    Err(AppError::Validation(format!(
        "Missing '{}' file field.",
        IMAGE_FIELD
    )))
}

/// Upload an auction image
pub async fn handle_upload_auction_image(
    State(state): State<AppState>,
    _auth: AuthUser,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let (content_type, bytes) = read_image(&mut multipart).await?;
    let path = state
        .media
        .save(MediaKind::AuctionImage, &content_type, &bytes)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "image": path }))))
}

/// Upload a profile picture
pub async fn handle_upload_profile_picture(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let (content_type, bytes) = read_image(&mut multipart).await?;
    let path = state
        .media
        .save(MediaKind::ProfilePicture, &content_type, &bytes)
        .await?;
    let profile = update_profile_picture(&state.db, auth.id(), &path).await?;
    Ok(Json(json!({
        "message": "Your profile picture has been updated!",
        "profile": profile,
    })))
}

// endregion: --- Handlers

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn store(max_bytes: usize) -> (MediaStore, PathBuf) {
        let root = std::env::temp_dir().join(format!("mazadi-media-{}", Uuid::new_v4()));
        let config = MediaConfig {
            root: root.clone(),
            url_prefix: "/media".to_string(),
            max_bytes,
        };
        (MediaStore::new(config), root)
    }

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("image/png", PNG), Some("png"));
        assert_eq!(image_extension("image/jpeg; charset=binary", JPEG), Some("jpg"));
        assert_eq!(image_extension("IMAGE/GIF", b"GIF89a\x01\x00"), Some("gif"));
        assert_eq!(image_extension("image/webp", b"RIFF\x24\0\0\0WEBPVP8 "), Some("webp"));
        assert_eq!(image_extension("text/plain", PNG), None);
        assert_eq!(image_extension("", PNG), None);
    }

    #[test]
    fn test_image_extension_rejects_scriptable_or_mislabelled_files() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg"><script>alert(1)</script></svg>"#;
        assert_eq!(image_extension("image/svg+xml", svg), None);
        assert_eq!(image_extension("image/png", svg), None);
        assert_eq!(image_extension("image/png", JPEG), None);
        assert_eq!(image_extension("image/x-icon", b"\0\0\x01\0"), None);
        assert_eq!(image_extension("image/webp", b"RIFF\x24\0\0\0WAVE"), None);
    }

    #[tokio::test]
    async fn test_save_writes_file_under_kind_dir() {
        let (store, root) = store(1024);
        let path = store
            .save(MediaKind::AuctionImage, "image/png", PNG)
            .await
            .unwrap();
        assert!(path.starts_with(&store.public_prefix(MediaKind::AuctionImage)));
        assert!(path.starts_with("/media/auction_images/"));
        assert!(path.ends_with(".png"));

        let file_name = path.rsplit('/').next().unwrap();
        let on_disk = root.join("auction_images").join(file_name);
        assert_eq!(tokio::fs::read(&on_disk).await.unwrap(), PNG);
        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_rejects_bad_uploads() {
        let (store, root) = store(16);
        assert!(store
            .save(MediaKind::ProfilePicture, "application/pdf", b"%PDF")
            .await
            .is_err());
        assert!(store
            .save(MediaKind::ProfilePicture, "image/svg+xml", b"<svg/>")
            .await
            .is_err());
        assert!(store
            .save(MediaKind::ProfilePicture, "image/png", &[PNG, &[0u8; 16][..]].concat())
            .await
            .is_err());
        assert!(store.save(MediaKind::ProfilePicture, "image/png", b"").await.is_err());
        assert!(!root.exists());
    }
}
