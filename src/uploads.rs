use std::path::Path;

use axum::body::Bytes;
use uuid::Uuid;

use crate::{Error, Result};

/// Stored references are relative paths under this prefix, not the bytes.
pub const PUBLIC_PREFIX: &str = "/uploads/";

/// Write avatar bytes under the uploads directory and return the public
/// relative path to persist. Filenames are fresh uuids; only a short
/// alphanumeric extension survives from the client name.
pub async fn store_avatar(dir: &Path, original_name: &str, bytes: Bytes) -> Result<String> {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("bin");

    let file_name = format!("{}.{}", Uuid::new_v4(), ext.to_ascii_lowercase());

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::Unexpected(format!("failed to create uploads dir: {e}")))?;
    tokio::fs::write(dir.join(&file_name), &bytes)
        .await
        .map_err(|e| Error::Unexpected(format!("failed to store avatar: {e}")))?;

    Ok(format!("{PUBLIC_PREFIX}{file_name}"))
}

/// Best-effort delete of a previously stored avatar. Failures are logged,
/// never surfaced; references outside the uploads dir are ignored.
pub async fn remove_avatar(dir: &Path, stored: &str) {
    let Some(file_name) = stored.strip_prefix(PUBLIC_PREFIX) else {
        return;
    };
    if file_name.contains('/') || file_name.contains('\\') || file_name.contains("..") {
        return;
    }

    if let Err(err) = tokio::fs::remove_file(dir.join(file_name)).await {
        tracing::warn!("failed to delete old profile picture {stored}: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_then_remove() {
        let dir = std::env::temp_dir().join("notedrop-uploads-unit");

        let stored = store_avatar(&dir, "me.PNG", Bytes::from_static(b"fake-image"))
            .await
            .unwrap();

        assert!(stored.starts_with(PUBLIC_PREFIX));
        assert!(stored.ends_with(".png"));

        let on_disk = dir.join(stored.strip_prefix(PUBLIC_PREFIX).unwrap());
        assert_eq!(std::fs::read(&on_disk).unwrap(), b"fake-image");

        remove_avatar(&dir, &stored).await;
        assert!(!on_disk.exists());
    }

    #[tokio::test]
    async fn remove_ignores_paths_outside_uploads() {
        let dir = std::env::temp_dir().join("notedrop-uploads-unit");

        // nothing to assert beyond "does not panic / does not escape"
        remove_avatar(&dir, "/uploads/../../etc/passwd").await;
        remove_avatar(&dir, "/elsewhere/file.png").await;
    }

    #[tokio::test]
    async fn weird_extension_falls_back() {
        let dir = std::env::temp_dir().join("notedrop-uploads-unit");

        let stored = store_avatar(&dir, "no-extension", Bytes::from_static(b"x")).await.unwrap();
        assert!(stored.ends_with(".bin"));

        remove_avatar(&dir, &stored).await;
    }
}
