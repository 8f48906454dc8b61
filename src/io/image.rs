//! Image intake: read a file from disk and check it is something the
//! analysis service accepts.
//!
//! Only the declared type and the size are checked; the bytes are never
//! decoded. The type comes from an explicit MIME type when one is given,
//! otherwise from the file extension.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::domain::{ImageKind, ImageUpload, Language};
use crate::error::{AppError, EXIT_USAGE};
use crate::report::Message;

/// Largest accepted image, in bytes.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Load and validate an image file.
pub fn load_image(path: &Path, declared_type: Option<&str>, lang: Language) -> Result<ImageUpload, AppError> {
    let kind = match declared_type {
        Some(mime) => ImageKind::from_mime(mime),
        None => path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageKind::from_extension),
    };
    let kind = kind.ok_or_else(|| {
        AppError::new(
            EXIT_USAGE,
            format!("{} ('{}')", Message::FileTypeError.text(lang), path.display()),
        )
    })?;

    let meta = fs::metadata(path)
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to open image '{}': {e}", path.display())))?;
    if !meta.is_file() {
        return Err(AppError::new(EXIT_USAGE, format!("'{}' is not a file.", path.display())));
    }
    check_size(meta.len(), lang)?;

    let bytes = fs::read(path)
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to read image '{}': {e}", path.display())))?;
    // The file may have grown between the metadata check and the read.
    check_size(bytes.len() as u64, lang)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    debug!(file = %file_name, bytes = bytes.len(), mime = kind.mime(), "image accepted");

    Ok(ImageUpload::new(file_name, kind, bytes))
}

fn check_size(len: u64, lang: Language) -> Result<(), AppError> {
    if len > MAX_IMAGE_BYTES {
        return Err(AppError::new(EXIT_USAGE, Message::FileSizeError.text(lang)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn loads_supported_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Dinner.JPEG");
        File::create(&path).unwrap().write_all(&[0xFF, 0xD8, 0xFF]).unwrap();

        let upload = load_image(&path, None, Language::En).unwrap();
        assert_eq!(upload.file_name, "Dinner.JPEG");
        assert_eq!(upload.kind, ImageKind::Jpeg);
        assert_eq!(upload.bytes, vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn rejects_unsupported_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meal.gif");
        File::create(&path).unwrap().write_all(b"GIF89a").unwrap();

        let err = load_image(&path, None, Language::En).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_USAGE);
        assert!(err.to_string().starts_with("Please select a valid image file"));
    }

    #[test]
    fn declared_type_overrides_the_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_0042");
        File::create(&path).unwrap().write_all(&[0xFF, 0xD8]).unwrap();

        let upload = load_image(&path, Some("image/jpg"), Language::En).unwrap();
        assert_eq!(upload.kind, ImageKind::Jpeg);

        let err = load_image(&path, Some("image/gif"), Language::En).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_USAGE);
        assert!(load_image(&path, None, Language::En).is_err());
    }

    #[test]
    fn rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.png");
        let file = File::create(&path).unwrap();
        file.set_len(MAX_IMAGE_BYTES + 1).unwrap();

        let err = load_image(&path, None, Language::Zh).unwrap_err();
        assert_eq!(err.to_string(), "文件大小必须小于10MB");
    }

    #[test]
    fn missing_file_is_a_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_image(&dir.path().join("nope.webp"), None, Language::En).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }
}
