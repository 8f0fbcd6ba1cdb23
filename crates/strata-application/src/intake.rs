//! Input collection: turns raw uploads into diagnosis patches.
//!
//! Nothing here touches the session directly. Every function returns the
//! patch to merge plus any notices the user should see.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use strata_core::extractor::{DocumentExtractor, ExtractionError};
use strata_core::i18n::{Language, TextCatalog, TextKey};
use strata_core::session::{BriefingExtraction, DiagnosisPatch, MAX_SCREENSHOTS, Screenshot};

/// A file handed in by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Something the user should be told about an upload. Never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeNotice {
    /// The screenshot limit was reached; `name` was dropped.
    ImageCapacity { name: String },
    NotAnImage { name: String },
    ExtractionUnsupported { file_name: String },
    ExtractionFailed { file_name: String, reason: String },
}

impl IntakeNotice {
    pub fn text_key(&self) -> TextKey {
        match self {
            IntakeNotice::ImageCapacity { .. } => TextKey::NoticeImageCapacity,
            IntakeNotice::NotAnImage { .. } => TextKey::NoticeNotAnImage,
            IntakeNotice::ExtractionUnsupported { .. } => TextKey::NoticeExtractionUnsupported,
            IntakeNotice::ExtractionFailed { .. } => TextKey::NoticeExtractionFailed,
        }
    }

    pub fn localized(&self, catalog: &TextCatalog, lang: Language) -> String {
        let max = MAX_SCREENSHOTS.to_string();
        match self {
            IntakeNotice::ImageCapacity { name } => {
                catalog.format(lang, self.text_key(), &[("max", &max), ("name", name)])
            }
            IntakeNotice::NotAnImage { name } => {
                catalog.format(lang, self.text_key(), &[("name", name)])
            }
            IntakeNotice::ExtractionUnsupported { file_name } => {
                catalog.format(lang, self.text_key(), &[("fileName", file_name)])
            }
            IntakeNotice::ExtractionFailed { file_name, reason } => catalog.format(
                lang,
                self.text_key(),
                &[("fileName", file_name), ("reason", reason)],
            ),
        }
    }
}

/// Image MIME type guessed from the file name, if it names an image.
fn image_mime_type(name: &str) -> Option<&'static str> {
    mime_guess::from_path(name)
        .first_raw()
        .filter(|mime| mime.starts_with("image/"))
}

/// Builds the stored record for one image.
pub fn screenshot(name: &str, mime_type: &str, bytes: &[u8]) -> Screenshot {
    let data = STANDARD.encode(bytes);
    Screenshot {
        name: name.to_string(),
        mime_type: mime_type.to_string(),
        preview_url: format!("data:{};base64,{}", mime_type, data),
        data,
    }
}

/// Appends images to `current`, up to [`MAX_SCREENSHOTS`].
///
/// Uploads past the limit are dropped with a capacity notice each; files
/// that are not images are skipped with their own notice.
pub fn add_images(
    current: &[Screenshot],
    uploads: Vec<Upload>,
) -> (DiagnosisPatch, Vec<IntakeNotice>) {
    let mut screenshots = current.to_vec();
    let mut notices = Vec::new();

    for upload in uploads {
        let Some(mime_type) = image_mime_type(&upload.name) else {
            tracing::warn!("Skipping non-image upload '{}'", upload.name);
            notices.push(IntakeNotice::NotAnImage { name: upload.name });
            continue;
        };
        if screenshots.len() >= MAX_SCREENSHOTS {
            tracing::warn!("Screenshot limit reached; dropping '{}'", upload.name);
            notices.push(IntakeNotice::ImageCapacity { name: upload.name });
            continue;
        }
        screenshots.push(screenshot(&upload.name, mime_type, &upload.bytes));
    }

    let patch = DiagnosisPatch {
        screenshots: Some(screenshots),
        ..Default::default()
    };
    (patch, notices)
}

/// Removes the image at `index`. `None` if there is no such image.
pub fn remove_image(current: &[Screenshot], index: usize) -> Option<DiagnosisPatch> {
    if index >= current.len() {
        return None;
    }
    let mut screenshots = current.to_vec();
    screenshots.remove(index);
    Some(DiagnosisPatch {
        screenshots: Some(screenshots),
        ..Default::default()
    })
}

/// Extracts the briefing text and records the outcome.
///
/// The file name is kept whatever happens, so a failed extraction is
/// distinguishable from a file that was never attached.
pub async fn attach_briefing(
    extractor: &dyn DocumentExtractor,
    upload: Upload,
) -> (DiagnosisPatch, Option<IntakeNotice>) {
    let Upload { name, bytes } = upload;
    let outcome = extractor.extract(&name, bytes).await;

    let (content, extraction, notice) = match outcome {
        Ok(text) => {
            tracing::info!("Extracted {} chars from '{}'", text.chars().count(), name);
            (Some(text), BriefingExtraction::Extracted, None)
        }
        Err(ExtractionError::Unsupported { extension }) => {
            tracing::info!("No extractor for '{}' ({})", name, extension);
            (
                None,
                BriefingExtraction::Unsupported,
                Some(IntakeNotice::ExtractionUnsupported {
                    file_name: name.clone(),
                }),
            )
        }
        Err(ExtractionError::Failed { reason }) => {
            tracing::warn!("Extraction from '{}' failed: {}", name, reason);
            (
                None,
                BriefingExtraction::Failed {
                    reason: reason.clone(),
                },
                Some(IntakeNotice::ExtractionFailed {
                    file_name: name.clone(),
                    reason,
                }),
            )
        }
    };

    let patch = DiagnosisPatch {
        briefing_file_name: Some(Some(name)),
        briefing_file_content: Some(content),
        briefing_extraction: Some(extraction),
        ..Default::default()
    };
    (patch, notice)
}

/// Clears the attached briefing file.
pub fn detach_briefing() -> DiagnosisPatch {
    DiagnosisPatch {
        briefing_file_name: Some(None),
        briefing_file_content: Some(None),
        briefing_extraction: Some(BriefingExtraction::NotAttempted),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use strata_core::session::DiagnosisInput;

    struct FixedExtractor(Result<String, ExtractionError>);

    #[async_trait]
    impl DocumentExtractor for FixedExtractor {
        async fn extract(&self, _file_name: &str, _bytes: Vec<u8>) -> Result<String, ExtractionError> {
            self.0.clone()
        }
    }

    fn png(name: &str) -> Upload {
        Upload::new(name, vec![0x89, b'P', b'N', b'G'])
    }

    #[test]
    fn test_screenshot_record() {
        let shot = screenshot("a.png", "image/png", b"hi");
        assert_eq!(shot.data, "aGk=");
        assert_eq!(shot.preview_url, "data:image/png;base64,aGk=");
    }

    #[test]
    fn test_add_images_caps_at_limit() {
        let uploads = (1..=6).map(|i| png(&format!("shot{}.png", i))).collect();
        let (patch, notices) = add_images(&[], uploads);

        let screenshots = patch.screenshots.unwrap();
        assert_eq!(screenshots.len(), MAX_SCREENSHOTS);
        assert_eq!(screenshots[4].name, "shot5.png");
        assert_eq!(
            notices,
            vec![IntakeNotice::ImageCapacity {
                name: "shot6.png".to_string()
            }]
        );
    }

    #[test]
    fn test_non_image_is_skipped() {
        let (patch, notices) = add_images(&[], vec![Upload::new("notes.txt", b"x".to_vec()), png("a.jpg")]);
        let screenshots = patch.screenshots.unwrap();
        assert_eq!(screenshots.len(), 1);
        assert_eq!(screenshots[0].mime_type, "image/jpeg");
        assert!(matches!(notices[0], IntakeNotice::NotAnImage { .. }));
    }

    #[test]
    fn test_remove_image_by_index() {
        let (patch, _) = add_images(&[], vec![png("a.png"), png("b.png"), png("c.png")]);
        let current = patch.screenshots.unwrap();

        let removed = remove_image(&current, 1).unwrap().screenshots.unwrap();
        let names: Vec<_> = removed.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "c.png"]);
        assert!(remove_image(&current, 3).is_none());
    }

    #[tokio::test]
    async fn test_attach_keeps_name_on_failure() {
        let extractor = FixedExtractor(Err(ExtractionError::Failed {
            reason: "encrypted".to_string(),
        }));
        let (patch, notice) = attach_briefing(&extractor, Upload::new("brief.pdf", vec![1])).await;

        let mut diagnosis = DiagnosisInput::default();
        patch.apply(&mut diagnosis);
        assert_eq!(diagnosis.briefing_file_name.as_deref(), Some("brief.pdf"));
        assert_eq!(diagnosis.briefing_file_content, None);
        assert_eq!(
            diagnosis.briefing_extraction,
            BriefingExtraction::Failed {
                reason: "encrypted".to_string()
            }
        );
        assert!(diagnosis.has_briefing_source());

        let message = notice.unwrap().localized(&TextCatalog::new(), Language::En);
        assert_eq!(message, "Could not extract text from brief.pdf: encrypted");
    }

    #[tokio::test]
    async fn test_attach_then_detach() {
        let extractor = FixedExtractor(Ok("Grow share".to_string()));
        let (patch, notice) = attach_briefing(&extractor, Upload::new("brief.txt", vec![])).await;
        assert!(notice.is_none());

        let mut diagnosis = DiagnosisInput::default();
        patch.apply(&mut diagnosis);
        assert_eq!(diagnosis.briefing_file_content.as_deref(), Some("Grow share"));
        assert_eq!(diagnosis.briefing_extraction, BriefingExtraction::Extracted);

        detach_briefing().apply(&mut diagnosis);
        assert_eq!(diagnosis.briefing_file_name, None);
        assert_eq!(diagnosis.briefing_file_content, None);
        assert_eq!(diagnosis.briefing_extraction, BriefingExtraction::NotAttempted);
    }

    #[tokio::test]
    async fn test_unsupported_format_notice() {
        let extractor = FixedExtractor(Err(ExtractionError::Unsupported {
            extension: "pptx".to_string(),
        }));
        let (patch, notice) = attach_briefing(&extractor, Upload::new("deck.pptx", vec![])).await;
        assert_eq!(patch.briefing_extraction, Some(BriefingExtraction::Unsupported));
        assert_eq!(
            notice,
            Some(IntakeNotice::ExtractionUnsupported {
                file_name: "deck.pptx".to_string()
            })
        );
    }
}
