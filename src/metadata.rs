use std::path::Path;

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

/// Package-level metadata written into `content.opf` and `toc.ncx`
#[derive(Debug, Clone)]
pub struct PackageMetadata {
    /// Unique identifier, freshly generated for every conversion
    pub identifier: String,
    pub title: String,
    pub language: String,
    /// `dcterms:modified` value (UTC, second precision)
    pub modified: String,
}

impl PackageMetadata {
    pub fn new(title: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            identifier: format!("urn:uuid:{}", Uuid::new_v4()),
            title: title.into(),
            language: language.into(),
            modified: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    /// Metadata titled after the source file's stem
    pub fn for_source(source: &Path, language: &str) -> Self {
        let title = source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Untitled".to_string());
        Self::new(title, language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_from_stem() {
        let meta = PackageMetadata::for_source(Path::new("/tmp/My Report.final.pdf"), "tr");
        assert_eq!(meta.title, "My Report.final");
        assert_eq!(meta.language, "tr");
    }

    #[test]
    fn test_identifier_is_fresh() {
        let a = PackageMetadata::new("t", "en");
        let b = PackageMetadata::new("t", "en");
        assert!(a.identifier.starts_with("urn:uuid:"));
        assert_ne!(a.identifier, b.identifier);
    }

    #[test]
    fn test_modified_format() {
        let meta = PackageMetadata::new("t", "en");
        // e.g. 2024-01-01T00:00:00Z
        assert_eq!(meta.modified.len(), 20);
        assert!(meta.modified.ends_with('Z'));
    }
}
