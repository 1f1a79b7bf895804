use crate::error::Result;
use crate::scratch::Scratch;

/// One EPUB content document produced by an extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    /// In-package filename, unique within one package
    pub filename: String,
    /// HTML body fragment (no `<html>`/`<body>` wrapper)
    pub body: String,
}

/// A binary resource embedded in the package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: String,
    /// Path relative to the package content root, e.g. `images/image_1.png`
    pub path: String,
    pub media_type: String,
    pub data: Vec<u8>,
}

/// An embedded image that could not be decoded or re-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedImage {
    /// 1-based image counter at the time of the failure
    pub index: usize,
    /// Relationship target inside the source container
    pub target: String,
    pub reason: String,
}

/// Everything an extractor pulls out of a source document.
#[derive(Debug, Default)]
pub struct Extraction {
    pub chapters: Vec<Chapter>,
    pub assets: Vec<Asset>,
    /// PDF pages (1-based) that yielded no text
    pub skipped_pages: Vec<u32>,
    pub skipped_images: Vec<SkippedImage>,
}

/// Trait for reading source document formats (PDF, DOCX)
pub trait DocumentReader {
    /// Extract chapters and assets, using `scratch` for intermediate files
    fn extract(&self, scratch: &Scratch) -> Result<Extraction>;
}
