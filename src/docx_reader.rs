use crate::docx_html;
use crate::error::{Error, Result};
use crate::html;
use crate::image::{self as picture, PNG_MEDIA_TYPE};
use crate::reader::{Asset, Chapter, DocumentReader, Extraction, SkippedImage};
use crate::scratch::Scratch;
use docx_rust::{Docx, DocxFile};
use std::path::{Path, PathBuf};

pub const CONTENT_FILENAME: &str = "content.xhtml";
pub const CONTENT_TITLE: &str = "Content";

pub struct DocxData {
    /// DocxFile owns the raw data; Docx borrows from it.
    /// We store the file so it lives long enough, then parse on demand.
    file: DocxFile,
    path: PathBuf,
}

impl DocxData {
    pub fn open(path: &Path) -> Result<Self> {
        let file = DocxFile::from_file(path).map_err(|e| Error::unreadable(path, e))?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    fn parse(&self) -> Result<Docx<'_>> {
        self.file
            .parse()
            .map_err(|e| Error::unreadable(&self.path, e))
    }
}

impl DocumentReader for DocxData {
    fn extract(&self, scratch: &Scratch) -> Result<Extraction> {
        let docx = self.parse()?;
        let mut extraction = Extraction::default();

        let mut body = docx_html::paragraphs_to_html(&docx).concat();

        // Images follow the text in relationship order; their anchor
        // position in the paragraph stream is not recovered.
        let mut image_count = 0;
        for target in image_targets(&docx) {
            image_count += 1;
            match embed_image(&docx, target, image_count, scratch) {
                Ok(asset) => {
                    body.push_str(&image_block(&asset.path, image_count));
                    extraction.assets.push(asset);
                }
                Err(reason) => {
                    tracing::warn!(
                        "Skipping image {} ({}) in {}: {}",
                        image_count,
                        target,
                        self.path.display(),
                        reason
                    );
                    extraction.skipped_images.push(SkippedImage {
                        index: image_count,
                        target: target.to_string(),
                        reason,
                    });
                }
            }
        }

        // DOCX is a single continuous document — treat as one chapter
        extraction.chapters.push(Chapter {
            title: CONTENT_TITLE.to_string(),
            filename: CONTENT_FILENAME.to_string(),
            body,
        });

        Ok(extraction)
    }
}

/// Relationship targets of the main document part that point at images,
/// in the order they are listed in `document.xml.rels`
fn image_targets<'d>(docx: &'d Docx) -> Vec<&'d str> {
    let Some(ref rels) = docx.document_rels else {
        return Vec::new();
    };
    rels.relationships
        .iter()
        .map(|r| r.target.as_ref())
        .filter(|target| target.contains("image"))
        .collect()
}

/// Load the blob behind `target`, re-encode it as PNG and wrap it as an asset
fn embed_image(
    docx: &Docx,
    target: &str,
    n: usize,
    scratch: &Scratch,
) -> std::result::Result<Asset, String> {
    let data = media_blob(docx, target).ok_or_else(|| "image data not found".to_string())?;
    let png = picture::reencode_png(&data, &scratch.file(&format!("image_{}.png", n)))
        .map_err(|e| e.to_string())?;

    Ok(Asset {
        id: format!("image_{}", n),
        path: picture::image_path(n),
        media_type: PNG_MEDIA_TYPE.to_string(),
        data: png,
    })
}

fn media_blob(docx: &Docx, target: &str) -> Option<Vec<u8>> {
    // DOCX stores images as word/media/... while rels are relative to word/
    let target = target.trim_start_matches('/');
    let full_path = format!("word/{}", target);
    docx.media
        .get(target)
        .or_else(|| docx.media.get(full_path.as_str()))
        .map(|(_media_type, data)| data.to_vec())
}

fn image_block(path: &str, n: usize) -> String {
    format!(
        "<div class=\"image-container\"><img src=\"{}\" alt=\"Image {}\"/></div>",
        html::escape(path),
        n
    )
}
