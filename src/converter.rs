use crate::docx_reader::DocxData;
use crate::epub_writer;
use crate::error::{Error, Result};
use crate::metadata::PackageMetadata;
use crate::pdf_reader::PdfData;
use crate::reader::{DocumentReader, Extraction, SkippedImage};
use crate::scratch::Scratch;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_LANGUAGE: &str = "tr";

/// Source formats the converter understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    /// Word documents; `.doc` is accepted but only opens if it is really OOXML
    Docx,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Ok(SourceFormat::Pdf),
            "docx" | "doc" => Ok(SourceFormat::Docx),
            "" => Err(Error::UnsupportedFormat(format!(
                "{} has no file extension",
                path.display()
            ))),
            other => Err(Error::UnsupportedFormat(format!(".{}", other))),
        }
    }
}

/// Informational progress stages reported during a single conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Starting,
    ReadingSource,
    WritingPackage,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Starting => "starting",
            Stage::ReadingSource => "reading source",
            Stage::WritingPackage => "writing package",
            Stage::Done => "done",
        })
    }
}

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Language tag written into the package metadata
    pub language: String,
    /// Where per-conversion scratch directories are created (system temp dir if unset)
    pub scratch_root: Option<PathBuf>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            scratch_root: None,
        }
    }
}

/// A single conversion unit
#[derive(Debug, Clone)]
pub struct Document {
    pub source: PathBuf,
    pub format: SourceFormat,
    pub target: PathBuf,
}

impl Document {
    /// Resolve format and output path for `source`.
    ///
    /// Fails with [`Error::UnsupportedFormat`] before anything is read.
    pub fn new(source: &Path, output: Option<&Path>) -> Result<Self> {
        let format = SourceFormat::from_path(source)?;
        Ok(Self {
            source: source.to_path_buf(),
            format,
            target: resolve_output_path(source, output),
        })
    }
}

/// Outcome of a successful conversion
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub output: PathBuf,
    pub chapter_count: usize,
    pub asset_count: usize,
    pub skipped_pages: Vec<u32>,
    pub skipped_images: Vec<SkippedImage>,
}

/// Convert one PDF or Word file to EPUB.
///
/// Without `output` the package is written next to the input with an
/// `.epub` extension. The scratch directory used for intermediate files is
/// released before this returns, whether or not the conversion succeeded.
pub fn convert(
    input: &Path,
    output: Option<&Path>,
    options: &ConvertOptions,
    mut progress: impl FnMut(Stage),
) -> Result<ConversionReport> {
    progress(Stage::Starting);
    let doc = Document::new(input, output)?;

    let scratch = Scratch::create(options.scratch_root.as_deref())?;
    let result = convert_document(&doc, options, &scratch, &mut progress);
    scratch.release();

    let report = result?;
    progress(Stage::Done);
    Ok(report)
}

fn convert_document(
    doc: &Document,
    options: &ConvertOptions,
    scratch: &Scratch,
    progress: &mut impl FnMut(Stage),
) -> Result<ConversionReport> {
    progress(Stage::ReadingSource);
    let extraction = read_source(doc, scratch)?;

    progress(Stage::WritingPackage);
    let metadata = PackageMetadata::for_source(&doc.source, &options.language);
    epub_writer::write_epub(&metadata, &extraction.chapters, &extraction.assets, &doc.target)?;

    let chapter_count = extraction.chapters.len();
    let asset_count = extraction.assets.len();
    tracing::info!(
        "Converted {} to {} ({} chapters{})",
        doc.source.display(),
        doc.target.display(),
        chapter_count,
        if asset_count > 0 {
            format!(", {} images", asset_count)
        } else {
            String::new()
        },
    );

    Ok(ConversionReport {
        output: doc.target.clone(),
        chapter_count,
        asset_count,
        skipped_pages: extraction.skipped_pages,
        skipped_images: extraction.skipped_images,
    })
}

fn read_source(doc: &Document, scratch: &Scratch) -> Result<Extraction> {
    let reader: Box<dyn DocumentReader> = match doc.format {
        SourceFormat::Pdf => Box::new(PdfData::open(&doc.source)?),
        SourceFormat::Docx => Box::new(DocxData::open(&doc.source)?),
    };
    reader.extract(scratch)
}

/// Output path for `input`: the explicit one if given, else `<input stem>.epub`
/// beside the input.
pub fn resolve_output_path(input: &Path, output: Option<&Path>) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => input.with_extension("epub"),
    }
}

/// Output path for `input` placed in `dir`
pub fn output_in_dir(input: &Path, dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    dir.join(format!("{}.epub", stem))
}
