//! Convert PDF and Word documents into EPUB e-books.
//!
//! Each source format has its own extractor ([`pdf_reader`], [`docx_reader`])
//! producing [`reader::Chapter`]s and [`reader::Asset`]s, which
//! [`epub_writer`] assembles into a package. [`converter::convert`] runs one
//! file end to end and [`batch`] sequences many.

pub mod batch;
pub mod converter;
pub mod docx_html;
pub mod docx_reader;
pub mod epub_writer;
pub mod error;
pub mod html;
pub mod image;
pub mod metadata;
pub mod pdf_reader;
pub mod reader;
pub mod scratch;

pub use converter::{convert, ConversionReport, ConvertOptions, Stage};
pub use error::{Error, Result};
