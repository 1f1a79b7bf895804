use clap::Parser;
use std::path::PathBuf;

/// Convert PDF and Word documents to EPUB e-books
#[derive(Parser, Debug)]
#[command(name = "doc2epub", version, about)]
pub struct Cli {
    /// PDF, DOCX or DOC files to convert, processed in the given order
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output EPUB file (only valid with a single input).
    /// Defaults to the input name with an .epub extension.
    #[arg(short, long, conflicts_with = "output_dir")]
    pub output: Option<PathBuf>,

    /// Directory to write converted books into (created if missing).
    /// Defaults to each input's own directory.
    #[arg(short = 'd', long)]
    pub output_dir: Option<PathBuf>,

    /// Language tag written into the book metadata
    #[arg(short, long, default_value = doc2epub::converter::DEFAULT_LANGUAGE)]
    pub language: String,

    /// Show debug logging (RUST_LOG overrides this)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
