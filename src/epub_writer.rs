//! EPUB assembler.
//!
//! Builds an EPUB 3 package (with an EPUB 2 `toc.ncx` for older readers)
//! from extracted chapters and assets and writes it to a single file.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};
use crate::html::escape;
use crate::metadata::PackageMetadata;
use crate::reader::{Asset, Chapter};

pub const NAV_FILENAME: &str = "nav.xhtml";
pub const NCX_FILENAME: &str = "toc.ncx";
pub const STYLESHEET_PATH: &str = "style/nav.css";

/// Shared stylesheet linked from every chapter.
pub const STYLESHEET: &str = r#"body {
    font-family: "Times New Roman", Times, serif;
    margin: 5%;
    text-align: justify;
}
h1 {
    text-align: center;
    font-size: 1.8em;
    margin-bottom: 1em;
}
h2 {
    text-align: center;
    font-size: 1.5em;
    margin-top: 1em;
}
h3 {
    text-align: center;
    font-size: 1.3em;
}
h4, h5, h6 {
    text-align: center;
}
p {
    text-indent: 1em;
    margin-top: 0.5em;
    margin-bottom: 0.5em;
}
.image-container {
    text-align: center;
    margin: 1em 0;
}
img {
    max-width: 90%;
    height: auto;
}
"#;

/// Container.xml template.
const CONTAINER_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

struct ManifestItem {
    id: String,
    href: String,
    media_type: String,
    properties: Option<&'static str>,
}

/// Assemble and write an EPUB package to `output`, replacing any existing file.
///
/// The spine is the navigation document followed by `chapters` in order; the
/// table of contents lists every chapter, flat.
pub fn write_epub(
    metadata: &PackageMetadata,
    chapters: &[Chapter],
    assets: &[Asset],
    output: &Path,
) -> Result<()> {
    validate(chapters, assets)?;

    let write_err = |source: io::Error| Error::PackageWrite {
        path: output.to_path_buf(),
        source,
    };

    let file = File::create(output).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    let written = write_package(metadata, chapters, assets, &mut writer).and_then(|()| writer.flush());

    if let Err(e) = written {
        // Never leave a truncated package behind
        drop(writer);
        let _ = fs::remove_file(output);
        return Err(write_err(e));
    }

    tracing::debug!(
        "Wrote {} ({} chapters, {} assets)",
        output.display(),
        chapters.len(),
        assets.len()
    );
    Ok(())
}

/// Check the package invariants before anything touches the filesystem.
fn validate(chapters: &[Chapter], assets: &[Asset]) -> Result<()> {
    let mut paths: HashSet<&str> = [NAV_FILENAME, NCX_FILENAME, STYLESHEET_PATH]
        .into_iter()
        .collect();
    let mut ids: HashSet<String> = ["nav", "ncx", "style_nav"]
        .into_iter()
        .map(String::from)
        .collect();

    for (i, chapter) in chapters.iter().enumerate() {
        if !paths.insert(chapter.filename.as_str()) {
            return Err(Error::InvalidPackage(format!(
                "duplicate chapter filename: {}",
                chapter.filename
            )));
        }
        ids.insert(chapter_id(i));
    }
    for asset in assets {
        if !paths.insert(asset.path.as_str()) {
            return Err(Error::InvalidPackage(format!(
                "duplicate asset path: {}",
                asset.path
            )));
        }
        if !ids.insert(asset.id.clone()) {
            return Err(Error::InvalidPackage(format!(
                "duplicate asset id: {}",
                asset.id
            )));
        }
    }
    Ok(())
}

fn chapter_id(index: usize) -> String {
    format!("chapter_{}", index + 1)
}

fn write_package<W: Write + Seek>(
    metadata: &PackageMetadata,
    chapters: &[Chapter],
    assets: &[Asset],
    writer: &mut W,
) -> io::Result<()> {
    let mut zip = ZipWriter::new(writer);

    // mimetype must be first and uncompressed
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("mimetype", stored).map_err(io_error)?;
    zip.write_all(b"application/epub+zip")?;

    zip.start_file("META-INF/container.xml", deflated)
        .map_err(io_error)?;
    zip.write_all(CONTAINER_XML)?;

    let mut manifest = vec![
        ManifestItem {
            id: "nav".to_string(),
            href: NAV_FILENAME.to_string(),
            media_type: "application/xhtml+xml".to_string(),
            properties: Some("nav"),
        },
        ManifestItem {
            id: "style_nav".to_string(),
            href: STYLESHEET_PATH.to_string(),
            media_type: "text/css".to_string(),
            properties: None,
        },
    ];
    let mut spine_refs = vec!["nav".to_string()];

    for (i, chapter) in chapters.iter().enumerate() {
        let id = chapter_id(i);
        manifest.push(ManifestItem {
            id: id.clone(),
            href: chapter.filename.clone(),
            media_type: "application/xhtml+xml".to_string(),
            properties: None,
        });
        spine_refs.push(id);
    }

    for asset in assets {
        manifest.push(ManifestItem {
            id: asset.id.clone(),
            href: asset.path.clone(),
            media_type: asset.media_type.clone(),
            properties: None,
        });
    }

    zip.start_file("OEBPS/content.opf", deflated)
        .map_err(io_error)?;
    zip.write_all(generate_opf(metadata, &manifest, &spine_refs).as_bytes())?;

    zip.start_file(format!("OEBPS/{}", NCX_FILENAME), deflated)
        .map_err(io_error)?;
    zip.write_all(generate_ncx(metadata, chapters).as_bytes())?;

    zip.start_file(format!("OEBPS/{}", NAV_FILENAME), deflated)
        .map_err(io_error)?;
    zip.write_all(generate_nav(metadata, chapters).as_bytes())?;

    zip.start_file(format!("OEBPS/{}", STYLESHEET_PATH), deflated)
        .map_err(io_error)?;
    zip.write_all(STYLESHEET.as_bytes())?;

    for chapter in chapters {
        zip.start_file(format!("OEBPS/{}", chapter.filename), deflated)
            .map_err(io_error)?;
        zip.write_all(chapter_document(metadata, chapter).as_bytes())?;
    }

    for asset in assets {
        // Already-compressed image data gains nothing from deflate
        zip.start_file(format!("OEBPS/{}", asset.path), stored)
            .map_err(io_error)?;
        zip.write_all(&asset.data)?;
    }

    zip.finish().map_err(io_error)?;
    Ok(())
}

/// Convert zip error to io error.
fn io_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> io::Error {
    io::Error::other(e)
}

/// Generate content.opf from metadata and manifest.
fn generate_opf(metadata: &PackageMetadata, manifest: &[ManifestItem], spine_refs: &[String]) -> String {
    let mut opf = String::new();

    opf.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="BookId">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
"#,
    );
    opf.push_str(&format!(
        "    <dc:identifier id=\"BookId\">{}</dc:identifier>\n",
        escape(&metadata.identifier)
    ));
    opf.push_str(&format!("    <dc:title>{}</dc:title>\n", escape(&metadata.title)));
    opf.push_str(&format!(
        "    <dc:language>{}</dc:language>\n",
        escape(&metadata.language)
    ));
    opf.push_str(&format!(
        "    <meta property=\"dcterms:modified\">{}</meta>\n",
        escape(&metadata.modified)
    ));
    opf.push_str("  </metadata>\n");

    opf.push_str("  <manifest>\n");
    opf.push_str(&format!(
        "    <item id=\"ncx\" href=\"{}\" media-type=\"application/x-dtbncx+xml\"/>\n",
        NCX_FILENAME
    ));
    for item in manifest {
        let properties = item
            .properties
            .map(|p| format!(" properties=\"{}\"", p))
            .unwrap_or_default();
        opf.push_str(&format!(
            "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"{}/>\n",
            escape(&item.id),
            escape(&item.href),
            escape(&item.media_type),
            properties
        ));
    }
    opf.push_str("  </manifest>\n");

    opf.push_str("  <spine toc=\"ncx\">\n");
    for id in spine_refs {
        opf.push_str(&format!("    <itemref idref=\"{}\"/>\n", escape(id)));
    }
    opf.push_str("  </spine>\n");

    opf.push_str("</package>\n");
    opf
}

/// Generate the EPUB 3 navigation document.
fn generate_nav(metadata: &PackageMetadata, chapters: &[Chapter]) -> String {
    let mut nav = String::new();
    nav.push_str(&xhtml_head(metadata, &metadata.title, None));
    nav.push_str("<body>\n  <nav epub:type=\"toc\" id=\"toc\">\n");
    nav.push_str(&format!("    <h1>{}</h1>\n    <ol>\n", escape(&metadata.title)));
    for chapter in chapters {
        nav.push_str(&format!(
            "      <li><a href=\"{}\">{}</a></li>\n",
            escape(&chapter.filename),
            escape(&chapter.title)
        ));
    }
    nav.push_str("    </ol>\n  </nav>\n</body>\n</html>\n");
    nav
}

/// Generate toc.ncx with one flat navPoint per chapter.
fn generate_ncx(metadata: &PackageMetadata, chapters: &[Chapter]) -> String {
    let mut ncx = String::new();

    ncx.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
"#,
    );
    ncx.push_str(&format!(
        "    <meta name=\"dtb:uid\" content=\"{}\"/>\n",
        escape(&metadata.identifier)
    ));
    ncx.push_str(
        r#"    <meta name="dtb:depth" content="1"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
"#,
    );
    ncx.push_str(&format!(
        "  <docTitle>\n    <text>{}</text>\n  </docTitle>\n  <navMap>\n",
        escape(&metadata.title)
    ));

    for (i, chapter) in chapters.iter().enumerate() {
        let play_order = i + 1;
        ncx.push_str(&format!(
            "    <navPoint id=\"navPoint-{}\" playOrder=\"{}\">\n",
            play_order, play_order
        ));
        ncx.push_str(&format!(
            "      <navLabel><text>{}</text></navLabel>\n",
            escape(&chapter.title)
        ));
        ncx.push_str(&format!(
            "      <content src=\"{}\"/>\n",
            escape(&chapter.filename)
        ));
        ncx.push_str("    </navPoint>\n");
    }

    ncx.push_str("  </navMap>\n</ncx>\n");
    ncx
}

/// Wrap a chapter's body fragment in a complete XHTML document.
fn chapter_document(metadata: &PackageMetadata, chapter: &Chapter) -> String {
    let depth = chapter.filename.matches('/').count();
    let stylesheet = format!("{}{}", "../".repeat(depth), STYLESHEET_PATH);

    let mut doc = xhtml_head(metadata, &chapter.title, Some(&stylesheet));
    doc.push_str("<body>\n");
    doc.push_str(&chapter.body);
    doc.push_str("\n</body>\n</html>\n");
    doc
}

fn xhtml_head(metadata: &PackageMetadata, title: &str, stylesheet: Option<&str>) -> String {
    let mut head = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <!DOCTYPE html>\n\
         <html xmlns=\"http://www.w3.org/1999/xhtml\" xmlns:epub=\"http://www.idpf.org/2007/ops\" \
         lang=\"{lang}\" xml:lang=\"{lang}\">\n\
         <head>\n  <title>{}</title>\n",
        escape(title),
        lang = escape(&metadata.language)
    );
    if let Some(href) = stylesheet {
        head.push_str(&format!(
            "  <link rel=\"stylesheet\" type=\"text/css\" href=\"{}\"/>\n",
            escape(href)
        ));
    }
    head.push_str("</head>\n");
    head
}
