//! Fixture builders and package inspection helpers shared by the
//! integration tests.

#![allow(dead_code)]

use image::{ImageBuffer, ImageFormat, Rgb};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

// ============================================================================
// PDF fixtures
// ============================================================================

/// Write a PDF with one page per entry; an empty entry makes a page that
/// draws no text.
pub fn write_pdf(path: &Path, pages: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let operations = if text.is_empty() {
            Vec::new()
        } else {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

pub fn write_corrupt_pdf(path: &Path) {
    std::fs::write(path, b"%PDF-1.4\n%%garbage that is not a PDF body").unwrap();
}

// ============================================================================
// DOCX fixtures
// ============================================================================

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_pixel(width, height, Rgb([30u8, 120, 200]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="png" ContentType="image/png"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:style w:type="paragraph" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style>
<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/></w:style>
<w:style w:type="paragraph" w:styleId="PlainHeading"><w:name w:val="Heading"/></w:style>
</w:styles>"#;

/// A paragraph in a generated Word document
pub enum Para<'a> {
    Styled(&'a str, &'a str),
    Plain(&'a str),
    Empty,
}

/// Write a minimal DOCX with the given paragraphs and one image
/// relationship per entry in `images`, in order.
pub fn write_docx(path: &Path, paragraphs: &[Para], images: &[Vec<u8>]) {
    let mut body = String::new();
    for para in paragraphs {
        match para {
            Para::Styled(style, text) => body.push_str(&format!(
                "<w:p><w:pPr><w:pStyle w:val=\"{}\"/></w:pPr><w:r><w:t>{}</w:t></w:r></w:p>",
                style, text
            )),
            Para::Plain(text) => {
                body.push_str(&format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", text))
            }
            Para::Empty => body.push_str(
                "<w:p><w:r><w:t xml:space=\"preserve\">   </w:t></w:r></w:p>",
            ),
        }
    }
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
"#,
    );
    for i in 0..images.len() {
        rels.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/image\" Target=\"media/image{}.png\"/>\n",
            i + 2,
            i + 1
        ));
    }
    rels.push_str("</Relationships>");

    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    let mut add = |name: &str, data: &[u8]| {
        zip.start_file(name, options).unwrap();
        zip.write_all(data).unwrap();
    };
    add("[Content_Types].xml", CONTENT_TYPES.as_bytes());
    add("_rels/.rels", PACKAGE_RELS.as_bytes());
    add("word/document.xml", document.as_bytes());
    add("word/styles.xml", STYLES.as_bytes());
    add("word/_rels/document.xml.rels", rels.as_bytes());
    for (i, data) in images.iter().enumerate() {
        add(&format!("word/media/image{}.png", i + 1), data);
    }
    zip.finish().unwrap();
}

// ============================================================================
// Package inspection
// ============================================================================

/// All entries of an EPUB, by name
pub fn read_epub(path: &Path) -> HashMap<String, Vec<u8>> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entries = HashMap::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        entries.insert(entry.name().to_string(), data);
    }
    entries
}

pub fn entry_text(entries: &HashMap<String, Vec<u8>>, name: &str) -> String {
    String::from_utf8(entries[name].clone()).unwrap()
}

/// Values of every `attr="..."` occurrence in `xml`
pub fn attr_values(xml: &str, attr: &str) -> Vec<String> {
    let needle = format!("{}=\"", attr);
    let mut values = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find(&needle) {
        let after = &rest[start + needle.len()..];
        let end = after.find('"').unwrap();
        values.push(after[..end].to_string());
        rest = &after[end..];
    }
    values
}

/// Manifest of content.opf as id -> href
pub fn manifest(opf: &str) -> HashMap<String, String> {
    opf.lines()
        .filter(|l| l.trim_start().starts_with("<item "))
        .map(|l| {
            let id = attr_values(l, "id").remove(0);
            let href = attr_values(l, "href").remove(0);
            (id, href)
        })
        .collect()
}

/// Spine idrefs of content.opf, in order
pub fn spine(opf: &str) -> Vec<String> {
    attr_values(opf, "idref")
}

pub fn package_identifier(opf: &str) -> String {
    let start = opf.find("<dc:identifier id=\"BookId\">").unwrap() + "<dc:identifier id=\"BookId\">".len();
    let end = opf[start..].find('<').unwrap();
    opf[start..start + end].to_string()
}

/// Files in `dir` with the given extension
pub fn files_with_extension(dir: &Path, ext: &str) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|n| n.ends_with(ext))
        .collect();
    names.sort();
    names
}
