use crate::html;
use docx_rust::document::{BodyContent, Paragraph, ParagraphContent, Run, RunContent};
use docx_rust::Docx;
use std::collections::HashMap;

/// How a paragraph is rendered, decided from its style name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading(u8),
    Body,
}

/// Map a Word paragraph style name to a block kind.
///
/// Any name containing "Heading" is a heading. Word's built-in names are
/// stored lowercase in `styles.xml` (`heading 1`), so exactly `heading` and
/// `heading N` are accepted as aliases; other lowercase spellings such as
/// `Subheading` stay body text. A trailing number picks the level, clamped
/// to 1..=6; no number or an unparsable one means level 1.
pub fn classify_style(name: &str) -> BlockKind {
    let suffix = match name.find("Heading") {
        Some(pos) => &name[pos + "Heading".len()..],
        None => match builtin_heading_suffix(name) {
            Some(suffix) => suffix,
            None => return BlockKind::Body,
        },
    };

    let level = suffix
        .trim()
        .parse::<u32>()
        .ok()
        .map(|n| n.clamp(1, 6) as u8)
        .unwrap_or(1);
    BlockKind::Heading(level)
}

/// Level suffix of a built-in `heading` / `heading N` name
fn builtin_heading_suffix(name: &str) -> Option<&str> {
    let rest = name.strip_prefix("heading")?;
    let is_builtin = rest.is_empty()
        || rest
            .strip_prefix(' ')
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
    is_builtin.then_some(rest)
}

/// Convert the paragraphs of a parsed DOCX body into HTML fragments
pub fn paragraphs_to_html(docx: &Docx) -> Vec<String> {
    let style_names: HashMap<&str, &str> = docx
        .styles
        .styles
        .iter()
        .filter_map(|s| Some((s.style_id.as_ref(), s.name.as_ref()?.value.as_ref())))
        .collect();

    let mut ctx = ConvertContext {
        style_names,
        output: Vec::new(),
    };

    for content in &docx.document.body.content {
        ctx.convert_body_content(content);
    }

    ctx.output
}

struct ConvertContext<'a> {
    /// style id -> display name, from styles.xml
    style_names: HashMap<&'a str, &'a str>,
    output: Vec<String>,
}

impl ConvertContext<'_> {
    fn convert_body_content(&mut self, content: &BodyContent) {
        match content {
            BodyContent::Paragraph(para) => self.convert_paragraph(para),
            BodyContent::Sdt(sdt) => {
                if let Some(ref sdt_content) = sdt.content {
                    for item in &sdt_content.content {
                        self.convert_body_content(item);
                    }
                }
            }
            // Tables and section breaks carry no paragraph stream
            _ => {}
        }
    }

    fn convert_paragraph(&mut self, para: &Paragraph) {
        let text = collect_paragraph_text(para);
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let kind = match self.style_name(para) {
            Some(name) => classify_style(name),
            None => BlockKind::Body,
        };

        let fragment = match kind {
            BlockKind::Heading(level) => html::heading(level, text),
            BlockKind::Body => html::paragraph(text),
        };
        self.output.push(fragment);
    }

    fn style_name<'p>(&'p self, para: &'p Paragraph) -> Option<&'p str> {
        let id = para.property.as_ref()?.style_id.as_ref()?.value.as_ref();
        // Fall back to the id when styles.xml has no entry for it
        Some(self.style_names.get(id).copied().unwrap_or(id))
    }
}

fn collect_paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();

    for pc in &para.content {
        match pc {
            ParagraphContent::Run(run) => collect_run_text(run, &mut text),
            ParagraphContent::Link(link) => {
                if let Some(ref run) = link.content {
                    collect_run_text(run, &mut text);
                }
            }
            _ => {}
        }
    }

    text
}

fn collect_run_text(run: &Run, text: &mut String) {
    for rc in &run.content {
        match rc {
            RunContent::Text(t) => text.push_str(&t.text),
            RunContent::Break(_) => text.push('\n'),
            RunContent::Tab(_) => text.push('\t'),
            _ => {}
        }
    }
}
