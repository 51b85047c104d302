//! Minimal DOCX writer
//!
//! Serialises a [`Document`] back into a WordprocessingML package. Only
//! direct formatting is written; style inheritance is carried by the
//! emitted `styles.xml` when the document has a style sheet. Consecutive
//! table paragraphs are written as one single-cell table.

use crate::document::{Document, Paragraph, Run, RunProperties, SectionProperties, Style, StyleKind};
use anyhow::Result;
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

fn content_types(with_styles: bool) -> String {
    let styles_override = if with_styles {
        r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#
    } else {
        ""
    };
    format!(
        r#"{XML_DECLARATION}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>{styles_override}</Types>"#
    )
}

fn package_rels() -> String {
    format!(
        r#"{XML_DECLARATION}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="word/document.xml"/></Relationships>"#
    )
}

fn document_rels(with_styles: bool) -> String {
    let styles = if with_styles {
        format!(r#"<Relationship Id="rId1" Type="{REL_NS}/styles" Target="styles.xml"/>"#)
    } else {
        String::new()
    };
    format!(
        r#"{XML_DECLARATION}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{styles}</Relationships>"#
    )
}

fn on_off(out: &mut String, tag: &str, value: Option<bool>) {
    match value {
        Some(true) => out.push_str(&format!("<w:{tag}/>")),
        Some(false) => out.push_str(&format!(r#"<w:{tag} w:val="0"/>"#)),
        None => {}
    }
}

fn val(out: &mut String, tag: &str, value: &str) {
    out.push_str(&format!(r#"<w:{tag} w:val="{}"/>"#, escape(value)));
}

/// `w:rPr` children in schema order.
fn write_run_properties(out: &mut String, props: &RunProperties) {
    if props.is_empty() {
        return;
    }
    out.push_str("<w:rPr>");
    if let Some(style) = &props.style_id {
        val(out, "rStyle", style);
    }
    if let Some(font) = &props.font_name {
        let font = escape(font.as_str());
        out.push_str(&format!(r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}"/>"#));
    }
    on_off(out, "b", props.bold);
    on_off(out, "i", props.italic);
    on_off(out, "smallCaps", props.small_caps);
    on_off(out, "strike", props.strike);
    on_off(out, "dstrike", props.double_strike);
    if let Some(color) = &props.color {
        val(out, "color", color);
    }
    if let Some(size) = &props.size {
        val(out, "sz", size);
    }
    if let Some(highlight) = &props.highlight {
        val(out, "highlight", highlight.as_ooxml());
    }
    if let Some(underline) = &props.underline {
        match &props.underline_color {
            Some(color) => out.push_str(&format!(
                r#"<w:u w:val="{}" w:color="{}"/>"#,
                escape(underline.as_ooxml()),
                escape(color.as_str())
            )),
            None => val(out, "u", underline.as_ooxml()),
        }
    }
    if let Some(vertical) = &props.vertical_align {
        val(out, "vertAlign", vertical.as_ooxml());
    }
    out.push_str("</w:rPr>");
}

fn flush_text(out: &mut String, pending: &mut String) {
    if !pending.is_empty() {
        out.push_str(&format!(
            r#"<w:t xml:space="preserve">{}</w:t>"#,
            escape(pending.as_str())
        ));
        pending.clear();
    }
}

fn write_run(out: &mut String, run: &Run) {
    out.push_str("<w:r>");
    write_run_properties(out, &run.direct);
    let mut pending = String::new();
    for ch in run.text.chars() {
        match ch {
            '\t' => {
                flush_text(out, &mut pending);
                out.push_str("<w:tab/>");
            }
            '\n' => {
                flush_text(out, &mut pending);
                out.push_str("<w:br/>");
            }
            other => pending.push(other),
        }
    }
    flush_text(out, &mut pending);
    out.push_str("</w:r>");
}

fn write_paragraph(out: &mut String, paragraph: &Paragraph) {
    out.push_str("<w:p>");
    if paragraph.style_id.is_some() || paragraph.direct_alignment.is_some() {
        out.push_str("<w:pPr>");
        if let Some(style) = &paragraph.style_id {
            val(out, "pStyle", style);
        }
        if let Some(alignment) = paragraph.direct_alignment {
            val(out, "jc", alignment.as_ooxml());
        }
        out.push_str("</w:pPr>");
    }
    for run in &paragraph.runs {
        write_run(out, run);
    }
    out.push_str("</w:p>");
}

fn write_section(out: &mut String, section: &SectionProperties) {
    out.push_str("<w:sectPr>");
    if let (Some(width), Some(height)) = (section.page_width, section.page_height) {
        out.push_str(&format!(r#"<w:pgSz w:w="{width}" w:h="{height}"/>"#));
    }
    if let Some(m) = section.margins {
        out.push_str(&format!(
            r#"<w:pgMar w:top="{}" w:right="{}" w:bottom="{}" w:left="{}"/>"#,
            m.top, m.right, m.bottom, m.left
        ));
    }
    out.push_str("</w:sectPr>");
}

/// Render `word/document.xml`.
pub fn document_xml(document: &Document) -> String {
    let mut out = String::from(XML_DECLARATION);
    out.push_str(&format!(r#"<w:document xmlns:w="{WORDML_NS}"><w:body>"#));

    let mut in_table = false;
    for paragraph in &document.paragraphs {
        if paragraph.in_table && !in_table {
            out.push_str("<w:tbl><w:tr><w:tc>");
        } else if !paragraph.in_table && in_table {
            out.push_str("</w:tc></w:tr></w:tbl>");
        }
        in_table = paragraph.in_table;
        write_paragraph(&mut out, paragraph);
    }
    if in_table {
        out.push_str("</w:tc></w:tr></w:tbl>");
    }

    // Only the final section survives; earlier section breaks are not kept.
    if let Some(section) = document.sections.last() {
        write_section(&mut out, section);
    }
    out.push_str("</w:body></w:document>");
    out
}

fn write_style(out: &mut String, style: &Style) {
    let kind = match style.kind {
        StyleKind::Paragraph => "paragraph",
        StyleKind::Character => "character",
        StyleKind::Table => "table",
        StyleKind::Numbering => "numbering",
    };
    let default = if style.is_default { r#" w:default="1""# } else { "" };
    out.push_str(&format!(
        r#"<w:style w:type="{kind}"{default} w:styleId="{}">"#,
        escape(style.id.as_str())
    ));
    if let Some(name) = &style.name {
        val(out, "name", name);
    }
    if let Some(parent) = &style.based_on {
        val(out, "basedOn", parent);
    }
    if let Some(alignment) = style.alignment {
        out.push_str("<w:pPr>");
        val(out, "jc", alignment.as_ooxml());
        out.push_str("</w:pPr>");
    }
    write_run_properties(out, &style.run);
    out.push_str("</w:style>");
}

/// Render `word/styles.xml`.
pub fn styles_xml(document: &Document) -> String {
    let mut out = String::from(XML_DECLARATION);
    out.push_str(&format!(r#"<w:styles xmlns:w="{WORDML_NS}">"#));
    if !document.styles.default_run.is_empty() {
        out.push_str("<w:docDefaults><w:rPrDefault>");
        write_run_properties(&mut out, &document.styles.default_run);
        out.push_str("</w:rPrDefault></w:docDefaults>");
    }
    for style in &document.styles.styles {
        write_style(&mut out, style);
    }
    out.push_str("</w:styles>");
    out
}

/// Package a document as DOCX bytes.
pub fn write_docx(document: &Document) -> Result<Vec<u8>> {
    let with_styles = !document.styles.is_empty();
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    let mut parts = vec![
        ("[Content_Types].xml", content_types(with_styles)),
        ("_rels/.rels", package_rels()),
        ("word/_rels/document.xml.rels", document_rels(with_styles)),
        ("word/document.xml", document_xml(document)),
    ];
    if with_styles {
        parts.push(("word/styles.xml", styles_xml(document)));
    }

    for (name, content) in parts {
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}
