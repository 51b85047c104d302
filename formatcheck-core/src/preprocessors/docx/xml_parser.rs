//! WordprocessingML body parser
//!
//! Walks `word/document.xml` with a streaming reader and builds the
//! paragraph/run tree with each run's direct formatting. Style resolution
//! happens afterwards (see `styles.rs`), once the style sheet is known.
//!
//! Only the main story is read. Deleted revisions, drawings and text boxes
//! are skipped, so a phrase inside a floating text box is not found.

use crate::document::{
    Alignment, Document, HighlightColor, PageMargins, Paragraph, Run, RunProperties,
    SectionProperties, UnderlineStyle, VerticalAlign,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Subtrees whose text or formatting is not part of the visible main story.
const SKIPPED_ELEMENTS: &[&[u8]] = &[
    b"w:del",
    b"w:moveFrom",
    b"w:rPrChange",
    b"w:pPrChange",
    b"w:drawing",
    b"w:pict",
    b"w:object",
    b"mc:AlternateContent",
];

/// Read a `w:`-prefixed attribute value, unescaped.
pub(crate) fn attr(element: &BytesStart, name: &str) -> quick_xml::Result<Option<String>> {
    match element.try_get_attribute(name)? {
        Some(attribute) => Ok(Some(attribute.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

/// OOXML on/off property: a missing `w:val` means on.
fn on_off(element: &BytesStart) -> quick_xml::Result<bool> {
    Ok(match attr(element, "w:val")?.as_deref() {
        None => true,
        Some(value) => !matches!(value, "0" | "false" | "off" | "none"),
    })
}

/// Apply one `w:rPr` child element to `props`. Unknown elements are ignored.
///
/// Shared by the body parser and the style sheet parser.
pub(crate) fn apply_run_property(
    element: &BytesStart,
    props: &mut RunProperties,
) -> quick_xml::Result<()> {
    match element.name().as_ref() {
        b"w:rStyle" => props.style_id = attr(element, "w:val")?,
        b"w:b" => props.bold = Some(on_off(element)?),
        b"w:i" => props.italic = Some(on_off(element)?),
        b"w:strike" => props.strike = Some(on_off(element)?),
        b"w:dstrike" => props.double_strike = Some(on_off(element)?),
        b"w:smallCaps" => props.small_caps = Some(on_off(element)?),
        b"w:u" => {
            let style = attr(element, "w:val")?;
            props.underline = Some(
                style
                    .as_deref()
                    .map(UnderlineStyle::from_ooxml)
                    .unwrap_or(UnderlineStyle::Single),
            );
            props.underline_color = attr(element, "w:color")?;
        }
        b"w:vertAlign" => {
            if let Some(value) = attr(element, "w:val")? {
                props.vertical_align = VerticalAlign::from_ooxml(&value);
            }
        }
        b"w:rFonts" => {
            let name = match attr(element, "w:ascii")? {
                Some(ascii) => Some(ascii),
                None => attr(element, "w:hAnsi")?,
            };
            if name.is_some() {
                props.font_name = name;
            }
        }
        b"w:sz" => props.size = attr(element, "w:val")?,
        b"w:color" => props.color = attr(element, "w:val")?,
        b"w:highlight" => {
            if let Some(value) = attr(element, "w:val")? {
                props.highlight = Some(HighlightColor::from_ooxml(&value));
            }
        }
        _ => {}
    }
    Ok(())
}

fn parse_twips(element: &BytesStart, name: &str) -> quick_xml::Result<Option<i32>> {
    Ok(attr(element, name)?.and_then(|value| value.trim().parse::<i32>().ok()))
}

fn apply_section_property(
    element: &BytesStart,
    section: &mut SectionProperties,
) -> quick_xml::Result<()> {
    match element.name().as_ref() {
        b"w:pgSz" => {
            section.page_width = parse_twips(element, "w:w")?.map(|w| w.max(0) as u32);
            section.page_height = parse_twips(element, "w:h")?.map(|h| h.max(0) as u32);
        }
        b"w:pgMar" => {
            section.margins = Some(PageMargins {
                top: parse_twips(element, "w:top")?.unwrap_or(0),
                right: parse_twips(element, "w:right")?.unwrap_or(0),
                bottom: parse_twips(element, "w:bottom")?.unwrap_or(0),
                left: parse_twips(element, "w:left")?.unwrap_or(0),
            });
        }
        _ => {}
    }
    Ok(())
}

/// Which `w:rPr` block the reader is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunPropertiesTarget {
    None,
    Run,
    /// `w:pPr/w:rPr` formats the paragraph mark, not any text
    ParagraphMark,
}

#[derive(Debug, Default)]
struct BodyState {
    paragraphs: Vec<Paragraph>,
    sections: Vec<SectionProperties>,
    paragraph: Option<Paragraph>,
    run: Option<Run>,
    section: Option<SectionProperties>,
    table_depth: usize,
    skip_depth: usize,
    in_paragraph_properties: bool,
    in_text: bool,
}

impl BodyState {
    fn run_properties_target(&self, in_rpr: bool) -> RunPropertiesTarget {
        if !in_rpr {
            RunPropertiesTarget::None
        } else if self.run.is_some() {
            RunPropertiesTarget::Run
        } else {
            RunPropertiesTarget::ParagraphMark
        }
    }

    /// Handle a start tag or a self-closing element.
    fn open(&mut self, element: &BytesStart, in_rpr: bool) -> quick_xml::Result<()> {
        if let Some(section) = self.section.as_mut() {
            return apply_section_property(element, section);
        }

        match element.name().as_ref() {
            b"w:tbl" => self.table_depth += 1,
            b"w:p" => {
                self.paragraph = Some(Paragraph {
                    in_table: self.table_depth > 0,
                    ..Default::default()
                });
            }
            b"w:pPr" => self.in_paragraph_properties = true,
            b"w:pStyle" if self.in_paragraph_properties => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.style_id = attr(element, "w:val")?;
                }
            }
            b"w:jc" if self.in_paragraph_properties => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.direct_alignment = attr(element, "w:val")?
                        .as_deref()
                        .and_then(Alignment::from_ooxml);
                }
            }
            b"w:r" if self.paragraph.is_some() => self.run = Some(Run::new(String::new())),
            b"w:t" => self.in_text = true,
            b"w:tab" if !self.in_paragraph_properties => self.push_text("\t"),
            b"w:br" | b"w:cr" => self.push_text("\n"),
            _ => match self.run_properties_target(in_rpr) {
                RunPropertiesTarget::Run => {
                    if let Some(run) = self.run.as_mut() {
                        apply_run_property(element, &mut run.direct)?;
                    }
                }
                RunPropertiesTarget::ParagraphMark | RunPropertiesTarget::None => {}
            },
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"w:tbl" => self.table_depth = self.table_depth.saturating_sub(1),
            b"w:p" => {
                if let Some(mut paragraph) = self.paragraph.take() {
                    paragraph.alignment = paragraph.direct_alignment;
                    self.paragraphs.push(paragraph);
                }
            }
            b"w:pPr" => self.in_paragraph_properties = false,
            b"w:r" => {
                if let (Some(mut run), Some(paragraph)) = (self.run.take(), self.paragraph.as_mut()) {
                    run.resolved = run.direct.clone();
                    paragraph.runs.push(run);
                }
            }
            b"w:t" => self.in_text = false,
            b"w:sectPr" => {
                if let Some(section) = self.section.take() {
                    self.sections.push(section);
                }
            }
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(run) = self.run.as_mut() {
            run.text.push_str(text);
        }
    }
}

/// Parse `word/document.xml` into a document with direct formatting only.
pub fn parse_document_xml(xml: &str) -> quick_xml::Result<Document> {
    let mut reader = Reader::from_str(xml);
    let mut state = BodyState::default();
    let mut rpr_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(element) => {
                let name = element.name();
                if SKIPPED_ELEMENTS.contains(&name.as_ref()) {
                    state.skip_depth += 1;
                    continue;
                }
                if state.skip_depth > 0 {
                    continue;
                }
                match name.as_ref() {
                    b"w:rPr" => rpr_depth += 1,
                    b"w:sectPr" => state.section = Some(SectionProperties::default()),
                    _ => state.open(&element, rpr_depth > 0)?,
                }
            }
            Event::Empty(element) => {
                if state.skip_depth > 0 {
                    continue;
                }
                match element.name().as_ref() {
                    b"w:rPr" => {}
                    b"w:sectPr" => state.sections.push(SectionProperties::default()),
                    name => {
                        state.open(&element, rpr_depth > 0)?;
                        state.close(name);
                    }
                }
            }
            Event::Text(text) => {
                if state.skip_depth == 0 && state.in_text {
                    let content = text.unescape()?;
                    state.push_text(&content);
                }
            }
            Event::End(element) => {
                let name = element.name();
                if SKIPPED_ELEMENTS.contains(&name.as_ref()) {
                    state.skip_depth = state.skip_depth.saturating_sub(1);
                    continue;
                }
                if state.skip_depth > 0 {
                    continue;
                }
                match name.as_ref() {
                    b"w:rPr" => rpr_depth = rpr_depth.saturating_sub(1),
                    other => state.close(other),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(Document {
        paragraphs: state.paragraphs,
        sections: state.sections,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(inner: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{inner}</w:body></w:document>"#
        )
    }

    #[test]
    fn test_parses_runs_and_direct_formatting() {
        let xml = body(
            r#"<w:p><w:r><w:rPr><w:b/><w:sz w:val="24"/><w:color w:val="00B050"/></w:rPr><w:t>Bold1</w:t></w:r><w:r><w:t xml:space="preserve"> plain</w:t></w:r></w:p>"#,
        );
        let document = parse_document_xml(&xml).unwrap();
        assert_eq!(document.paragraphs.len(), 1);
        let runs = &document.paragraphs[0].runs;
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "Bold1");
        assert!(runs[0].is_bold());
        assert_eq!(runs[0].font_size_pt(), Ok(Some(12.0)));
        assert_eq!(runs[1].text, " plain");
        assert!(!runs[1].is_bold());
    }

    #[test]
    fn test_on_off_values() {
        let xml = body(
            r#"<w:p><w:r><w:rPr><w:b w:val="0"/><w:i w:val="true"/><w:strike w:val="off"/><w:smallCaps w:val="1"/></w:rPr><w:t>x</w:t></w:r></w:p>"#,
        );
        let document = parse_document_xml(&xml).unwrap();
        let run = &document.paragraphs[0].runs[0];
        assert!(!run.is_bold());
        assert!(run.is_italic());
        assert!(!run.is_strike());
        assert!(run.is_small_caps());
    }

    #[test]
    fn test_paragraph_mark_properties_do_not_leak_into_runs() {
        let xml = body(
            r#"<w:p><w:pPr><w:jc w:val="right"/><w:rPr><w:b/><w:u w:val="double"/></w:rPr></w:pPr><w:r><w:t>Align Right</w:t></w:r></w:p>"#,
        );
        let document = parse_document_xml(&xml).unwrap();
        let paragraph = &document.paragraphs[0];
        assert_eq!(paragraph.direct_alignment, Some(Alignment::Right));
        assert!(!paragraph.runs[0].is_bold());
        assert_eq!(paragraph.runs[0].underline(), UnderlineStyle::None);
    }

    #[test]
    fn test_underline_fonts_and_highlight() {
        let xml = body(
            r#"<w:p><w:r><w:rPr><w:rFonts w:hAnsi="Comic Sans MS"/><w:u w:val="dotted" w:color="FF0000"/><w:highlight w:val="cyan"/><w:vertAlign w:val="superscript"/></w:rPr><w:t>x</w:t></w:r></w:p>"#,
        );
        let document = parse_document_xml(&xml).unwrap();
        let run = &document.paragraphs[0].runs[0];
        assert_eq!(run.font_name(), Some("Comic Sans MS"));
        assert_eq!(run.underline(), UnderlineStyle::Dotted);
        assert_eq!(run.resolved.underline_color.as_deref(), Some("FF0000"));
        assert_eq!(run.highlight(), Some(&HighlightColor::Cyan));
        assert!(run.is_superscript());
    }

    #[test]
    fn test_tables_tabs_breaks_and_deletions() {
        let xml = body(
            r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>Tahoma</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r><w:del w:id="1"><w:r><w:delText>gone</w:delText></w:r></w:del></w:p>"#,
        );
        let document = parse_document_xml(&xml).unwrap();
        assert_eq!(document.paragraphs.len(), 2);
        assert!(document.paragraphs[0].in_table);
        assert!(!document.paragraphs[1].in_table);
        assert_eq!(document.paragraphs[1].text(), "a\tb\nc");
        assert_eq!(document.paragraphs[1].runs.len(), 1);
    }

    #[test]
    fn test_escaped_text_and_section_properties() {
        let xml = body(
            r#"<w:p><w:r><w:t>Fish &amp; Chips</w:t></w:r></w:p><w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1800"/></w:sectPr>"#,
        );
        let document = parse_document_xml(&xml).unwrap();
        assert_eq!(document.paragraphs[0].text(), "Fish & Chips");
        assert_eq!(document.sections.len(), 1);
        let section = &document.sections[0];
        assert_eq!(section.page_width, Some(12240));
        assert_eq!(section.margins.map(|m| m.left), Some(1800));
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(parse_document_xml("<w:document><w:body><w:p></w:body>").is_err());
    }
}
