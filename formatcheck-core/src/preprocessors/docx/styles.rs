//! Style sheet parsing and formatting inheritance
//!
//! Effective run formatting is layered, lowest priority first:
//! document defaults, the paragraph style chain, the character style chain,
//! then direct formatting. Paragraphs without `w:pStyle`, or naming a style
//! the sheet lacks, use the default paragraph style. Alignment comes from the paragraph itself or, failing
//! that, the nearest style in its chain that sets `w:jc`.

use super::xml_parser::{apply_run_property, attr};
use crate::document::{Alignment, Document, RunProperties, Style, StyleKind, StyleSheet};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// `basedOn` chains longer than this are treated as cyclic.
const MAX_STYLE_DEPTH: usize = 32;

fn style_kind(value: Option<&str>) -> StyleKind {
    match value {
        Some("character") => StyleKind::Character,
        Some("table") => StyleKind::Table,
        Some("numbering") => StyleKind::Numbering,
        _ => StyleKind::Paragraph,
    }
}

fn start_style(element: &BytesStart) -> quick_xml::Result<Style> {
    let is_default = matches!(
        attr(element, "w:default")?.as_deref(),
        Some("1") | Some("true") | Some("on")
    );
    Ok(Style {
        id: attr(element, "w:styleId")?.unwrap_or_default(),
        name: None,
        kind: style_kind(attr(element, "w:type")?.as_deref()),
        based_on: None,
        is_default,
        run: RunProperties::default(),
        alignment: None,
    })
}

/// Parse `word/styles.xml`.
pub fn parse_styles_xml(xml: &str) -> quick_xml::Result<StyleSheet> {
    let mut reader = Reader::from_str(xml);
    let mut sheet = StyleSheet::default();
    let mut style: Option<Style> = None;
    let mut in_run_defaults = false;
    let mut in_rpr = false;
    let mut in_ppr = false;

    loop {
        let (element, is_empty) = match reader.read_event()? {
            Event::Start(element) => (element, false),
            Event::Empty(element) => (element, true),
            Event::End(element) => {
                match element.name().as_ref() {
                    b"w:style" => {
                        if let Some(finished) = style.take() {
                            if !finished.id.is_empty() {
                                sheet.styles.push(finished);
                            }
                        }
                    }
                    b"w:rPrDefault" => in_run_defaults = false,
                    b"w:rPr" => in_rpr = false,
                    b"w:pPr" => in_ppr = false,
                    _ => {}
                }
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        match element.name().as_ref() {
            b"w:style" => {
                let started = start_style(&element)?;
                if is_empty {
                    if !started.id.is_empty() {
                        sheet.styles.push(started);
                    }
                } else {
                    style = Some(started);
                }
            }
            b"w:rPrDefault" => in_run_defaults = !is_empty,
            b"w:rPr" => in_rpr = !is_empty,
            b"w:pPr" => in_ppr = !is_empty,
            b"w:name" => {
                if let Some(current) = style.as_mut() {
                    current.name = attr(&element, "w:val")?;
                }
            }
            b"w:basedOn" => {
                if let Some(current) = style.as_mut() {
                    current.based_on = attr(&element, "w:val")?;
                }
            }
            b"w:jc" if in_ppr => {
                if let Some(current) = style.as_mut() {
                    current.alignment = attr(&element, "w:val")?
                        .as_deref()
                        .and_then(Alignment::from_ooxml);
                }
            }
            _ if in_rpr => {
                if let Some(current) = style.as_mut() {
                    apply_run_property(&element, &mut current.run)?;
                } else if in_run_defaults {
                    apply_run_property(&element, &mut sheet.default_run)?;
                }
            }
            _ => {}
        }
    }

    Ok(sheet)
}

impl StyleSheet {
    pub fn default_style(&self, kind: StyleKind) -> Option<&Style> {
        self.styles
            .iter()
            .find(|style| style.kind == kind && style.is_default)
    }

    /// The `basedOn` chain of `id`, root first. Stops at missing ids and cycles.
    pub fn chain(&self, id: &str) -> Vec<&Style> {
        let mut chain: Vec<&Style> = Vec::new();
        let mut next = self.get(id);
        while let Some(style) = next {
            if chain.len() >= MAX_STYLE_DEPTH || chain.iter().any(|seen| seen.id == style.id) {
                break;
            }
            chain.push(style);
            next = style.based_on.as_deref().and_then(|parent| self.get(parent));
        }
        chain.reverse();
        chain
    }

    /// The paragraph's own style, or the default paragraph style when it has
    /// none or names a style the sheet does not define.
    fn paragraph_style_id<'a>(&'a self, paragraph_style: Option<&'a str>) -> Option<&'a str> {
        paragraph_style
            .filter(|id| self.get(id).is_some())
            .or_else(|| {
                self.default_style(StyleKind::Paragraph)
                    .map(|style| style.id.as_str())
            })
    }

    /// Effective run formatting for a run with `direct` formatting inside a
    /// paragraph styled `paragraph_style`.
    pub fn resolve_run(
        &self,
        paragraph_style: Option<&str>,
        direct: &RunProperties,
    ) -> RunProperties {
        let mut resolved = self.default_run.clone();
        if let Some(id) = self.paragraph_style_id(paragraph_style) {
            for style in self.chain(id) {
                resolved.overlay(&style.run);
            }
        }
        if let Some(id) = direct.style_id.as_deref() {
            for style in self.chain(id) {
                resolved.overlay(&style.run);
            }
        }
        resolved.overlay(direct);
        resolved
    }

    /// Effective alignment of a paragraph.
    pub fn resolve_alignment(
        &self,
        paragraph_style: Option<&str>,
        direct: Option<Alignment>,
    ) -> Option<Alignment> {
        direct.or_else(|| {
            let id = self.paragraph_style_id(paragraph_style)?;
            self.chain(id)
                .iter()
                .rev()
                .find_map(|style| style.alignment)
        })
    }

    /// Fill in `resolved` formatting and alignment for every paragraph.
    pub fn apply_to(&self, document: &mut Document) {
        for paragraph in &mut document.paragraphs {
            let style_id = paragraph.style_id.as_deref();
            paragraph.alignment = self.resolve_alignment(style_id, paragraph.direct_alignment);
            for run in &mut paragraph.runs {
                run.resolved = self.resolve_run(style_id, &run.direct);
            }
        }
    }
}
