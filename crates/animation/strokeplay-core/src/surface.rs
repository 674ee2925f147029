//! Markup-backed [`StrokeSurface`] that renders snapshots as SVG text.

use std::collections::BTreeMap;

use crate::color::ColorChange;
use crate::document::StrokeDocument;
use crate::draw::{StrokeDash, StrokeSurface};
use crate::scan::{Attribute, Tag};

pub const FINISHED_CLASS: &str = "finished";

/// Collects inline style overrides per tag and writes them back into the
/// source markup.
#[derive(Debug)]
pub struct MarkupSurface<'a> {
    document: &'a StrokeDocument,
    /// Overrides keyed by tag offset.
    styles: BTreeMap<usize, Vec<(String, String)>>,
    finished: bool,
}

impl<'a> MarkupSurface<'a> {
    pub fn new(document: &'a StrokeDocument) -> Self {
        Self {
            document,
            styles: BTreeMap::new(),
            finished: false,
        }
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Style overrides recorded for the tag at `offset`.
    pub fn style_for(&self, offset: usize) -> &[(String, String)] {
        self.styles.get(&offset).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn apply_color(&mut self, change: &ColorChange) {
        self.set_style(
            change.offset,
            change.property.as_str(),
            change.color.to_string(),
        );
    }

    fn set_style(&mut self, offset: usize, name: &str, value: String) {
        let declarations = self.styles.entry(offset).or_default();
        match declarations.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => declarations.push((name.to_string(), value)),
        }
    }

    /// The document with every recorded override applied.
    pub fn to_svg(&self) -> String {
        let text = self.document.text();
        let root = self.document.root();
        let mut edits: Vec<(&Tag, String)> = self
            .document
            .drawables()
            .iter()
            .map(|d| &d.tag)
            .chain(self.document.groups())
            .filter_map(|tag| {
                let extra = self.styles.get(&tag.offset)?;
                Some((tag, tag.render_with_style(extra)))
            })
            .collect();
        edits.push((&root.tag, self.render_root()));
        edits.sort_by_key(|(tag, _)| tag.offset);

        let mut out = String::with_capacity(text.len() + edits.len() * 64);
        let mut cursor = 0;
        for (tag, rendered) in edits {
            // A tag swallowed by an earlier, malformed match keeps its source text.
            if tag.offset < cursor {
                log::debug!("skipping overlapped <{}> at {}", tag.name, tag.offset);
                continue;
            }
            out.push_str(&text[cursor..tag.offset]);
            out.push_str(&rendered);
            cursor = tag.end;
        }
        out.push_str(&text[cursor..]);
        out
    }

    fn render_root(&self) -> String {
        let root = self.document.root();
        let mut tag = root.tag.clone();
        if root.view_box.is_none() {
            tag.attributes.retain(|a| a.name != "viewBox");
            tag.attributes.push(Attribute {
                name: "viewBox".to_string(),
                value: root.effective_view_box(),
                quote: '"',
            });
        }
        let mut classes: Vec<&str> = root
            .tag
            .attr("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default();
        classes.retain(|c| *c != FINISHED_CLASS);
        if self.finished {
            classes.push(FINISHED_CLASS);
        }
        let class = classes.join(" ");
        tag.attributes.retain(|a| a.name != "class");
        if !class.is_empty() {
            tag.attributes.push(Attribute {
                name: "class".to_string(),
                value: class,
                quote: '"',
            });
        }
        tag.render_with_style(self.style_for(root.offset))
    }
}

impl StrokeSurface for MarkupSurface<'_> {
    fn apply_dash(&mut self, dash: &StrokeDash) {
        let Some(shape) = self.document.drawables().get(dash.element) else {
            log::debug!("no drawable for element {}", dash.element);
            return;
        };
        let offset = shape.tag.offset;
        self.set_style(offset, "stroke-dasharray", dash.dash_array_css());
        self.set_style(offset, "stroke-dashoffset", dash.dash_offset_css());
    }

    fn set_finished(&mut self, finished: bool) {
        self.finished = finished;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::Frame;
    use crate::measure::measure_paths;

    fn document() -> StrokeDocument {
        StrokeDocument::parse(
            r##"<svg width="20" height="10"><line x2="10" stroke="#000"/><rect width="0" height="1"/></svg>"##,
        )
        .unwrap()
    }

    #[test]
    fn snapshot_carries_dashes_and_view_box() {
        let doc = document();
        let table = measure_paths(&mut doc.geometry_measurer(0.1)).unwrap();
        let mut surface = MarkupSurface::new(&doc);
        surface.apply_frame(&Frame::at(&table, 0.5, false));
        assert_eq!(
            surface.to_svg(),
            r##"<svg width="20" height="10" viewBox="0 0 20 10"><line x2="10" stroke="#000" style="stroke-dasharray: 10 10; stroke-dashoffset: 5"/><rect width="0" height="1"/></svg>"##
        );
    }

    #[test]
    fn finished_class_and_colours() {
        let doc = document();
        let table = measure_paths(&mut doc.geometry_measurer(0.1)).unwrap();
        let mut surface = MarkupSurface::new(&doc);
        for change in doc.color_changes(30) {
            surface.apply_color(&change);
        }
        surface.apply_frame(&Frame::at(&table, 1.0, true));
        let svg = surface.to_svg();
        assert!(svg.starts_with(r#"<svg width="20" height="10" viewBox="0 0 20 10" class="finished">"#));
        assert!(svg.contains("stroke: rgb(255, 255, 255); stroke-dasharray: 10 10; stroke-dashoffset: 0"));

        surface.set_finished(false);
        assert!(!surface.to_svg().contains("finished"));
    }

    #[test]
    fn overlapping_tags_do_not_break_the_snapshot() {
        let text = r##"<svg><!-- <g fill="#fff" <line x2="5"/> --><line x2="10"/></svg>"##;
        let (doc, player) = crate::load_player(text, 1000.0, &Default::default()).unwrap();
        let mut surface = MarkupSurface::new(&doc);
        for change in doc.color_changes(30) {
            surface.apply_color(&change);
        }
        surface.apply_frame(&player.frame());
        let svg = surface.to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#" --><line x2="10" style="stroke-dasharray: 10 10; stroke-dashoffset: 10"/></svg>"#));
    }
}
