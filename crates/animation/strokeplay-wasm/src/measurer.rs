//! Shape measurement against live SVG elements.

use js_sys::{Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, NodeList, SvgElement};

use strokeplay_core::{PathMeasurer, Result, StrokeError, DRAWABLE_SELECTOR};

/// Elements of a node list, in list order.
pub fn node_elements(nodes: &NodeList) -> Vec<Element> {
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Every drawable shape below `svg`, in document order.
pub fn collect_shapes(svg: &Element) -> std::result::Result<Vec<Element>, JsValue> {
    Ok(node_elements(&svg.query_selector_all(DRAWABLE_SELECTOR)?))
}

fn has_size(el: &Element) -> bool {
    let rect = el.get_bounding_client_rect();
    rect.width() > 0.0 && rect.height() > 0.0
}

/// Measures shapes with `getTotalLength`.
pub struct DomMeasurer<'a> {
    svg: &'a Element,
    shapes: &'a [Element],
}

impl<'a> DomMeasurer<'a> {
    pub fn new(svg: &'a Element, shapes: &'a [Element]) -> Self {
        Self { svg, shapes }
    }
}

impl PathMeasurer for DomMeasurer<'_> {
    fn ensure_layout(&mut self) -> Result<()> {
        if has_size(self.svg) {
            return Ok(());
        }
        // Give a collapsed drawing a minimal box, then look again.
        if let Some(svg) = self.svg.dyn_ref::<SvgElement>() {
            let rect = svg.get_bounding_client_rect();
            let style = svg.style();
            if rect.width() <= 0.0 {
                let _ = style.set_property("width", "1px");
            }
            if rect.height() <= 0.0 {
                let _ = style.set_property("height", "1px");
            }
        }
        if has_size(self.svg) {
            Ok(())
        } else {
            Err(StrokeError::not_laid_out("svg has no rendered size"))
        }
    }

    fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    fn measure(&mut self, index: usize) -> Option<f64> {
        let shape = self.shapes.get(index)?;
        let method = Reflect::get(shape, &JsValue::from_str("getTotalLength"))
            .ok()?
            .dyn_into::<Function>()
            .ok()?;
        match method.call0(shape) {
            Ok(length) => length.as_f64(),
            Err(err) => {
                log::debug!("getTotalLength failed on shape {index}: {err:?}");
                None
            }
        }
    }
}
