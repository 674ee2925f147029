//! [`StrokeSurface`] over live SVG elements, and computed-style colour
//! inversion.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, SvgElement};

use strokeplay_core::{
    invert_css_color, surface::FINISHED_CLASS, ColorProperty, Rgb, StrokeDash, StrokeSurface,
    DRAWABLE_SELECTOR,
};

use crate::measurer::node_elements;

/// Applies frames to the shapes of one drawing.
pub struct DomSurface {
    /// Indexed like the measured elements, skipped shapes included.
    shapes: Vec<Element>,
    /// Element carrying the finished class.
    content: Element,
}

impl DomSurface {
    pub fn new(shapes: Vec<Element>, content: Element) -> Self {
        Self { shapes, content }
    }
}

impl StrokeSurface for DomSurface {
    fn apply_dash(&mut self, dash: &StrokeDash) {
        let Some(shape) = self
            .shapes
            .get(dash.element)
            .and_then(|el| el.dyn_ref::<SvgElement>())
        else {
            return;
        };
        let style = shape.style();
        let applied = style
            .set_property("stroke-dasharray", &dash.dash_array_css())
            .and_then(|_| style.set_property("stroke-dashoffset", &dash.dash_offset_css()));
        if let Err(err) = applied {
            log::debug!("could not style shape {}: {err:?}", dash.element);
        }
    }

    fn set_finished(&mut self, finished: bool) {
        if let Err(err) = self
            .content
            .class_list()
            .toggle_with_force(FINISHED_CLASS, finished)
        {
            log::debug!("could not toggle finished class: {err:?}");
        }
    }
}

/// Invert grayscale computed stroke and fill colours of every drawable and
/// group below `svg`. Returns the number of properties changed.
///
/// All computed colours are read before any is written, so a group's new
/// colour is not inherited and inverted a second time by its children.
pub fn invert_computed_colors(svg: &Element, threshold: u8) -> Result<usize, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let elements = node_elements(&svg.query_selector_all(&format!("{DRAWABLE_SELECTOR}, g"))?);

    let mut pending: Vec<(SvgElement, ColorProperty, Rgb)> = Vec::new();
    for el in elements {
        let Some(computed) = window.get_computed_style(&el)? else {
            continue;
        };
        let Ok(el) = el.dyn_into::<SvgElement>() else {
            continue;
        };
        for property in ColorProperty::ALL {
            let value = computed.get_property_value(property.as_str())?;
            if let Some(color) = invert_css_color(&value, threshold) {
                pending.push((el.clone(), property, color));
            }
        }
    }

    for (el, property, color) in &pending {
        el.style()
            .set_property(property.as_str(), &color.to_string())?;
    }
    log::debug!("inverted {} colours", pending.len());
    Ok(pending.len())
}
