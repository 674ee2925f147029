//! Pure-data player for hosts that manage the DOM themselves.

use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use strokeplay_core::{
    measure_paths, EngineConfig, KnownLengths, MarkupSurface, Outputs, Player, StrokeDocument,
    StrokeSurface,
};

use crate::jsvalue_is_undefined_or_null;

#[wasm_bindgen]
pub struct StrokePlayer {
    document: StrokeDocument,
    player: Player,
    engine: EngineConfig,
}

fn outputs_to_js(out: &Outputs) -> Result<JsValue, JsError> {
    swb::to_value(out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
}

#[wasm_bindgen]
impl StrokePlayer {
    /// Load SVG markup.
    ///
    /// `lengths` holds one length per drawable in document order (as
    /// reported by `getTotalLength`); pass undefined/null to measure from the
    /// markup geometry. `animation_speed` takes the raw attribute value.
    /// `config` is an engine config object or undefined/null for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        svg_text: String,
        lengths: JsValue,
        animation_speed: Option<String>,
        config: JsValue,
    ) -> Result<StrokePlayer, JsError> {
        console_error_panic_hook::set_once();

        let engine: EngineConfig = if jsvalue_is_undefined_or_null(&config) {
            EngineConfig::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        let document = StrokeDocument::parse(svg_text)?;
        let table = if jsvalue_is_undefined_or_null(&lengths) {
            measure_paths(&mut document.geometry_measurer(engine.curve_accuracy))?
        } else {
            let lengths: Vec<f64> = swb::from_value(lengths)
                .map_err(|e| JsError::new(&format!("lengths error: {e}")))?;
            measure_paths(&mut KnownLengths(lengths))?
        };
        let points = document.pause_points(&table);
        let duration_ms = engine.effective_duration_ms(animation_speed.as_deref());
        Ok(StrokePlayer {
            player: Player::new(table, points, duration_ms),
            document,
            engine,
        })
    }

    #[wasm_bindgen]
    pub fn play(&mut self, now: f64) -> Result<JsValue, JsError> {
        outputs_to_js(self.player.play(now))
    }

    #[wasm_bindgen]
    pub fn pause(&mut self, now: f64) -> Result<JsValue, JsError> {
        outputs_to_js(self.player.pause(now))
    }

    #[wasm_bindgen]
    pub fn reset(&mut self, now: f64) -> Result<JsValue, JsError> {
        outputs_to_js(self.player.reset(now))
    }

    #[wasm_bindgen]
    pub fn finish(&mut self, now: f64) -> Result<JsValue, JsError> {
        outputs_to_js(self.player.finish(now))
    }

    #[wasm_bindgen]
    pub fn toggle(&mut self, now: f64) -> Result<JsValue, JsError> {
        outputs_to_js(self.player.toggle(now))
    }

    /// Advance to `now` (a `requestAnimationFrame` timestamp). Returns
    /// Outputs JSON.
    #[wasm_bindgen]
    pub fn tick(&mut self, now: f64) -> Result<JsValue, JsError> {
        outputs_to_js(self.player.update(now))
    }

    #[wasm_bindgen]
    pub fn state(&self) -> String {
        self.player.state().name().to_string()
    }

    /// Whether `tick` still has to be called every frame.
    #[wasm_bindgen]
    pub fn needs_frames(&self) -> bool {
        self.player.state().needs_frames()
    }

    #[wasm_bindgen]
    pub fn progress(&self) -> f64 {
        self.player.progress()
    }

    #[wasm_bindgen]
    pub fn duration_ms(&self) -> f64 {
        self.player.duration_ms()
    }

    #[wasm_bindgen]
    pub fn autoplay(&self, requested: bool) -> bool {
        self.document.should_autoplay(requested)
    }

    #[wasm_bindgen]
    pub fn pause_points(&self) -> Result<JsValue, JsError> {
        swb::to_value(self.player.pause_points())
            .map_err(|e| JsError::new(&format!("pause points error: {e}")))
    }

    #[wasm_bindgen]
    pub fn path_table(&self) -> Result<JsValue, JsError> {
        swb::to_value(self.player.table())
            .map_err(|e| JsError::new(&format!("path table error: {e}")))
    }

    /// Current frame rendered into the markup, optionally with grayscale
    /// paints inverted.
    #[wasm_bindgen]
    pub fn snapshot_svg(&self, invert_colors: bool) -> String {
        let mut surface = MarkupSurface::new(&self.document);
        if invert_colors {
            for change in self.document.color_changes(self.engine.grayscale_threshold) {
                surface.apply_color(&change);
            }
        }
        surface.apply_frame(&self.player.frame());
        surface.to_svg()
    }
}
