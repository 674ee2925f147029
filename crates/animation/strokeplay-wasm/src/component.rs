//! Behaviour of the `<animate-svg-component>` custom element.
//!
//! The JS glue owns the element class and forwards lifecycle callbacks to
//! [`StrokeComponent`]. Each render pass fetches the drawing, builds the
//! shadow tree, measures the shapes on a later frame and then drives the
//! [`Player`] from `requestAnimationFrame`.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::net::http::Request;
use gloo::render::{request_animation_frame, AnimationFrame};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, DomParser, Element, Event, HtmlElement, ShadowRootInit, ShadowRootMode,
    SupportedType, SvgElement,
};

use strokeplay_core::{
    measure_paths, ElementConfig, EngineConfig, Outputs, Player, RetryBudget, RetryOutcome,
    StrokeDocument, StrokeError, StrokeSurface, SvgRoot,
};

use crate::controls::{build_skeleton, Controls, Skeleton};
use crate::measurer::{collect_shapes, DomMeasurer};
use crate::surface::{invert_computed_colors, DomSurface};
use crate::{js_error, jsvalue_is_undefined_or_null};

const LOAD_ERROR_TEXT: &str = "Error loading SVG";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Transport {
    Start,
    Toggle,
    End,
}

/// A fetched and mounted drawing.
struct Scene {
    document: StrokeDocument,
    svg: Element,
    content: Element,
    controls: Controls,
    autoplay: bool,
    invert_colors: bool,
    budget: RetryBudget,
    /// Present once measurement succeeded.
    playback: Option<(Player, DomSurface)>,
}

#[derive(Default)]
struct State {
    /// Bumped by every render pass; stale fetches compare against it.
    generation: u64,
    config: ElementConfig,
    scene: Option<Scene>,
    frame: Option<AnimationFrame>,
    listeners: Vec<EventListener>,
}

struct Inner {
    host: HtmlElement,
    container: Element,
    engine: EngineConfig,
    state: RefCell<State>,
}

/// One custom element instance.
#[wasm_bindgen]
pub struct StrokeComponent {
    inner: Rc<Inner>,
}

#[wasm_bindgen]
impl StrokeComponent {
    /// Attach a shadow root to `host`. Pass an engine config object or
    /// undefined/null for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(host: HtmlElement, config: JsValue) -> Result<StrokeComponent, JsError> {
        console_error_panic_hook::set_once();
        crate::logger::init(log::LevelFilter::Info);

        let engine: EngineConfig = if jsvalue_is_undefined_or_null(&config) {
            EngineConfig::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };

        let shadow = host
            .attach_shadow(&ShadowRootInit::new(ShadowRootMode::Open))
            .map_err(|e| js_error("attach shadow root", e))?;
        let container = document()
            .and_then(|d| d.create_element("div"))
            .map_err(|e| js_error("create container", e))?;
        shadow
            .append_child(&container)
            .map_err(|e| js_error("append container", e))?;

        Ok(StrokeComponent {
            inner: Rc::new(Inner {
                host,
                container,
                engine,
                state: RefCell::new(State::default()),
            }),
        })
    }

    /// Rebuild everything from the current attributes.
    #[wasm_bindgen]
    pub fn render(&self) {
        self.inner.render();
    }

    /// Stop the frame loop. The next `render` starts over.
    #[wasm_bindgen]
    pub fn disconnect(&self) {
        self.inner.state.borrow_mut().frame = None;
    }

    #[wasm_bindgen(js_name = attribute_changed)]
    pub fn attribute_changed(
        &self,
        name: String,
        old_value: Option<String>,
        new_value: Option<String>,
    ) {
        if old_value != new_value {
            log::debug!("attribute '{name}' changed, re-rendering");
            self.inner.render();
        }
    }

    /// Same as the Start button.
    #[wasm_bindgen]
    pub fn start(&self) {
        self.inner.transport(Transport::Start);
    }

    /// Same as the Play/Pause button.
    #[wasm_bindgen]
    pub fn toggle(&self) {
        self.inner.transport(Transport::Toggle);
    }

    /// Same as the End button.
    #[wasm_bindgen]
    pub fn end(&self) {
        self.inner.transport(Transport::End);
    }

    /// Playback state name, or `"loading"` before measurement.
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        let state = self.inner.state.borrow();
        state
            .scene
            .as_ref()
            .and_then(|s| s.playback.as_ref())
            .map_or("loading", |(player, _)| player.state().name())
            .to_string()
    }

    #[wasm_bindgen]
    pub fn progress(&self) -> f64 {
        let state = self.inner.state.borrow();
        state
            .scene
            .as_ref()
            .and_then(|s| s.playback.as_ref())
            .map_or(0.0, |(player, _)| player.progress())
    }
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or(0.0, |p| p.now())
}

fn apply_outputs(surface: &mut DomSurface, out: &Outputs) {
    if let Some(frame) = &out.frame {
        surface.apply_frame(frame);
    }
}

async fn fetch_svg(path: &str) -> strokeplay_core::Result<String> {
    let fetch_error = |reason: String| StrokeError::Fetch {
        path: path.to_string(),
        reason,
    };
    let response = Request::get(path)
        .send()
        .await
        .map_err(|e| fetch_error(e.to_string()))?;
    if !response.ok() {
        return Err(fetch_error(format!("HTTP {}", response.status())));
    }
    response.text().await.map_err(|e| fetch_error(e.to_string()))
}

/// Let the drawing scale with its container.
fn make_responsive(svg: &Element, root: &SvgRoot) -> Result<(), JsValue> {
    // Taken from the markup, before the size attributes are dropped.
    let view_box = root.effective_view_box();
    if let Some(svg) = svg.dyn_ref::<SvgElement>() {
        let style = svg.style();
        style.set_property("width", "100%")?;
        style.set_property("height", "auto")?;
    }
    svg.remove_attribute("width")?;
    svg.remove_attribute("height")?;
    if svg.get_attribute("viewBox").is_none() {
        svg.set_attribute("viewBox", &view_box)?;
    }
    Ok(())
}

impl Inner {
    fn render(self: &Rc<Self>) {
        if let Err(err) = self.try_render() {
            log::error!("render failed: {err:?}");
        }
    }

    fn try_render(self: &Rc<Self>) -> Result<(), JsValue> {
        let (generation, config) = {
            let mut state = self.state.borrow_mut();
            state.frame = None;
            state.listeners.clear();
            state.scene = None;
            state.generation += 1;
            state.config =
                ElementConfig::from_attributes(|name| self.host.get_attribute(name), &self.engine);
            (state.generation, state.config.clone())
        };

        self.container.set_inner_html("");
        self.container.remove_attribute("style")?;
        self.style_host(&config)?;
        let skeleton = build_skeleton(&document()?, &self.container)?;

        let Some(path) = config.svg_file_path else {
            return Ok(());
        };
        let weak = Rc::downgrade(self);
        wasm_bindgen_futures::spawn_local(async move {
            let loaded = fetch_svg(&path).await;
            if let Some(inner) = weak.upgrade() {
                inner.on_loaded(generation, skeleton, loaded);
            }
        });
        Ok(())
    }

    fn style_host(&self, config: &ElementConfig) -> Result<(), JsValue> {
        let style = self.host.style();
        style.set_property("display", "inline-block")?;
        style.set_property("box-sizing", "border-box")?;
        style.set_property("width", &config.width)?;
        style.set_property("height", config.host_height())?;
        style.set_property("padding", "0")?;
        style.set_property("margin", "0")?;
        style.set_property("line-height", "0")?;
        style.set_property("vertical-align", "top")?;
        for (property, value) in [
            ("background-color", &config.background_color),
            ("border", &config.border),
        ] {
            match value {
                Some(value) => style.set_property(property, value)?,
                None => {
                    style.remove_property(property)?;
                }
            }
        }
        Ok(())
    }

    fn on_loaded(
        self: &Rc<Self>,
        generation: u64,
        skeleton: Skeleton,
        loaded: strokeplay_core::Result<String>,
    ) {
        if self.state.borrow().generation != generation {
            log::debug!("dropping result of a superseded load");
            return;
        }
        match loaded {
            Ok(text) => {
                if let Err(err) = self.mount(skeleton, text) {
                    log::error!("could not mount svg: {err:?}");
                }
            }
            Err(err) => {
                log::error!("{err}");
                skeleton.content.set_text_content(Some(LOAD_ERROR_TEXT));
            }
        }
    }

    fn mount(self: &Rc<Self>, skeleton: Skeleton, text: String) -> Result<(), JsValue> {
        let doc = match StrokeDocument::parse(text) {
            Ok(doc) => doc,
            Err(err) => {
                log::warn!("{err}");
                return Ok(());
            }
        };
        let parsed = DomParser::new()?.parse_from_string(doc.text(), SupportedType::ImageSvgXml)?;
        let Some(svg) = parsed.query_selector("svg")? else {
            log::warn!("{}", StrokeError::MissingSvgRoot);
            return Ok(());
        };

        let config = self.state.borrow().config.clone();
        let autoplay = doc.should_autoplay(config.auto_play);
        make_responsive(&svg, doc.root())?;
        skeleton.content.set_inner_html("");
        skeleton.content.append_child(&svg)?;

        let controls = Controls::build(&document()?, autoplay)?;
        skeleton.wrapper.append_child(&controls.overlay)?;
        let listeners = self.bind_controls(&controls);

        {
            let mut state = self.state.borrow_mut();
            state.listeners = listeners;
            state.scene = Some(Scene {
                document: doc,
                svg,
                content: skeleton.content,
                controls,
                autoplay,
                invert_colors: config.invert_colors,
                budget: RetryBudget::new("measure", self.engine.max_measure_retries),
                playback: None,
            });
        }
        // Shapes only have lengths once the browser has laid them out.
        self.request_frame(Inner::setup);
        Ok(())
    }

    fn bind_controls(self: &Rc<Self>, controls: &Controls) -> Vec<EventListener> {
        let bind = |target: &Element, action: Transport| {
            let weak = Rc::downgrade(self);
            EventListener::new(target, "click", move |event: &Event| {
                event.stop_propagation();
                if let Some(inner) = weak.upgrade() {
                    inner.transport(action);
                }
            })
        };
        vec![
            bind(&controls.start, Transport::Start),
            bind(&controls.play_pause, Transport::Toggle),
            bind(&controls.end, Transport::End),
        ]
    }

    fn request_frame(self: &Rc<Self>, step: fn(&Rc<Inner>, f64)) {
        let weak = Rc::downgrade(self);
        let handle = request_animation_frame(move |now| {
            if let Some(inner) = weak.upgrade() {
                inner.state.borrow_mut().frame.take();
                step(&inner, now);
            }
        });
        self.state.borrow_mut().frame = Some(handle);
    }

    /// Measure the mounted drawing, retrying on later frames while it has no
    /// layout.
    fn setup(self: &Rc<Self>, now: f64) {
        let threshold = self.engine.grayscale_threshold;
        let next = {
            let mut state = self.state.borrow_mut();
            let duration_ms = state.config.duration_ms;
            let Some(scene) = state.scene.as_mut() else {
                return;
            };
            let shapes = match collect_shapes(&scene.svg) {
                Ok(shapes) => shapes,
                Err(err) => {
                    log::error!("could not collect shapes: {err:?}");
                    return;
                }
            };
            let outcome = scene
                .budget
                .attempt(|| measure_paths(&mut DomMeasurer::new(&scene.svg, &shapes)));
            match outcome {
                Some(RetryOutcome::Ready(table)) => {
                    let points = scene.document.pause_points(&table);
                    let mut player = Player::new(table, points, duration_ms);
                    let mut surface = DomSurface::new(shapes, scene.content.clone());
                    surface.apply_frame(&player.frame());
                    if scene.invert_colors {
                        if let Err(err) = invert_computed_colors(&scene.svg, threshold) {
                            log::warn!("colour inversion failed: {err:?}");
                        }
                    }
                    if scene.autoplay {
                        apply_outputs(&mut surface, player.play(now));
                    }
                    let needs_frames = player.state().needs_frames();
                    scene.playback = Some((player, surface));
                    needs_frames.then_some(Inner::advance as fn(&Rc<Inner>, f64))
                }
                Some(RetryOutcome::Retry(_)) => Some(Inner::setup as fn(&Rc<Inner>, f64)),
                // The budget already logged the final failure.
                Some(RetryOutcome::Exhausted(_)) | None => None,
            }
        };
        if let Some(step) = next {
            self.request_frame(step);
        }
    }

    fn advance(self: &Rc<Self>, now: f64) {
        let needs_frames = {
            let mut state = self.state.borrow_mut();
            let Some(scene) = state.scene.as_mut() else {
                return;
            };
            let Some((player, surface)) = scene.playback.as_mut() else {
                return;
            };
            let out = player.update(now);
            apply_outputs(surface, out);
            let changed = !out.events.is_empty();
            if changed {
                scene.controls.show_playing(player.is_playing());
            }
            player.state().needs_frames()
        };
        if needs_frames {
            self.request_frame(Inner::advance);
        }
    }

    fn transport(self: &Rc<Self>, action: Transport) {
        let now = now_ms();
        let needs_frames = {
            let mut state = self.state.borrow_mut();
            let Some(scene) = state.scene.as_mut() else {
                return;
            };
            if action == Transport::Toggle {
                scene.controls.release_overlay();
            }
            let Some((player, surface)) = scene.playback.as_mut() else {
                // Not measured yet: only remember whether to start playing.
                if action == Transport::Toggle {
                    scene.autoplay = !scene.autoplay;
                    scene.controls.show_playing(scene.autoplay);
                }
                return;
            };
            let out = match action {
                Transport::Start => player.reset(now),
                Transport::Toggle => player.toggle(now),
                Transport::End => player.finish(now),
            };
            apply_outputs(surface, out);
            scene.controls.show_playing(player.is_playing());
            player.state().needs_frames()
        };

        if !needs_frames {
            self.state.borrow_mut().frame = None;
        } else if self.state.borrow().frame.is_none() {
            self.request_frame(Inner::advance);
        }
    }
}
