//! Shadow-DOM markup: style sheet, overlay controls and their icons.

use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

pub const STYLE_SHEET: &str = r#"
.controls-overlay {
    position: absolute;
    bottom: 10px;
    right: 10px;
    display: flex;
    gap: 10px;
    background: rgba(0, 0, 0, 0.5);
    padding: 6px 12px;
    border-radius: 20px;
    opacity: 0;
    transition: opacity 0.3s ease;
    pointer-events: none;
    z-index: 100;
    backdrop-filter: blur(4px);
}
.wrapper:hover .controls-overlay,
.controls-overlay:hover,
.controls-overlay.force-visible {
    opacity: 1;
    pointer-events: auto;
}
.control-btn {
    background: transparent;
    border: none;
    color: rgba(255, 255, 255, 0.9);
    cursor: pointer;
    width: 20px;
    height: 20px;
    display: flex;
    align-items: center;
    justify-content: center;
    padding: 0;
    transition: transform 0.1s, color 0.2s;
}
.control-btn:hover {
    transform: scale(1.1);
    color: #fff;
}
.control-btn:active {
    transform: scale(0.95);
}
.control-btn svg {
    width: 16px;
    height: 16px;
    fill: currentColor;
    display: block;
}
.svg-content path, .svg-content line, .svg-content polyline,
.svg-content polygon, .svg-content rect, .svg-content circle, .svg-content ellipse {
    stroke-linecap: round;
    stroke-linejoin: round;
    fill-opacity: 0;
    transition: fill-opacity 0.5s ease;
}
.svg-content.finished path, .svg-content.finished line, .svg-content.finished polyline,
.svg-content.finished polygon, .svg-content.finished rect, .svg-content.finished circle,
.svg-content.finished ellipse {
    fill-opacity: 1;
}
"#;

pub const FORCE_VISIBLE_CLASS: &str = "force-visible";

const ICON_START: &str =
    r#"<svg viewBox="0 0 24 24"><path d="M11 18V6l-8.5 6 8.5 6zm.5-6l8.5 6V6l-8.5 6z"/></svg>"#;
const ICON_PAUSE: &str =
    r#"<svg viewBox="0 0 24 24"><path d="M6 19h4V5H6v14zm8-14v14h4V5h-4z"/></svg>"#;
const ICON_PLAY: &str = r#"<svg viewBox="0 0 24 24"><path d="M8 5v14l11-7z"/></svg>"#;
const ICON_END: &str =
    r#"<svg viewBox="0 0 24 24"><path d="M4 18l8.5-6L4 6v12zm9-12v12l8.5-6L13 6z"/></svg>"#;

/// Elements of the shadow tree that outlive a render pass.
pub struct Skeleton {
    /// Positioned wrapper that hosts the overlay.
    pub wrapper: Element,
    /// Holds the drawing; carries the finished class.
    pub content: Element,
}

/// Build the style sheet and wrappers inside `container`.
pub fn build_skeleton(document: &Document, container: &Element) -> Result<Skeleton, JsValue> {
    let style = document.create_element("style")?;
    style.set_text_content(Some(STYLE_SHEET));
    container.append_child(&style)?;

    let wrapper = document.create_element("div")?;
    wrapper.set_class_name("wrapper");
    wrapper.set_attribute("style", "width: 100%; height: 100%; position: relative;")?;
    container.append_child(&wrapper)?;

    let content = document.create_element("div")?;
    content.set_class_name("svg-content");
    content.set_attribute("style", "width: 100%; height: auto; display: block;")?;
    wrapper.append_child(&content)?;

    Ok(Skeleton { wrapper, content })
}

/// Start / play-pause / end buttons.
pub struct Controls {
    pub overlay: Element,
    pub start: Element,
    pub play_pause: Element,
    pub end: Element,
}

impl Controls {
    pub fn build(document: &Document, playing: bool) -> Result<Self, JsValue> {
        let overlay = document.create_element("div")?;
        overlay.set_class_name("controls-overlay");
        if !playing {
            overlay.class_list().add_1(FORCE_VISIBLE_CLASS)?;
        }
        let button = |icon: &str, title: &str| -> Result<Element, JsValue> {
            let btn = document.create_element("button")?;
            btn.set_class_name("control-btn");
            btn.set_inner_html(icon);
            btn.set_attribute("title", title)?;
            overlay.append_child(&btn)?;
            Ok(btn)
        };
        let start = button(ICON_START, "Start")?;
        let (icon, title) = if playing {
            (ICON_PAUSE, "Pause")
        } else {
            (ICON_PLAY, "Play")
        };
        let play_pause = button(icon, title)?;
        let end = button(ICON_END, "End")?;
        Ok(Self {
            overlay,
            start,
            play_pause,
            end,
        })
    }

    /// Show pause while playing, resume otherwise.
    pub fn show_playing(&self, playing: bool) {
        let (icon, title) = if playing {
            (ICON_PAUSE, "Pause")
        } else {
            (ICON_PLAY, "Resume")
        };
        self.play_pause.set_inner_html(icon);
        let _ = self.play_pause.set_attribute("title", title);
    }

    pub fn release_overlay(&self) {
        let _ = self.overlay.class_list().remove_1(FORCE_VISIBLE_CLASS);
    }
}
