//! Strokeplay Core (engine-agnostic)
//!
//! Stroke-draw animation of SVG drawings: markup scanning, shape
//! measurement, pause points taken from comment markers, the playback state
//! machine and per-frame stroke-dash computation. Adapters supply the clock
//! and the surface; nothing here touches a DOM.

pub mod color;
pub mod config;
pub mod document;
pub mod draw;
pub mod error;
pub mod measure;
pub mod outputs;
pub mod pause;
pub mod player;
pub mod retry;
pub mod scan;
pub mod shape;
pub mod surface;

// Re-exports for consumers (adapters)
pub use color::{invert_css_color, invert_if_grayscale, ColorChange, ColorProperty, Rgb};
pub use config::{parse_leading_int, ElementConfig, EngineConfig, OBSERVED_ATTRIBUTES};
pub use document::{StrokeDocument, SvgRoot};
pub use draw::{Frame, StrokeDash, StrokeSurface};
pub use error::StrokeError;
pub use measure::{measure_paths, KnownLengths, PathMeasurer, PathRecord, PathTable};
pub use outputs::{Outputs, PlayerEvent};
pub use pause::{PauseKind, PauseMarker, PausePoint};
pub use player::{PlaybackState, Player};
pub use retry::{RetryBudget, RetryOutcome};
pub use scan::{DrawableTag, Tag};
pub use shape::{GeometryMeasurer, ShapeKind, DRAWABLE_SELECTOR};
pub use surface::MarkupSurface;

/// Result type for strokeplay operations
pub type Result<T> = core::result::Result<T, StrokeError>;

/// Load `text`, measure it from its own geometry and build a player.
///
/// Native counterpart of what the browser component does after layout.
pub fn load_player(
    text: &str,
    duration_ms: f64,
    engine: &EngineConfig,
) -> Result<(StrokeDocument, Player)> {
    let document = StrokeDocument::parse(text)?;
    let table = measure_paths(&mut document.geometry_measurer(engine.curve_accuracy))?;
    let points = document.pause_points(&table);
    let player = Player::new(table, points, duration_ms);
    Ok((document, player))
}
