//! Output contracts from the player.
//!
//! Every player call returns the frame to display (if the draw state
//! changed) and the semantic events raised by the call. Adapters apply the
//! frame to their surface and use events to refresh controls.

use serde::{Deserialize, Serialize};

use crate::draw::Frame;
use crate::pause::PauseKind;

/// Discrete signals raised by transport actions and frame updates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PlayerEvent {
    PlaybackStarted {
        elapsed_ms: f64,
    },
    PlaybackPaused {
        elapsed_ms: f64,
    },
    PausePointReached {
        index: usize,
        kind: PauseKind,
        progress: f64,
    },
    /// A pause point was left, by its timer or by the viewer.
    PausePointPassed {
        index: usize,
    },
    PlaybackReset,
    PlaybackFinished,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub frame: Option<Frame>,
    #[serde(default)]
    pub events: Vec<PlayerEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.frame = None;
        self.events.clear();
    }

    #[inline]
    pub fn push_event(&mut self, event: PlayerEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn set_frame(&mut self, frame: Frame) {
        self.frame = Some(frame);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frame.is_none() && self.events.is_empty()
    }
}
