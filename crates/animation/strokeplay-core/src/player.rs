//! Playback state machine.
//!
//! The player owns no clock. Every call takes the current timestamp in
//! milliseconds (a requestAnimationFrame timestamp in the browser) and
//! returns the [`Outputs`] produced by that call.

use serde::{Deserialize, Serialize};

use crate::draw::Frame;
use crate::measure::PathTable;
use crate::outputs::{Outputs, PlayerEvent};
use crate::pause::{PauseKind, PausePoint};

/// Playback state of a player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing played yet, or rewound to the start
    Idle,
    /// Advancing with every frame
    Playing,
    /// Held until an explicit resume; `pause_point` is set when a manual
    /// pause point caused the hold
    PausedManual { pause_point: Option<usize> },
    /// Held at a timed pause point until `resume_at`
    PausedTimed { pause_point: usize, resume_at: f64 },
    /// Fully drawn
    Finished,
}

impl PlaybackState {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::PausedManual { .. } => "paused-manual",
            Self::PausedTimed { .. } => "paused-timed",
            Self::Finished => "finished",
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        matches!(self, Self::PausedManual { .. } | Self::PausedTimed { .. })
    }

    /// Whether the frame loop has to keep running.
    #[inline]
    pub fn needs_frames(&self) -> bool {
        matches!(self, Self::Playing | Self::PausedTimed { .. })
    }

    /// Pause point the player is currently held at.
    #[inline]
    pub fn held_at(&self) -> Option<usize> {
        match self {
            Self::PausedManual { pause_point } => *pause_point,
            Self::PausedTimed { pause_point, .. } => Some(*pause_point),
            _ => None,
        }
    }
}

/// Stroke animation player for one measured document.
#[derive(Debug, Clone)]
pub struct Player {
    table: PathTable,
    pause_points: Vec<PausePoint>,
    duration_ms: f64,
    state: PlaybackState,
    start_time: f64,
    elapsed_before_pause: f64,
    current_pause_index: usize,
    progress: f64,
    outputs: Outputs,
}

impl Player {
    pub fn new(table: PathTable, pause_points: Vec<PausePoint>, duration_ms: f64) -> Self {
        Self {
            table,
            pause_points,
            duration_ms,
            state: PlaybackState::Idle,
            start_time: 0.0,
            elapsed_before_pause: 0.0,
            current_pause_index: 0,
            progress: 0.0,
            outputs: Outputs::default(),
        }
    }

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        matches!(self.state, PlaybackState::Finished)
    }

    /// Progress of the last drawn frame.
    #[inline]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    #[inline]
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    #[inline]
    pub fn elapsed_before_pause(&self) -> f64 {
        self.elapsed_before_pause
    }

    #[inline]
    pub fn current_pause_index(&self) -> usize {
        self.current_pause_index
    }

    pub fn pause_points(&self) -> &[PausePoint] {
        &self.pause_points
    }

    pub fn table(&self) -> &PathTable {
        &self.table
    }

    /// Draw state matching the current progress.
    pub fn frame(&self) -> Frame {
        Frame::at(&self.table, self.progress, self.is_finished())
    }

    /// Start or resume playback. No-op while already playing.
    pub fn play(&mut self, now: f64) -> &Outputs {
        self.outputs.clear();
        self.start_playing(now);
        &self.outputs
    }

    /// Hold playback until the next `play`/`toggle`.
    pub fn pause(&mut self, now: f64) -> &Outputs {
        self.outputs.clear();
        self.hold(now);
        &self.outputs
    }

    /// Back to zero progress with every pause point pending again.
    pub fn reset(&mut self, now: f64) -> &Outputs {
        self.outputs.clear();
        self.record_elapsed(now);
        self.rewind();
        self.outputs.set_frame(self.frame());
        &self.outputs
    }

    /// Jump to the fully drawn, filled state.
    pub fn finish(&mut self, now: f64) -> &Outputs {
        self.outputs.clear();
        self.record_elapsed(now);
        self.complete();
        &self.outputs
    }

    /// Play/pause button: pauses while playing; otherwise resumes, stepping
    /// past the pause point it is held at, or restarts when finished.
    pub fn toggle(&mut self, now: f64) -> &Outputs {
        self.outputs.clear();
        match self.state {
            PlaybackState::Playing => self.hold(now),
            PlaybackState::Finished => {
                self.rewind();
                self.start_playing(now);
            }
            state => {
                if let Some(index) = state.held_at() {
                    self.pass_pause_point(index);
                }
                self.start_playing(now);
            }
        }
        &self.outputs
    }

    /// Advance to `now`. Called once per display frame.
    pub fn update(&mut self, now: f64) -> &Outputs {
        self.outputs.clear();

        if let PlaybackState::PausedTimed {
            pause_point,
            resume_at,
        } = self.state
        {
            if now < resume_at {
                return &self.outputs;
            }
            // Anchor at the scheduled resume time, not at the frame that noticed it.
            self.pass_pause_point(pause_point);
            self.state = PlaybackState::Playing;
            self.start_time = resume_at - self.elapsed_before_pause;
        }

        if !self.state.is_playing() {
            return &self.outputs;
        }

        let elapsed = now - self.start_time;
        if elapsed >= self.duration_ms {
            self.complete();
            return &self.outputs;
        }
        let progress = elapsed / self.duration_ms;

        let index = self.current_pause_index;
        if let Some(point) = self.pause_points.get(index).copied() {
            if progress >= point.progress {
                self.elapsed_before_pause = elapsed;
                self.state = match point.kind {
                    PauseKind::Timed => PlaybackState::PausedTimed {
                        pause_point: index,
                        resume_at: now + point.duration_ms,
                    },
                    PauseKind::Manual => PlaybackState::PausedManual {
                        pause_point: Some(index),
                    },
                };
                self.outputs.push_event(PlayerEvent::PausePointReached {
                    index,
                    kind: point.kind,
                    progress: point.progress,
                });
                return &self.outputs;
            }
        }

        // Transport times and frame timestamps come from different clocks.
        self.progress = progress.clamp(0.0, 1.0);
        self.outputs.set_frame(self.frame());
        &self.outputs
    }

    fn start_playing(&mut self, now: f64) {
        if self.state.is_playing() {
            return;
        }
        self.state = PlaybackState::Playing;
        self.start_time = now - self.elapsed_before_pause;
        self.outputs.push_event(PlayerEvent::PlaybackStarted {
            elapsed_ms: self.elapsed_before_pause,
        });
        self.outputs.set_frame(self.frame());
    }

    fn hold(&mut self, now: f64) {
        let held_at = match self.state {
            PlaybackState::Playing => {
                self.elapsed_before_pause = now - self.start_time;
                None
            }
            // Pausing during a timed hold cancels the automatic resume.
            PlaybackState::PausedTimed { pause_point, .. } => Some(pause_point),
            _ => return,
        };
        self.state = PlaybackState::PausedManual {
            pause_point: held_at,
        };
        self.outputs.push_event(PlayerEvent::PlaybackPaused {
            elapsed_ms: self.elapsed_before_pause,
        });
    }

    fn record_elapsed(&mut self, now: f64) {
        if self.state.is_playing() {
            self.elapsed_before_pause = now - self.start_time;
        }
    }

    fn pass_pause_point(&mut self, index: usize) {
        self.current_pause_index = index + 1;
        self.outputs
            .push_event(PlayerEvent::PausePointPassed { index });
    }

    fn rewind(&mut self) {
        self.state = PlaybackState::Idle;
        self.elapsed_before_pause = 0.0;
        self.current_pause_index = 0;
        self.progress = 0.0;
        self.outputs.push_event(PlayerEvent::PlaybackReset);
    }

    fn complete(&mut self) {
        self.state = PlaybackState::Finished;
        self.progress = 1.0;
        self.elapsed_before_pause = self.duration_ms;
        self.outputs.push_event(PlayerEvent::PlaybackFinished);
        self.outputs.set_frame(self.frame());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(points: Vec<PausePoint>) -> Player {
        let table = PathTable::from_lengths(vec![(0, 10.0), (1, 30.0), (2, 60.0)]);
        Player::new(table, points, 1000.0)
    }

    #[test]
    fn state_names() {
        assert_eq!(PlaybackState::Idle.name(), "idle");
        assert_eq!(
            PlaybackState::PausedTimed {
                pause_point: 0,
                resume_at: 1.0
            }
            .name(),
            "paused-timed"
        );
        assert!(PlaybackState::PausedTimed {
            pause_point: 0,
            resume_at: 1.0
        }
        .needs_frames());
        assert!(!PlaybackState::PausedManual { pause_point: None }.needs_frames());
    }

    #[test]
    fn plays_through_to_finish() {
        let mut p = player(vec![]);
        let out = p.play(100.0).clone();
        assert!(matches!(
            out.events[..],
            [PlayerEvent::PlaybackStarted { .. }]
        ));
        let out = p.update(600.0);
        let frame = out.frame.as_ref().unwrap();
        assert_eq!(frame.progress, 0.5);
        assert_eq!(frame.drawn_length(), 50.0);
        let out = p.update(1100.0);
        assert_eq!(out.events, vec![PlayerEvent::PlaybackFinished]);
        assert!(out.frame.as_ref().unwrap().finished);
        assert!(p.is_finished());
        assert!(!p.state().needs_frames());
    }

    #[test]
    fn pause_then_resume_keeps_elapsed() {
        let mut p = player(vec![]);
        p.play(0.0);
        p.update(250.0);
        p.pause(300.0);
        assert_eq!(p.elapsed_before_pause(), 300.0);
        // Frames while paused change nothing.
        assert!(p.update(5000.0).is_empty());
        p.play(10_000.0);
        let out = p.update(10_100.0);
        assert_eq!(out.frame.as_ref().unwrap().progress, 0.4);
    }

    #[test]
    fn frame_stamped_before_play_clamps_to_zero() {
        let mut p = player(vec![]);
        p.play(100.0);
        let out = p.update(90.0);
        assert_eq!(out.frame.as_ref().unwrap().progress, 0.0);
        assert_eq!(p.progress(), 0.0);
    }

    #[test]
    fn play_is_idempotent_while_playing() {
        let mut p = player(vec![]);
        p.play(0.0);
        assert!(p.play(500.0).is_empty());
        assert_eq!(p.update(500.0).frame.as_ref().unwrap().progress, 0.5);
    }

    #[test]
    fn toggle_restarts_after_finish() {
        let mut p = player(vec![]);
        p.finish(0.0);
        let out = p.toggle(50.0).clone();
        assert_eq!(out.events[0], PlayerEvent::PlaybackReset);
        assert!(p.is_playing());
        assert_eq!(p.update(150.0).frame.as_ref().unwrap().progress, 0.1);
    }

    #[test]
    fn pausing_during_timed_hold_cancels_auto_resume() {
        let timed = PausePoint {
            progress: 0.1,
            kind: PauseKind::Timed,
            duration_ms: 500.0,
        };
        let mut p = player(vec![timed]);
        p.play(0.0);
        p.update(200.0);
        assert!(matches!(p.state(), PlaybackState::PausedTimed { .. }));
        p.pause(300.0);
        assert_eq!(
            p.state(),
            PlaybackState::PausedManual {
                pause_point: Some(0)
            }
        );
        assert!(p.update(2000.0).is_empty());
        p.toggle(3000.0);
        assert_eq!(p.current_pause_index(), 1);
        assert!(p.is_playing());
    }

    #[test]
    fn user_pause_does_not_skip_pending_pause_point() {
        let manual = PausePoint {
            progress: 0.5,
            kind: PauseKind::Manual,
            duration_ms: 0.0,
        };
        let mut p = player(vec![manual]);
        p.play(0.0);
        p.update(100.0);
        p.toggle(200.0);
        p.toggle(300.0);
        assert_eq!(p.current_pause_index(), 0);
        p.update(900.0);
        assert_eq!(
            p.state(),
            PlaybackState::PausedManual {
                pause_point: Some(0)
            }
        );
    }
}
