// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Frame state tracking.

The UI library expects exactly one frame to be "current" at a time.  [FrameState] is a two state
machine with a single transition function, [FrameState::next], so that every sequence of
update/render calls is handled in one place:

| state       | event    | next        | action                  |
|-------------|----------|-------------|-------------------------|
| `Idle`      | `Update` | `FrameOpen` | `OpenFrame`             |
| `FrameOpen` | `Update` | `FrameOpen` | `FinalizeAndOpen`       |
| `FrameOpen` | `Render` | `Idle`      | `FinalizeAndDraw`       |
| `Idle`      | `Render` | `Idle`      | `Nothing`               |
*/
use crate::ui::DisplayMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameState {
    #[default]
    Idle,
    FrameOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameEvent {
    Update,
    Render,
}

/// What the caller must do with the UI library for a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameAction {
    OpenFrame,
    /// Finalize the abandoned frame, then open a new one.
    FinalizeAndOpen,
    /// Finalize the frame and draw its output.
    FinalizeAndDraw,
    Nothing,
}

impl FrameState {
    pub const fn next(self, event: FrameEvent) -> (FrameState, FrameAction) {
        match (self, event) {
            (FrameState::Idle, FrameEvent::Update) => (FrameState::FrameOpen, FrameAction::OpenFrame),
            (FrameState::FrameOpen, FrameEvent::Update) => {
                (FrameState::FrameOpen, FrameAction::FinalizeAndOpen)
            }
            (FrameState::FrameOpen, FrameEvent::Render) => {
                (FrameState::Idle, FrameAction::FinalizeAndDraw)
            }
            (FrameState::Idle, FrameEvent::Render) => (FrameState::Idle, FrameAction::Nothing),
        }
    }
}

/// Used when the host reports a delta the UI library would reject.
pub const FALLBACK_DELTA_SECONDS: f32 = 1.0 / 60.0;

/// Frame state plus the surface metrics pushed into the UI library each update.
#[derive(Debug, Clone)]
pub(crate) struct FrameController {
    state: FrameState,
    physical_size: [u32; 2],
    scale_factor: f32,
}

impl FrameController {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            state: FrameState::Idle,
            physical_size: [width, height],
            scale_factor: 1.0,
        }
    }

    pub(crate) fn state(&self) -> FrameState {
        self.state
    }

    /// Applies `event` and returns the action the caller must carry out.
    pub(crate) fn transition(&mut self, event: FrameEvent) -> FrameAction {
        let (next, action) = self.state.next(event);
        self.state = next;
        action
    }

    /// Drops back to `Idle` after a frame failed to open.
    pub(crate) fn abandon(&mut self) {
        self.state = FrameState::Idle;
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        self.physical_size = [width, height];
    }

    pub(crate) fn set_scale_factor(&mut self, scale_factor: f32) {
        if scale_factor.is_finite() && scale_factor > 0.0 {
            self.scale_factor = scale_factor;
        } else {
            logwise::warn_sync!(
                "Ignoring invalid scale factor {scale}",
                scale = logwise::privacy::LogIt(&scale_factor)
            );
        }
    }

    pub(crate) fn metrics(&self, delta_seconds: f32) -> DisplayMetrics {
        let delta_seconds = if delta_seconds.is_finite() && delta_seconds > 0.0 {
            delta_seconds
        } else {
            logwise::warn_sync!(
                "Replacing invalid delta time {delta}",
                delta = logwise::privacy::LogIt(&delta_seconds)
            );
            FALLBACK_DELTA_SECONDS
        };
        DisplayMetrics {
            display_size: [
                self.physical_size[0] as f32 / self.scale_factor,
                self.physical_size[1] as f32 / self.scale_factor,
            ],
            framebuffer_scale: [self.scale_factor, self.scale_factor],
            delta_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table() {
        use FrameAction::*;
        use FrameEvent::*;
        use FrameState::*;
        assert_eq!(Idle.next(Update), (FrameOpen, OpenFrame));
        assert_eq!(FrameOpen.next(Update), (FrameOpen, FinalizeAndOpen));
        assert_eq!(FrameOpen.next(Render), (Idle, FinalizeAndDraw));
        assert_eq!(Idle.next(Render), (Idle, Nothing));
    }

    #[test]
    fn double_render_draws_once() {
        let mut controller = FrameController::new(10, 10);
        assert_eq!(controller.transition(FrameEvent::Update), FrameAction::OpenFrame);
        assert_eq!(controller.transition(FrameEvent::Render), FrameAction::FinalizeAndDraw);
        assert_eq!(controller.transition(FrameEvent::Render), FrameAction::Nothing);
        assert_eq!(controller.state(), FrameState::Idle);
    }

    #[test]
    fn metrics_use_logical_size() {
        let mut controller = FrameController::new(1600, 1200);
        controller.set_scale_factor(2.0);
        let m = controller.metrics(0.5);
        assert_eq!(m.display_size, [800.0, 600.0]);
        assert_eq!(m.framebuffer_scale, [2.0, 2.0]);
        assert_eq!(m.delta_seconds, 0.5);
    }

    #[test]
    fn invalid_inputs_fall_back() {
        let mut controller = FrameController::new(100, 100);
        controller.set_scale_factor(0.0);
        controller.set_scale_factor(f32::NAN);
        let m = controller.metrics(0.0);
        assert_eq!(m.framebuffer_scale, [1.0, 1.0]);
        assert_eq!(m.delta_seconds, FALLBACK_DELTA_SECONDS);
        assert_eq!(controller.metrics(-1.0).delta_seconds, FALLBACK_DELTA_SECONDS);
    }
}
