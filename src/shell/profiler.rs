// Frame profiler - lightweight frame-time telemetry overlay
//
// The profiler's I/O is hooked to the live presenter by the binding and
// unhooked before the presenter goes away; while unhooked it records
// nothing and draws nothing.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;

use crate::display::Presenter;

/// Number of frame samples kept for averaging.
const FRAME_HISTORY: usize = 120;

/// Frame-time telemetry drawn over the guest output.
pub struct FrameProfiler {
    io: Option<Rc<RefCell<Presenter>>>,
    visible: bool,
    paused: bool,
    frame_times_ms: VecDeque<f32>,
    last_frame: Option<Instant>,
}

impl FrameProfiler {
    pub fn new() -> Self {
        Self {
            io: None,
            visible: false,
            paused: false,
            frame_times_ms: VecDeque::with_capacity(FRAME_HISTORY),
            last_frame: None,
        }
    }

    /// Hook or unhook the presenter the profiler observes.
    pub fn set_user_io(&mut self, presenter: Option<Rc<RefCell<Presenter>>>) {
        if presenter.is_none() {
            self.last_frame = None;
        }
        self.io = presenter;
    }

    pub fn is_hooked(&self) -> bool {
        self.io.is_some()
    }

    pub fn toggle_display(&mut self) {
        self.visible = !self.visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Record the completion of one painted frame.
    pub fn record_frame(&mut self) {
        if self.io.is_none() || self.paused {
            return;
        }
        let now = Instant::now();
        if let Some(last) = self.last_frame {
            let elapsed_ms = now.duration_since(last).as_secs_f32() * 1000.0;
            if self.frame_times_ms.len() == FRAME_HISTORY {
                self.frame_times_ms.pop_front();
            }
            self.frame_times_ms.push_back(elapsed_ms);
        }
        self.last_frame = Some(now);
    }

    /// Mean frame time over the recorded window, in milliseconds.
    pub fn average_frame_time_ms(&self) -> Option<f32> {
        if self.frame_times_ms.is_empty() {
            return None;
        }
        Some(self.frame_times_ms.iter().sum::<f32>() / self.frame_times_ms.len() as f32)
    }

    /// Draw the overlay window when visible and hooked.
    pub fn show(&self, ctx: &egui::Context) {
        if !self.visible || self.io.is_none() {
            return;
        }
        egui::Window::new("Profiler")
            .resizable(false)
            .collapsible(false)
            .anchor(egui::Align2::RIGHT_TOP, [-20.0, 20.0])
            .show(ctx, |ui| {
                match self.average_frame_time_ms() {
                    Some(avg) if avg > 0.0 => {
                        ui.label(format!("Frame: {:.2} ms", avg));
                        ui.label(format!("FPS: {:.0}", 1000.0 / avg));
                    }
                    _ => {
                        ui.label("Collecting...");
                    }
                }
                if self.paused {
                    ui.colored_label(egui::Color32::YELLOW, "Paused");
                }
            });
    }
}

impl Default for FrameProfiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unhooked_profiler_records_nothing() {
        let mut profiler = FrameProfiler::new();
        profiler.record_frame();
        profiler.record_frame();
        assert_eq!(profiler.average_frame_time_ms(), None);
    }

    #[test]
    fn test_hooked_profiler_records_frames() {
        let mut profiler = FrameProfiler::new();
        profiler.set_user_io(Some(Rc::new(RefCell::new(Presenter::new()))));
        profiler.record_frame();
        profiler.record_frame();
        assert!(profiler.average_frame_time_ms().is_some());
    }

    #[test]
    fn test_pause_stops_recording() {
        let mut profiler = FrameProfiler::new();
        profiler.set_user_io(Some(Rc::new(RefCell::new(Presenter::new()))));
        profiler.toggle_pause();
        profiler.record_frame();
        profiler.record_frame();
        assert_eq!(profiler.average_frame_time_ms(), None);
    }

    #[test]
    fn test_toggles() {
        let mut profiler = FrameProfiler::new();
        assert!(!profiler.is_visible());
        profiler.toggle_display();
        assert!(profiler.is_visible());
        assert!(!profiler.is_paused());
        profiler.toggle_pause();
        assert!(profiler.is_paused());
    }

    #[test]
    fn test_unhook_resets_timing_anchor() {
        let mut profiler = FrameProfiler::new();
        profiler.set_user_io(Some(Rc::new(RefCell::new(Presenter::new()))));
        profiler.record_frame();
        profiler.set_user_io(None);
        assert!(!profiler.is_hooked());
        profiler.record_frame();
        assert_eq!(profiler.average_frame_time_ms(), None);
    }
}
