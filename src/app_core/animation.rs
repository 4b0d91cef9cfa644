//! Fade-in controller for the sheet container.

use std::time::{Duration, Instant};

/// Linear opacity ramp from 0 to 1 over `duration`, started on mount.
#[derive(Debug, Clone)]
pub struct FadeController {
    started: Option<Instant>,
    duration: Duration,
}

impl FadeController {
    pub fn start(duration: Duration, now: Instant) -> Self {
        Self {
            started: Some(now),
            duration,
        }
    }

    pub fn opacity(&self, now: Instant) -> f32 {
        let Some(started) = self.started else {
            return 1.0;
        };
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn is_complete(&self, now: Instant) -> bool {
        self.opacity(now) >= 1.0
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Stops the ramp; a stopped controller reports full opacity.
    pub fn stop(&mut self) {
        self.started = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opacity_ramps_linearly() {
        let t0 = Instant::now();
        let fade = FadeController::start(Duration::from_millis(300), t0);
        assert_eq!(fade.opacity(t0), 0.0);
        let mid = fade.opacity(t0 + Duration::from_millis(150));
        assert!((mid - 0.5).abs() < 0.01);
        assert_eq!(fade.opacity(t0 + Duration::from_millis(900)), 1.0);
        assert!(fade.is_complete(t0 + Duration::from_millis(300)));
    }

    #[test]
    fn test_zero_duration_is_complete_immediately() {
        let t0 = Instant::now();
        let fade = FadeController::start(Duration::ZERO, t0);
        assert!(fade.is_complete(t0));
    }

    #[test]
    fn test_stopped_controller_is_opaque() {
        let t0 = Instant::now();
        let mut fade = FadeController::start(Duration::from_secs(5), t0);
        fade.stop();
        assert!(!fade.is_running());
        assert_eq!(fade.opacity(t0), 1.0);
    }
}
