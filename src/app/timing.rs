use glam::Vec3;
use std::time::{Duration, Instant};

const NOMINAL_FRAME: Duration = Duration::from_millis(16);
const STATUS_INTERVAL_SECS: f32 = 0.5;

/// Elapsed seconds forced into `[0, max]`; non-finite input counts as zero.
pub fn clamp_elapsed(seconds: f32, max: f32) -> f32 {
    if seconds.is_finite() {
        seconds.clamp(0.0, max)
    } else {
        0.0
    }
}

pub struct FrameTiming {
    last_frame_time: Option<Instant>,
    last_status_time: Option<Instant>,
    frame_count: u32,
    max_frame_dt: f32,
    pub frame_dt: f32,
}

impl FrameTiming {
    pub fn new(max_frame_dt: f32) -> Self {
        Self {
            last_frame_time: None,
            last_status_time: None,
            frame_count: 0,
            max_frame_dt,
            frame_dt: NOMINAL_FRAME.as_secs_f32(),
        }
    }

    /// Advance to `now` and return the clamped frame delta.
    pub fn update(&mut self, now: Instant) -> f32 {
        let dt_duration = match self.last_frame_time {
            Some(last) => now.saturating_duration_since(last),
            None => NOMINAL_FRAME,
        };
        self.last_frame_time = Some(now);
        self.frame_dt = clamp_elapsed(dt_duration.as_secs_f32(), self.max_frame_dt);
        self.frame_count = self.frame_count.saturating_add(1);
        self.frame_dt
    }

    /// `fps: N  pos: x y z`, at most every half second.
    pub fn status_line(&mut self, now: Instant, position: Vec3) -> Option<String> {
        let since = match self.last_status_time {
            Some(last) => now.saturating_duration_since(last),
            None => {
                self.last_status_time = Some(now);
                self.frame_count = 0;
                return None;
            }
        };
        let secs = since.as_secs_f32();
        if secs < STATUS_INTERVAL_SECS {
            return None;
        }
        let fps = self.frame_count as f32 / secs;
        self.frame_count = 0;
        self.last_status_time = Some(now);
        let pos = position.floor();
        Some(format!(
            "fps: {}  pos: {} {} {}",
            fps.floor() as i64,
            pos.x as i64,
            pos.y as i64,
            pos.z as i64
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::{clamp_elapsed, FrameTiming};
    use glam::Vec3;
    use std::time::{Duration, Instant};

    #[test]
    fn clamp_handles_bad_deltas() {
        assert_eq!(clamp_elapsed(-0.5, 0.1), 0.0);
        assert_eq!(clamp_elapsed(f32::NAN, 0.1), 0.0);
        assert_eq!(clamp_elapsed(3.0, 0.1), 0.1);
        assert_eq!(clamp_elapsed(0.02, 0.1), 0.02);
    }

    #[test]
    fn first_frame_uses_nominal_delta() {
        let mut timing = FrameTiming::new(0.1);
        let dt = timing.update(Instant::now());
        assert!((dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn long_stall_is_capped() {
        let mut timing = FrameTiming::new(0.1);
        let start = Instant::now();
        timing.update(start);
        let dt = timing.update(start + Duration::from_secs(5));
        assert_eq!(dt, 0.1);
    }

    #[test]
    fn clock_going_backwards_yields_zero() {
        let mut timing = FrameTiming::new(0.1);
        let start = Instant::now() + Duration::from_secs(1);
        timing.update(start);
        let dt = timing.update(start - Duration::from_millis(500));
        assert_eq!(dt, 0.0);
    }

    #[test]
    fn status_line_reports_fps_and_floored_position() {
        let mut timing = FrameTiming::new(0.1);
        let start = Instant::now();
        assert!(timing.status_line(start, Vec3::ZERO).is_none());
        for i in 1..=30 {
            timing.update(start + Duration::from_millis(i * 16));
        }
        let line = timing
            .status_line(start + Duration::from_millis(500), Vec3::new(1.7, -0.2, 19.9))
            .unwrap();
        assert_eq!(line, "fps: 60  pos: 1 -1 19");
        assert!(timing
            .status_line(start + Duration::from_millis(700), Vec3::ZERO)
            .is_none());
    }
}
