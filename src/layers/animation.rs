use crate::core::geo::Point;
use instant::{Duration, Instant};

/// Cubic ease-out over normalized time, clamped to `[0, 1]`
fn ease_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) - 1.0;
    t * t * t + 1.0
}

/// Eased move of the map offset from one point to another
#[derive(Debug, Clone)]
pub struct CenteringAnimation {
    from: Point,
    to: Point,
    start: Instant,
    duration: Duration,
}

impl CenteringAnimation {
    pub fn new(from: Point, to: Point, start: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            start,
            duration,
        }
    }

    pub fn target(&self) -> Point {
        self.to
    }

    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        if now <= self.start {
            return 0.0;
        }
        let elapsed = now.duration_since(self.start);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Offset at `now`; exactly `to` once the duration has elapsed
    pub fn sample(&self, now: Instant) -> Point {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return self.to;
        }
        let t = ease_out(progress);
        Point::new(
            self.from.x + (self.to.x - self.from.x) * t,
            self.from.y + (self.to.y - self.from.y) * t,
        )
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}

/// Identifies one started animation; stale after a newer one starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationHandle(u64);

/// Holds at most one running centering animation.
///
/// Starting a new animation cancels the running one (last writer wins, no
/// queuing).
#[derive(Debug, Default)]
pub struct AnimationSlot {
    current: Option<(AnimationHandle, CenteringAnimation)>,
    generation: u64,
}

impl AnimationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, animation: CenteringAnimation) -> AnimationHandle {
        if let Some((handle, _)) = self.current.take() {
            log::debug!("cancelling centering animation {:?}", handle);
        }
        self.generation += 1;
        let handle = AnimationHandle(self.generation);
        self.current = Some((handle, animation));
        handle
    }

    /// Cancels the running animation if `handle` still refers to it
    pub fn cancel(&mut self, handle: AnimationHandle) -> bool {
        match &self.current {
            Some((current, _)) if *current == handle => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel_any(&mut self) {
        self.current = None;
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_handle(&self) -> Option<AnimationHandle> {
        self.current.as_ref().map(|(handle, _)| *handle)
    }

    /// Advances to `now`, returning the offset to apply this frame. The slot
    /// empties itself after yielding the final position.
    pub fn tick(&mut self, now: Instant) -> Option<Point> {
        let (_, animation) = self.current.as_ref()?;
        let position = animation.sample(now);
        if animation.is_finished(now) {
            self.current = None;
        }
        Some(position)
    }
}
