use std::time::Duration;

use iced::widget::image::Handle;

/// Delays shorter than this are treated as unset.
const MIN_FRAME_DELAY: Duration = Duration::from_millis(20);
const FALLBACK_FRAME_DELAY: Duration = Duration::from_millis(100);

/// Normalizes a GIF frame delay the way common players do.
pub fn effective_delay(delay: Duration) -> Duration {
    if delay < MIN_FRAME_DELAY {
        FALLBACK_FRAME_DELAY
    } else {
        delay
    }
}

#[derive(Debug, Clone)]
pub struct Frame {
    pub handle: Handle,
    pub delay: Duration,
}

/// A looping sequence of scaled frames.
#[derive(Debug)]
pub struct Animation {
    frames: Vec<Frame>,
    current: usize,
    running: bool,
}

impl Animation {
    pub fn new(frames: Vec<Frame>) -> Self {
        let running = !frames.is_empty();
        Self {
            frames,
            current: 0,
            running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    #[cfg(test)]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    #[cfg(test)]
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&Frame> {
        self.frames.get(self.current)
    }

    /// How long the current frame stays on screen.
    pub fn current_delay(&self) -> Option<Duration> {
        self.current().map(|frame| frame.delay)
    }

    pub fn advance(&mut self) {
        if !self.running || self.frames.is_empty() {
            return;
        }
        self.current = (self.current + 1) % self.frames.len();
    }

    /// Halts playback and drops every frame.
    pub fn stop(&mut self) {
        self.running = false;
        self.current = 0;
        self.frames = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(delays_ms: &[u64]) -> Vec<Frame> {
        delays_ms
            .iter()
            .map(|&ms| Frame {
                handle: Handle::from_rgba(1, 1, vec![0u8, 0, 0, 255]),
                delay: Duration::from_millis(ms),
            })
            .collect()
    }

    #[test]
    fn test_effective_delay() {
        assert_eq!(effective_delay(Duration::ZERO), FALLBACK_FRAME_DELAY);
        assert_eq!(effective_delay(Duration::from_millis(10)), FALLBACK_FRAME_DELAY);
        assert_eq!(
            effective_delay(Duration::from_millis(40)),
            Duration::from_millis(40)
        );
    }

    #[test]
    fn test_advance_wraps() {
        let mut animation = Animation::new(frames(&[50, 60, 70]));
        assert!(animation.is_running());
        assert_eq!(animation.current_delay(), Some(Duration::from_millis(50)));

        animation.advance();
        animation.advance();
        assert_eq!(animation.current_index(), 2);
        assert_eq!(animation.current_delay(), Some(Duration::from_millis(70)));

        animation.advance();
        assert_eq!(animation.current_index(), 0);
    }

    #[test]
    fn test_stop_releases_frames() {
        let mut animation = Animation::new(frames(&[50, 60]));
        animation.advance();
        animation.stop();

        assert!(!animation.is_running());
        assert_eq!(animation.frame_count(), 0);
        assert!(animation.current().is_none());

        animation.advance();
        assert_eq!(animation.current_index(), 0);
    }

    #[test]
    fn test_empty_animation_is_not_running() {
        let animation = Animation::new(Vec::new());
        assert!(!animation.is_running());
        assert_eq!(animation.current_delay(), None);
    }
}
