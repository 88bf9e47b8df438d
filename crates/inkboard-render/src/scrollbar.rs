//! Scrollbar auto-hide.

/// Fades the scrollbars out over a fixed number of frames after a scroll.
#[derive(Debug, Clone)]
pub struct ScrollbarFade {
    frames: u32,
    remaining: u32,
}

impl ScrollbarFade {
    pub fn new(frames: u32) -> Self {
        Self {
            frames: frames.max(1),
            remaining: 0,
        }
    }

    /// Show the scrollbars at full opacity.
    pub fn show(&mut self) {
        self.remaining = self.frames;
    }

    pub fn opacity(&self) -> f64 {
        f64::from(self.remaining) / f64::from(self.frames)
    }

    pub fn is_visible(&self) -> bool {
        self.remaining > 0
    }

    /// Opacity for the current frame, then move the fade one frame on.
    pub fn advance(&mut self) -> f64 {
        let opacity = self.opacity();
        self.remaining = self.remaining.saturating_sub(1);
        opacity
    }
}

impl Default for ScrollbarFade {
    fn default() -> Self {
        Self::new(30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_runs_down_to_zero() {
        let mut fade = ScrollbarFade::new(4);
        assert!(!fade.is_visible());
        assert_eq!(fade.advance(), 0.0);

        fade.show();
        let steps: Vec<f64> = (0..6).map(|_| fade.advance()).collect();
        assert_eq!(steps, vec![1.0, 0.75, 0.5, 0.25, 0.0, 0.0]);
    }

    #[test]
    fn test_show_restarts_fade() {
        let mut fade = ScrollbarFade::new(2);
        fade.show();
        fade.advance();
        fade.show();
        assert_eq!(fade.opacity(), 1.0);
    }

    #[test]
    fn test_zero_frames_is_clamped() {
        let mut fade = ScrollbarFade::new(0);
        fade.show();
        assert_eq!(fade.advance(), 1.0);
        assert!(!fade.is_visible());
    }
}
