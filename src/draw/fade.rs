use crate::draw::canvas::Color;

pub const DEFAULT_FADE_SPEED: f32 = 0.3;

/// Recognised-rune label that fades in from transparent to white.
///
/// Driven by `tick` with the elapsed seconds; `progress` goes from 0 to 1 at
/// `speed` units per second.
#[derive(Debug, Clone, PartialEq)]
pub struct NameFade {
    text: String,
    progress: f32,
    speed: f32,
    active: bool,
}

impl Default for NameFade {
    fn default() -> Self {
        Self::new(DEFAULT_FADE_SPEED)
    }
}

impl NameFade {
    pub fn new(speed: f32) -> Self {
        Self {
            text: String::new(),
            progress: 0.0,
            speed: speed.max(0.0),
            active: false,
        }
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.progress = 0.0;
        self.active = true;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.progress = 0.0;
        self.active = false;
    }

    pub fn tick(&mut self, dt_secs: f32) {
        if !self.active {
            return;
        }
        self.progress = (self.progress + dt_secs.max(0.0) * self.speed).min(1.0);
        if self.progress >= 1.0 {
            self.active = false;
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_animating(&self) -> bool {
        self.active
    }

    pub fn color(&self) -> Color {
        let alpha = (self.progress.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color::rgba(255, 255, 255, alpha)
    }
}
