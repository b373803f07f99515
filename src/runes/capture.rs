use crate::runes::engine::{distance, Gesture, Point};
use crate::runes::error::{RuneError, RuneResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// Every new stroke replaces the previous candidate.
    #[default]
    SingleStroke,
    /// Strokes accumulate into one candidate until it is taken or cleared.
    MultiStroke,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up { x: f32, y: f32 },
}

impl PointerEvent {
    pub fn position(&self) -> (f32, f32) {
        match *self {
            PointerEvent::Down { x, y } | PointerEvent::Move { x, y } | PointerEvent::Up { x, y } => {
                (x, y)
            }
        }
    }

    pub fn scaled(self, factor: f32) -> Self {
        match self {
            PointerEvent::Down { x, y } => PointerEvent::Down { x: x * factor, y: y * factor },
            PointerEvent::Move { x, y } => PointerEvent::Move { x: x * factor, y: y * factor },
            PointerEvent::Up { x, y } => PointerEvent::Up { x: x * factor, y: y * factor },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    pub mode: CaptureMode,
    pub max_points: usize,
    pub min_point_distance: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            mode: CaptureMode::SingleStroke,
            max_points: 256,
            min_point_distance: 0.1,
        }
    }
}

/// Collects pointer samples into a candidate gesture.
///
/// Recording outside an open stroke is an error rather than a no-op so that
/// input wiring mistakes surface immediately.
#[derive(Debug, Clone, Default)]
pub struct StrokeCapture {
    config: CaptureConfig,
    points: Vec<Point>,
    next_stroke_id: u32,
    open_stroke: Option<u32>,
    stroke_points: usize,
}

impl StrokeCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn begin_stroke(&mut self) -> RuneResult<u32> {
        if self.open_stroke.is_some() {
            return Err(RuneError::InvalidState(
                "begin_stroke called while a stroke is open".into(),
            ));
        }
        if self.config.mode == CaptureMode::SingleStroke {
            self.clear();
        }
        let id = self.next_stroke_id;
        self.next_stroke_id += 1;
        self.open_stroke = Some(id);
        self.stroke_points = 0;
        Ok(id)
    }

    /// Returns `Ok(false)` when the sample is filtered out.
    pub fn record_point(&mut self, x: f32, y: f32) -> RuneResult<bool> {
        let Some(stroke_id) = self.open_stroke else {
            return Err(RuneError::InvalidState(
                "record_point called without an open stroke".into(),
            ));
        };
        if !x.is_finite() || !y.is_finite() {
            return Err(RuneError::InvalidArgument(format!(
                "non-finite pointer position ({x}, {y})"
            )));
        }
        if self.points.len() >= self.config.max_points {
            return Ok(false);
        }
        let point = Point::new(x, y, stroke_id);
        if self.stroke_points > 0 {
            if let Some(&last) = self.points.last() {
                if distance(last, point) < self.config.min_point_distance {
                    return Ok(false);
                }
            }
        }
        self.points.push(point);
        self.stroke_points += 1;
        Ok(true)
    }

    pub fn end_stroke(&mut self) -> RuneResult<usize> {
        if self.open_stroke.take().is_none() {
            return Err(RuneError::InvalidState(
                "end_stroke called without an open stroke".into(),
            ));
        }
        Ok(std::mem::take(&mut self.stroke_points))
    }

    /// Feeds one pointer event. Returns the finished stroke's point count on `Up`.
    pub fn handle(&mut self, event: PointerEvent) -> RuneResult<Option<usize>> {
        match event {
            PointerEvent::Down { x, y } => {
                if self.open_stroke.is_some() {
                    // a lost Up; close the dangling stroke first
                    tracing::debug!("pointer down with open stroke; closing it");
                    self.end_stroke()?;
                }
                self.begin_stroke()?;
                self.record_point(x, y)?;
                Ok(None)
            }
            PointerEvent::Move { x, y } => {
                if self.open_stroke.is_some() {
                    self.record_point(x, y)?;
                }
                Ok(None)
            }
            PointerEvent::Up { x, y } => {
                if self.open_stroke.is_none() {
                    return Ok(None);
                }
                self.record_point(x, y)?;
                self.end_stroke().map(Some)
            }
        }
    }

    pub fn is_stroke_open(&self) -> bool {
        self.open_stroke.is_some()
    }

    /// Number of strokes begun since the last clear.
    pub fn stroke_count(&self) -> u32 {
        self.next_stroke_id
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn gesture(&self) -> Gesture {
        Gesture::new(self.points.clone())
    }

    /// Hands the captured candidate over and resets the capture.
    pub fn take_gesture(&mut self) -> RuneResult<Gesture> {
        if self.points.is_empty() {
            return Err(RuneError::InvalidArgument("no points captured".into()));
        }
        let gesture = Gesture::new(std::mem::take(&mut self.points));
        self.clear();
        Ok(gesture)
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.next_stroke_id = 0;
        self.open_stroke = None;
        self.stroke_points = 0;
    }
}
