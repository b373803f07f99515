use crate::runes::error::{ParseError, ParseErrorKind, RuneError, RuneResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub stroke_id: u32,
}

impl Point {
    pub const fn new(x: f32, y: f32, stroke_id: u32) -> Self {
        Self { x, y, stroke_id }
    }
}

impl From<(f32, f32)> for Point {
    fn from(value: (f32, f32)) -> Self {
        Self::new(value.0, value.1, 0)
    }
}

/// A drawn shape: points in drawing order, grouped by stroke.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Gesture {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub points: Vec<Point>,
}

impl Gesture {
    pub fn new(points: Vec<Point>) -> Self {
        Self { name: None, points }
    }

    pub fn named(name: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            name: Some(name.into()),
            points,
        }
    }

    pub fn from_xy(points: &[(f32, f32)]) -> Self {
        Self::new(points.iter().copied().map(Point::from).collect())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn stroke_count(&self) -> usize {
        let mut count = 0;
        let mut last = None;
        for point in &self.points {
            if last != Some(point.stroke_id) {
                count += 1;
                last = Some(point.stroke_id);
            }
        }
        count
    }

    /// Checks the point list is non-empty and stroke ids never go backwards.
    pub fn validate(&self) -> Result<(), ParseErrorKind> {
        if self.points.is_empty() {
            return Err(ParseErrorKind::EmptyPoints);
        }
        match self
            .points
            .windows(2)
            .position(|pair| pair[1].stroke_id < pair[0].stroke_id)
        {
            Some(index) => Err(ParseErrorKind::DecreasingStrokeId { index: index + 1 }),
            None => Ok(()),
        }
    }
}

/// Parses the compact text form `Name:x,y|x,y,stroke|...`.
///
/// The name prefix is optional and the stroke id defaults to 0.
pub fn parse_gesture(input: &str) -> Result<Gesture, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::new(ParseErrorKind::EmptyInput));
    }

    let (name, coords) = match trimmed.split_once(':') {
        Some((prefix, rest)) => {
            let name = prefix.trim();
            if name.is_empty() {
                return Err(ParseError::new(ParseErrorKind::EmptyName));
            }
            (Some(name.to_string()), rest)
        }
        None => (None, trimmed),
    };

    let gesture = Gesture {
        name,
        points: parse_points(coords)?,
    };
    gesture.validate().map_err(ParseError::new)?;
    Ok(gesture)
}

pub fn serialize_gesture(gesture: &Gesture) -> String {
    let mut output = String::new();
    if let Some(name) = &gesture.name {
        output.push_str(name);
        output.push(':');
    }
    for (idx, point) in gesture.points.iter().enumerate() {
        if idx > 0 {
            output.push('|');
        }
        if point.stroke_id == 0 {
            output.push_str(&format!("{},{}", point.x, point.y));
        } else {
            output.push_str(&format!("{},{},{}", point.x, point.y, point.stroke_id));
        }
    }
    output
}

fn parse_points(coords: &str) -> Result<Vec<Point>, ParseError> {
    let mut points = Vec::new();
    for (index, segment) in coords.split('|').enumerate() {
        let segment = segment.trim();
        if segment.is_empty() {
            return Err(ParseError::new(ParseErrorKind::EmptyPoint { index }));
        }
        let mut parts = segment.split(',').map(str::trim);
        let x_part = parts.next().filter(|part| !part.is_empty()).ok_or_else(|| {
            ParseError::new(ParseErrorKind::MissingCoordinate { index, coord: 0 })
        })?;
        let y_part = parts.next().filter(|part| !part.is_empty()).ok_or_else(|| {
            ParseError::new(ParseErrorKind::MissingCoordinate { index, coord: 1 })
        })?;
        let stroke_part = parts.next();
        if parts.next().is_some() {
            return Err(ParseError::new(ParseErrorKind::ExtraCoordinate { index }));
        }
        let x = parse_coordinate(x_part, index, 0)?;
        let y = parse_coordinate(y_part, index, 1)?;
        let stroke_id = match stroke_part {
            Some(part) => part.parse::<u32>().map_err(|_| {
                ParseError::new(ParseErrorKind::InvalidStrokeId {
                    index,
                    value: part.to_string(),
                })
            })?,
            None => 0,
        };
        points.push(Point::new(x, y, stroke_id));
    }

    if points.is_empty() {
        return Err(ParseError::new(ParseErrorKind::EmptyInput));
    }

    Ok(points)
}

fn parse_coordinate(value: &str, index: usize, coord: usize) -> Result<f32, ParseError> {
    match value.parse::<f32>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(ParseError::new(ParseErrorKind::InvalidNumber {
            index,
            coord,
            value: value.to_string(),
        })),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationPolicy {
    /// Orientation is part of the shape.
    #[default]
    None,
    /// Rotate about the centroid so the centroid-to-first-point angle is zero.
    IndicativeAngle,
}

pub const MIN_SAMPLE_COUNT: usize = 8;
pub const MAX_SAMPLE_COUNT: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeConfig {
    pub sample_count: usize,
    pub rotation: RotationPolicy,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            sample_count: 64,
            rotation: RotationPolicy::None,
        }
    }
}

/// Resamples, optionally rotates, scales into the unit box and centres a
/// point sequence. Returns exactly `config.sample_count` points.
pub fn normalize_points(points: &[Point], config: &NormalizeConfig) -> RuneResult<Vec<Point>> {
    if points.is_empty() {
        return Err(RuneError::InvalidArgument(
            "cannot normalize an empty point sequence".into(),
        ));
    }
    if !(MIN_SAMPLE_COUNT..=MAX_SAMPLE_COUNT).contains(&config.sample_count) {
        return Err(RuneError::InvalidArgument(format!(
            "sample count {} outside {MIN_SAMPLE_COUNT}..={MAX_SAMPLE_COUNT}",
            config.sample_count
        )));
    }

    let mut resampled = resample_points(points, config.sample_count);
    if config.rotation == RotationPolicy::IndicativeAngle {
        let angle = indicative_angle(&resampled);
        resampled = rotate_by(&resampled, -angle);
    }
    let scaled = scale_to_unit(&resampled);
    let c = centroid(&scaled);
    Ok(translate_by(&scaled, -c.0, -c.1))
}

/// Path length measured within strokes only.
pub fn path_length(points: &[Point]) -> f32 {
    points
        .windows(2)
        .filter(|pair| pair[0].stroke_id == pair[1].stroke_id)
        .map(|pair| distance(pair[0], pair[1]))
        .sum()
}

pub fn resample_points(points: &[Point], sample_count: usize) -> Vec<Point> {
    let mut resampled = Vec::with_capacity(sample_count);
    let Some(&first) = points.first() else {
        return resampled;
    };
    resampled.push(first);

    let total_length = path_length(points);
    if total_length <= f32::EPSILON || sample_count < 2 {
        resampled.resize(sample_count, first);
        return resampled;
    }

    let spacing = total_length / (sample_count as f32 - 1.0);
    let mut accumulated = 0.0;
    let mut segment_start = first;

    for &point in &points[1..] {
        if point.stroke_id != segment_start.stroke_id {
            segment_start = point;
            continue;
        }
        let mut segment_length = distance(segment_start, point);
        while accumulated + segment_length >= spacing && resampled.len() < sample_count {
            let t = ((spacing - accumulated) / segment_length).clamp(0.0, 1.0);
            let new_point = Point::new(
                segment_start.x + (point.x - segment_start.x) * t,
                segment_start.y + (point.y - segment_start.y) * t,
                point.stroke_id,
            );
            resampled.push(new_point);
            segment_start = new_point;
            segment_length = distance(segment_start, point);
            accumulated = 0.0;
        }
        accumulated += segment_length;
        segment_start = point;
    }

    // float rounding can leave the tail one point short
    let last = points[points.len() - 1];
    resampled.resize(sample_count, last);
    resampled
}

pub fn centroid(points: &[Point]) -> (f32, f32) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let (sum_x, sum_y) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let n = points.len() as f32;
    (sum_x / n, sum_y / n)
}

pub fn indicative_angle(points: &[Point]) -> f32 {
    let (cx, cy) = centroid(points);
    match points.first() {
        Some(first) => (first.y - cy).atan2(first.x - cx),
        None => 0.0,
    }
}

pub fn rotate_by(points: &[Point], radians: f32) -> Vec<Point> {
    let (cx, cy) = centroid(points);
    let (sin, cos) = radians.sin_cos();
    points
        .iter()
        .map(|p| {
            let dx = p.x - cx;
            let dy = p.y - cy;
            Point::new(dx * cos - dy * sin + cx, dx * sin + dy * cos + cy, p.stroke_id)
        })
        .collect()
}

/// Uniform scale by the larger bounding-box side. Shape proportions are kept.
pub fn scale_to_unit(points: &[Point]) -> Vec<Point> {
    let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
    let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let size = (max_x - min_x).max(max_y - min_y);
    let scale = if size > f32::EPSILON { size } else { 1.0 };
    points
        .iter()
        .map(|p| Point::new((p.x - min_x) / scale, (p.y - min_y) / scale, p.stroke_id))
        .collect()
}

pub fn translate_by(points: &[Point], dx: f32, dy: f32) -> Vec<Point> {
    points
        .iter()
        .map(|p| Point::new(p.x + dx, p.y + dy, p.stroke_id))
        .collect()
}

pub fn distance(a: Point, b: Point) -> f32 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}
