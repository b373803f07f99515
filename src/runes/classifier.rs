//! Point-cloud rune classification.
//!
//! Candidates and templates are resampled, normalised into the unit box and
//! compared as unordered clouds: every point of one cloud is greedily paired
//! with the nearest unmatched point of the other, earlier pairings weighing
//! more. The search is repeated from several start points and in both
//! directions and the smallest weighted mean distance is kept.

use crate::runes::db::TemplateSet;
use crate::runes::engine::{distance, normalize_points, Gesture, NormalizeConfig, Point};
use crate::runes::error::{RuneError, RuneResult};

/// Mean point distance that maps to a score of zero (the unit box side).
pub const MAX_MEAN_DISTANCE: f32 = 1.0;
const START_STEP_EXPONENT: f32 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub class_name: String,
    pub score: f32,
}

impl ClassificationResult {
    pub fn is_recognized(&self, threshold: f32) -> bool {
        self.score >= threshold
    }
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: NormalizeConfig,
}

impl Classifier {
    pub fn new(config: NormalizeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizeConfig {
        &self.config
    }

    /// Normalises every template once so repeated classifications against
    /// the same set skip that work. Templates that cannot be normalised are
    /// left out with a warning.
    pub fn prepare(&self, templates: &TemplateSet) -> PreparedTemplates {
        let mut prepared = PreparedTemplates {
            config: self.config,
            clouds: Vec::with_capacity(templates.len()),
        };
        for template in templates.iter() {
            prepared.push(&template.name, &template.gesture);
        }
        prepared
    }

    /// Returns the best matching template class and its score.
    ///
    /// Templates are visited in insertion order and only a strictly better
    /// distance replaces the current best, so the first-seen template wins
    /// ties. A low score is still a successful result.
    pub fn classify(
        &self,
        candidate: &Gesture,
        templates: &TemplateSet,
    ) -> RuneResult<ClassificationResult> {
        if templates.is_empty() {
            return Err(RuneError::InvalidArgument("template set is empty".into()));
        }
        self.classify_prepared(candidate, &self.prepare(templates))
    }

    /// Like [`Classifier::classify`] against clouds from [`Classifier::prepare`].
    pub fn classify_prepared(
        &self,
        candidate: &Gesture,
        templates: &PreparedTemplates,
    ) -> RuneResult<ClassificationResult> {
        if candidate.is_empty() {
            return Err(RuneError::InvalidArgument(
                "candidate gesture has no points".into(),
            ));
        }
        if templates.config != self.config {
            return Err(RuneError::InvalidArgument(
                "templates were prepared with a different normalize config".into(),
            ));
        }
        candidate
            .validate()
            .map_err(|kind| RuneError::InvalidArgument(format!("candidate gesture: {kind:?}")))?;

        let candidate_cloud = normalize_points(&candidate.points, &self.config)?;

        let mut best: Option<(&str, f32)> = None;
        for (name, cloud) in &templates.clouds {
            let dist = greedy_cloud_match(&candidate_cloud, cloud);
            tracing::trace!(class = %name, dist, "template distance");
            if best.map_or(true, |(_, best_dist)| dist < best_dist) {
                best = Some((name.as_str(), dist));
            }
        }

        let (class_name, dist) = best.ok_or_else(|| {
            RuneError::InvalidArgument("template set has no usable templates".into())
        })?;
        let result = ClassificationResult {
            class_name: class_name.to_string(),
            score: distance_to_score(dist),
        };
        tracing::debug!(class = %result.class_name, score = result.score, "classified rune");
        Ok(result)
    }
}

/// Template clouds normalised for one [`NormalizeConfig`], in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedTemplates {
    config: NormalizeConfig,
    clouds: Vec<(String, Vec<Point>)>,
}

impl PreparedTemplates {
    pub fn config(&self) -> &NormalizeConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.clouds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clouds.is_empty()
    }

    /// Normalises and appends one template. Returns `false` if it was unusable.
    pub fn push(&mut self, name: &str, gesture: &Gesture) -> bool {
        match normalize_points(&gesture.points, &self.config) {
            Ok(cloud) => {
                self.clouds.push((name.to_string(), cloud));
                true
            }
            Err(err) => {
                tracing::warn!(class = %name, %err, "skipping unusable template");
                false
            }
        }
    }
}

/// Classifies with the default resampling and rotation settings.
pub fn classify(candidate: &Gesture, templates: &TemplateSet) -> RuneResult<ClassificationResult> {
    Classifier::default().classify(candidate, templates)
}

pub fn distance_to_score(mean_distance: f32) -> f32 {
    (1.0 - mean_distance / MAX_MEAN_DISTANCE).clamp(0.0, 1.0)
}

/// Weighted mean distance between two equally sized normalised clouds.
pub fn greedy_cloud_match(a: &[Point], b: &[Point]) -> f32 {
    let n = a.len().min(b.len());
    if n == 0 {
        return f32::INFINITY;
    }
    let step = ((n as f32).powf(START_STEP_EXPONENT).floor() as usize).max(1);
    let weight_sum = (n as f32 + 1.0) / 2.0;

    let mut min = f32::INFINITY;
    for start in (0..n).step_by(step) {
        let d1 = cloud_distance(&a[..n], &b[..n], start);
        let d2 = cloud_distance(&b[..n], &a[..n], start);
        min = min.min(d1).min(d2);
    }
    min / weight_sum
}

fn cloud_distance(from: &[Point], to: &[Point], start: usize) -> f32 {
    let n = from.len();
    let mut matched = vec![false; n];
    let mut sum = 0.0;
    let mut i = start;
    loop {
        let mut best = f32::INFINITY;
        let mut best_idx = None;
        for (j, point) in to.iter().enumerate() {
            if matched[j] {
                continue;
            }
            let d = distance(from[i], *point);
            if d < best {
                best = d;
                best_idx = Some(j);
            }
        }
        if let Some(j) = best_idx {
            matched[j] = true;
        }
        let weight = 1.0 - ((i + n - start) % n) as f32 / n as f32;
        sum += weight * best;
        i = (i + 1) % n;
        if i == start {
            break;
        }
    }
    sum
}
