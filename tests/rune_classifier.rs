use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use runecaster::runes::classifier::{classify, Classifier, PreparedTemplates};
use runecaster::runes::db::TemplateSet;
use runecaster::runes::engine::{Gesture, NormalizeConfig, Point, RotationPolicy};

const THRESHOLD: f32 = 0.8;

fn line_and_circle() -> TemplateSet {
    let mut set = TemplateSet::new();
    set.push("Line", Gesture::from_xy(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]));
    set.push(
        "Circle",
        Gesture::from_xy(&[(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)]),
    );
    set
}

fn triangle() -> Gesture {
    Gesture::from_xy(&[(0.0, 0.0), (4.0, 0.0), (2.0, 3.0), (0.0, 0.0)])
}

fn ring(points: usize, radius: f32) -> Gesture {
    Gesture::from_xy(
        &(0..=points)
            .map(|i| {
                let a = i as f32 / points as f32 * std::f32::consts::TAU;
                (radius * a.cos(), radius * a.sin())
            })
            .collect::<Vec<_>>(),
    )
}

fn transform(gesture: &Gesture, scale: f32, angle: f32, dx: f32, dy: f32) -> Gesture {
    let (sin, cos) = angle.sin_cos();
    Gesture::new(
        gesture
            .points
            .iter()
            .map(|p| {
                let x = p.x * scale;
                let y = p.y * scale;
                Point::new(x * cos - y * sin + dx, x * sin + y * cos + dy, p.stroke_id)
            })
            .collect(),
    )
}

#[test]
fn identical_candidate_scores_one() {
    let mut set = line_and_circle();
    set.push("Triangle", triangle());
    let result = classify(&triangle(), &set).unwrap();
    assert_eq!(result.class_name, "Triangle");
    assert!((result.score - 1.0).abs() < 1e-4, "score {}", result.score);
}

#[test]
fn scaled_and_translated_copy_is_recognized() {
    let mut set = line_and_circle();
    set.push("Triangle", triangle());
    let candidate = transform(&triangle(), 37.5, 0.0, 250.0, -80.0);
    let result = classify(&candidate, &set).unwrap();
    assert_eq!(result.class_name, "Triangle");
    assert!(result.score >= THRESHOLD, "score {}", result.score);
}

#[test]
fn rotated_copy_is_recognized_with_indicative_angle() {
    let mut set = line_and_circle();
    set.push("Triangle", triangle());
    let classifier = Classifier::new(NormalizeConfig {
        rotation: RotationPolicy::IndicativeAngle,
        ..NormalizeConfig::default()
    });
    let candidate = transform(&triangle(), 2.0, 1.1, 10.0, 10.0);
    let result = classifier.classify(&candidate, &set).unwrap();
    assert_eq!(result.class_name, "Triangle");
    assert!(result.score >= THRESHOLD, "score {}", result.score);
}

#[test]
fn empty_template_set_is_invalid_argument() {
    let err = classify(&triangle(), &TemplateSet::new()).unwrap_err();
    assert!(err.is_invalid_argument(), "{err}");
}

#[test]
fn empty_candidate_is_invalid_argument() {
    let err = classify(&Gesture::default(), &line_and_circle()).unwrap_err();
    assert!(err.is_invalid_argument(), "{err}");
}

#[test]
fn decreasing_stroke_ids_are_invalid_argument() {
    let candidate = Gesture::new(vec![Point::new(0.0, 0.0, 1), Point::new(1.0, 0.0, 0)]);
    let err = classify(&candidate, &line_and_circle()).unwrap_err();
    assert!(err.is_invalid_argument(), "{err}");
}

#[test]
fn classification_is_deterministic() {
    let set = line_and_circle();
    let candidate = Gesture::from_xy(&[(0.0, 0.0), (0.3, 0.7), (1.2, 0.4), (0.5, -0.2)]);
    let first = classify(&candidate, &set).unwrap();
    let second = classify(&candidate, &set).unwrap();
    assert_eq!(first, second);
}

#[test]
fn near_straight_stroke_matches_line() {
    let candidate = Gesture::from_xy(&[
        (0.0, 0.0),
        (0.5, 0.01),
        (1.0, -0.01),
        (1.5, 0.0),
        (2.0, 0.02),
    ]);
    let result = classify(&candidate, &line_and_circle()).unwrap();
    assert_eq!(result.class_name, "Line");
    assert!(result.score >= 0.9, "score {}", result.score);
}

#[test]
fn first_inserted_template_wins_ties() {
    let points = [(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)];
    let mut set = TemplateSet::new();
    set.push("Alpha", Gesture::from_xy(&points));
    set.push("Beta", Gesture::from_xy(&points));
    let result = classify(&Gesture::from_xy(&points), &set).unwrap();
    assert_eq!(result.class_name, "Alpha");

    let mut reversed = TemplateSet::new();
    reversed.push("Beta", Gesture::from_xy(&points));
    reversed.push("Alpha", Gesture::from_xy(&points));
    let result = classify(&Gesture::from_xy(&points), &reversed).unwrap();
    assert_eq!(result.class_name, "Beta");
}

#[test]
fn best_of_several_templates_per_class() {
    let mut set = TemplateSet::new();
    set.push("Circle", Gesture::from_xy(&[(0.0, 0.0), (1.0, 0.0)]));
    set.push("Triangle", triangle());
    set.push("Circle", ring(24, 1.0));
    let result = classify(&ring(40, 5.0), &set).unwrap();
    assert_eq!(result.class_name, "Circle");
    assert!(result.score >= THRESHOLD, "score {}", result.score);
}

#[test]
fn jittered_ring_is_still_a_circle() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut set = TemplateSet::new();
    set.push("Line", Gesture::from_xy(&[(0.0, 0.0), (2.0, 0.0)]));
    set.push("Triangle", triangle());
    set.push("Circle", ring(16, 1.0));
    let noisy = Gesture::new(
        ring(48, 100.0)
            .points
            .iter()
            .map(|p| Point::new(p.x + rng.gen_range(-3.0..3.0), p.y + rng.gen_range(-3.0..3.0), 0))
            .collect(),
    );
    let result = classify(&noisy, &set).unwrap();
    assert_eq!(result.class_name, "Circle");
}

#[test]
fn multi_stroke_cross_matches_regardless_of_stroke_order() {
    let cross = Gesture::new(vec![
        Point::new(0.0, 0.0, 0),
        Point::new(1.0, 1.0, 0),
        Point::new(1.0, 0.0, 1),
        Point::new(0.0, 1.0, 1),
    ]);
    let reordered = Gesture::new(vec![
        Point::new(0.0, 1.0, 0),
        Point::new(1.0, 0.0, 0),
        Point::new(1.0, 1.0, 1),
        Point::new(0.0, 0.0, 1),
    ]);
    let mut set = line_and_circle();
    set.push("Cross", cross);
    let result = classify(&reordered, &set).unwrap();
    assert_eq!(result.class_name, "Cross");
    assert!(result.score >= THRESHOLD, "score {}", result.score);
}

#[test]
fn low_score_is_a_successful_result() {
    let mut set = TemplateSet::new();
    set.push("Line", Gesture::from_xy(&[(0.0, 0.0), (1.0, 0.0)]));
    let result = classify(&ring(32, 1.0), &set).unwrap();
    assert_eq!(result.class_name, "Line");
    assert!(result.score < THRESHOLD, "score {}", result.score);
}

#[test]
fn prepared_templates_match_direct_classification() {
    let mut set = line_and_circle();
    set.push("Triangle", triangle());
    let classifier = Classifier::default();
    let prepared = classifier.prepare(&set);
    assert_eq!(prepared.len(), 3);

    for candidate in [triangle(), ring(32, 4.0), transform(&triangle(), 3.0, 0.0, 5.0, 5.0)] {
        let direct = classifier.classify(&candidate, &set).unwrap();
        let cached = classifier.classify_prepared(&candidate, &prepared).unwrap();
        assert_eq!(direct, cached);
    }
}

#[test]
fn prepared_templates_skip_unusable_entries() {
    let mut set = TemplateSet::new();
    set.push("Hollow", Gesture::default());
    set.push("Triangle", triangle());
    let classifier = Classifier::default();
    let prepared = classifier.prepare(&set);
    assert_eq!(prepared.len(), 1);
    let result = classifier.classify_prepared(&triangle(), &prepared).unwrap();
    assert_eq!(result.class_name, "Triangle");
}

#[test]
fn prepared_templates_extend_in_place() {
    let classifier = Classifier::default();
    let mut prepared = classifier.prepare(&line_and_circle());
    assert!(prepared.push("Triangle", &triangle()));
    assert!(!prepared.push("Hollow", &Gesture::default()));
    assert_eq!(prepared.len(), 3);
    let result = classifier.classify_prepared(&triangle(), &prepared).unwrap();
    assert_eq!(result.class_name, "Triangle");
}

#[test]
fn prepared_templates_reject_a_different_config() {
    let prepared = Classifier::default().prepare(&line_and_circle());
    let rotating = Classifier::new(NormalizeConfig {
        rotation: RotationPolicy::IndicativeAngle,
        ..NormalizeConfig::default()
    });
    let err = rotating.classify_prepared(&triangle(), &prepared).unwrap_err();
    assert!(err.is_invalid_argument(), "{err}");
}

#[test]
fn empty_prepared_set_is_invalid_argument() {
    let err = Classifier::default()
        .classify_prepared(&triangle(), &PreparedTemplates::default())
        .unwrap_err();
    assert!(err.is_invalid_argument(), "{err}");
}
