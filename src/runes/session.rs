use crate::draw::canvas::RuneCanvas;
use crate::draw::fade::NameFade;
use crate::runes::capture::{PointerEvent, StrokeCapture};
use crate::runes::classifier::{ClassificationResult, Classifier, PreparedTemplates};
use crate::runes::db::{load_template_dirs, TemplateSet};
use crate::runes::dispatch::{DispatchOutcome, LoggingCaster, SpellCaster, SpellDispatcher};
use crate::runes::error::{RuneError, RuneResult};
use crate::runes::job::RecognitionSlot;
use crate::settings::RuneSettings;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    DrawModeChanged(bool),
    AddModeChanged(bool),
    /// Stroke finished with too few points to classify.
    StrokeIgnored { points: usize },
    RecognitionStarted,
    /// A recognition was still in flight; the new candidate was dropped.
    RecognitionRejected,
    Recognized(DispatchOutcome),
    RecognitionFailed(String),
    TemplateSaved { class_name: String, path: PathBuf },
    TemplateSaveFailed(String),
}

/// One player's rune drawing state.
///
/// Pointer positions are in canvas units: `[0, 1]²` with the origin at the
/// bottom-left. Captured points are scaled to texture pixels, y up.
pub struct RuneSession {
    classifier: Classifier,
    templates: TemplateSet,
    prepared: Arc<PreparedTemplates>,
    capture: StrokeCapture,
    canvas: RuneCanvas,
    fade: NameFade,
    dispatcher: SpellDispatcher,
    caster: Box<dyn SpellCaster>,
    slot: RecognitionSlot,
    min_score: f32,
    min_stroke_points: usize,
    background: bool,
    user_template_dir: PathBuf,
    new_template_name: String,
    drawing: bool,
    add_mode: bool,
}

impl RuneSession {
    pub fn new(settings: &RuneSettings, templates: TemplateSet, caster: Box<dyn SpellCaster>) -> Self {
        let classifier = Classifier::new(settings.normalize_config());
        let prepared = Arc::new(classifier.prepare(&templates));
        Self {
            classifier,
            templates,
            prepared,
            capture: StrokeCapture::new(settings.capture_config()),
            canvas: RuneCanvas::new(settings.texture_size(), settings.brush_size),
            fade: NameFade::new(settings.fade_speed),
            dispatcher: SpellDispatcher::new(settings.spell_bindings.clone()),
            caster,
            slot: RecognitionSlot::new(),
            min_score: settings.min_score,
            min_stroke_points: settings.min_stroke_points.max(1),
            background: settings.background_recognition,
            user_template_dir: settings.user_template_dir(),
            new_template_name: settings.new_template_name.clone(),
            drawing: false,
            add_mode: false,
        }
    }

    /// Loads bundled and user templates and casts through [`LoggingCaster`].
    pub fn from_settings(settings: &RuneSettings) -> Self {
        let templates = load_template_dirs(&settings.all_template_dirs());
        tracing::info!(count = templates.len(), "rune templates ready");
        Self::new(settings, templates, Box::new(LoggingCaster))
    }

    pub fn is_drawing_mode(&self) -> bool {
        self.drawing
    }

    pub fn is_add_mode(&self) -> bool {
        self.add_mode
    }

    pub fn is_recognition_pending(&self) -> bool {
        self.slot.is_pending()
    }

    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    pub fn capture(&self) -> &StrokeCapture {
        &self.capture
    }

    pub fn canvas(&self) -> &RuneCanvas {
        &self.canvas
    }

    pub fn fade(&self) -> &NameFade {
        &self.fade
    }

    pub fn dispatcher_mut(&mut self) -> &mut SpellDispatcher {
        &mut self.dispatcher
    }

    pub fn set_new_template_name(&mut self, name: impl Into<String>) {
        self.new_template_name = name.into();
    }

    pub fn toggle_draw_mode(&mut self) -> SessionEvent {
        self.drawing = !self.drawing;
        self.clear();
        tracing::debug!(drawing = self.drawing, "draw mode toggled");
        SessionEvent::DrawModeChanged(self.drawing)
    }

    pub fn toggle_add_mode(&mut self) -> SessionEvent {
        self.add_mode = !self.add_mode;
        tracing::info!(add_mode = self.add_mode, "add mode toggled");
        SessionEvent::AddModeChanged(self.add_mode)
    }

    /// Drops the candidate, wipes the canvas and cancels pending recognition.
    pub fn clear(&mut self) {
        self.capture.clear();
        self.canvas.clear();
        self.fade.clear();
        self.slot.cancel();
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> RuneResult<Vec<SessionEvent>> {
        if !self.drawing {
            return Ok(Vec::new());
        }
        let (u, v) = event.position();
        if let PointerEvent::Down { .. } = event {
            self.canvas.lift_brush();
        }

        let was_open = self.capture.is_stroke_open();
        let finished = self.capture.handle(event.scaled(self.canvas.size() as f32))?;
        if was_open || matches!(event, PointerEvent::Down { .. }) {
            let (px, py) = self.canvas.to_texture(u, v);
            self.canvas.paint_to(px, py);
        }

        match finished {
            Some(_) => {
                self.canvas.lift_brush();
                Ok(self.finish_stroke())
            }
            None => Ok(Vec::new()),
        }
    }

    /// Advances the fade and collects a finished background recognition.
    pub fn tick(&mut self, dt_secs: f32) -> Vec<SessionEvent> {
        self.fade.tick(dt_secs);
        match self.slot.poll() {
            Some(result) => vec![self.complete(result)],
            None => Vec::new(),
        }
    }

    fn finish_stroke(&mut self) -> Vec<SessionEvent> {
        if self.add_mode {
            return vec![self.save_candidate()];
        }

        let points = self.capture.len();
        if points < self.min_stroke_points {
            tracing::debug!(points, min = self.min_stroke_points, "stroke too short to classify");
            return vec![SessionEvent::StrokeIgnored { points }];
        }
        let candidate = match self.capture.take_gesture() {
            Ok(candidate) => candidate,
            Err(err) => return vec![SessionEvent::RecognitionFailed(err.to_string())],
        };
        self.canvas.clear();

        if !self.background {
            let result = self.classifier.classify_prepared(&candidate, &self.prepared);
            return vec![self.complete(result)];
        }
        match self
            .slot
            .submit(self.classifier.clone(), candidate, Arc::clone(&self.prepared))
        {
            Ok(()) => vec![SessionEvent::RecognitionStarted],
            Err(err) => {
                tracing::debug!(%err, "dropping candidate");
                vec![SessionEvent::RecognitionRejected]
            }
        }
    }

    fn save_candidate(&mut self) -> SessionEvent {
        let candidate = match self.capture.take_gesture() {
            Ok(candidate) => candidate,
            Err(err) => return SessionEvent::TemplateSaveFailed(err.to_string()),
        };
        self.canvas.clear();
        let class_name = self.new_template_name.clone();
        match self
            .templates
            .add_template(&self.user_template_dir, &class_name, &candidate)
        {
            Ok(path) => {
                Arc::make_mut(&mut self.prepared).push(&class_name, &candidate);
                SessionEvent::TemplateSaved { class_name, path }
            }
            Err(err) => {
                tracing::error!(%err, "failed to save rune template");
                SessionEvent::TemplateSaveFailed(err.to_string())
            }
        }
    }

    fn complete(&mut self, result: RuneResult<ClassificationResult>) -> SessionEvent {
        match result {
            Ok(result) => {
                let outcome = self
                    .dispatcher
                    .dispatch(&result, self.min_score, self.caster.as_mut());
                self.fade.set(outcome.display_name());
                SessionEvent::Recognized(outcome)
            }
            Err(err) => {
                if let RuneError::InvalidArgument(_) = err {
                    tracing::warn!(%err, "rune could not be classified");
                } else {
                    tracing::error!(%err, "rune recognition failed");
                }
                SessionEvent::RecognitionFailed(err.to_string())
            }
        }
    }
}
