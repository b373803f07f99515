pub mod capture;
pub mod classifier;
pub mod db;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod job;
pub mod session;

pub use capture::{CaptureConfig, CaptureMode, PointerEvent, StrokeCapture};
pub use classifier::{classify, ClassificationResult, Classifier, PreparedTemplates};
pub use db::{
    load_template, load_template_dirs, load_templates, save_template, Template, TemplateSet,
};
pub use dispatch::{DispatchOutcome, LoggingCaster, Spell, SpellCaster, SpellDispatcher};
pub use engine::{parse_gesture, serialize_gesture, Gesture, NormalizeConfig, Point, RotationPolicy};
pub use error::{ParseError, ParseErrorKind, RuneError, RuneResult};
pub use job::{RecognitionJob, RecognitionSlot};
pub use session::{RuneSession, SessionEvent};
