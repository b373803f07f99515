use crate::runes::engine::{Gesture, Point};
use crate::runes::error::{ParseErrorKind, RuneError, RuneResult};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const SCHEMA_VERSION: u32 = 1;
pub const TEMPLATE_EXTENSION: &str = "json";

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub name: String,
    pub gesture: Gesture,
}

/// Labeled reference gestures in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateSet {
    templates: Vec<Template>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    pub fn push(&mut self, name: impl Into<String>, gesture: Gesture) {
        let name = name.into();
        let gesture = Gesture {
            name: Some(name.clone()),
            points: gesture.points,
        };
        self.templates.push(Template { name, gesture });
    }

    pub fn extend(&mut self, other: TemplateSet) {
        self.templates.extend(other.templates);
    }

    /// Distinct class names in first-seen order.
    pub fn classes(&self) -> Vec<&str> {
        let mut classes: Vec<&str> = Vec::new();
        for template in &self.templates {
            if !classes.contains(&template.name.as_str()) {
                classes.push(&template.name);
            }
        }
        classes
    }

    pub fn templates_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Template> + 'a {
        self.templates.iter().filter(move |t| t.name == name)
    }

    /// Persists `gesture` as a new template file in `dir` and appends it.
    pub fn add_template(
        &mut self,
        dir: &Path,
        class_name: &str,
        gesture: &Gesture,
    ) -> RuneResult<PathBuf> {
        std::fs::create_dir_all(dir).map_err(|source| RuneError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(template_file_name(class_name, Local::now()));
        save_template(gesture, class_name, &path)?;
        self.push(class_name, gesture.clone());
        tracing::info!(class = class_name, path = %path.display(), "saved new rune template");
        Ok(path)
    }
}

impl FromIterator<(String, Gesture)> for TemplateSet {
    fn from_iter<I: IntoIterator<Item = (String, Gesture)>>(iter: I) -> Self {
        let mut set = TemplateSet::new();
        for (name, gesture) in iter {
            set.push(name, gesture);
        }
        set
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateRecord {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub name: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateSetRecord {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub templates: Vec<TemplateRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TemplateDocument {
    Set(TemplateSetRecord),
    Single(TemplateRecord),
}

pub fn template_file_name(class_name: &str, now: chrono::DateTime<Local>) -> String {
    let stem = slug::slugify(class_name);
    let stem = if stem.is_empty() { "rune".to_string() } else { stem };
    format!(
        "{}-{}.{}",
        stem,
        now.format("%Y%m%d_%H%M%S_%3f"),
        TEMPLATE_EXTENSION
    )
}

pub fn save_template(gesture: &Gesture, class_name: &str, destination: &Path) -> RuneResult<()> {
    let record = TemplateRecord {
        schema_version: SCHEMA_VERSION,
        name: class_name.to_string(),
        points: gesture.points.clone(),
    };
    validate_record(&record).map_err(|kind| RuneError::InvalidArgument(format!("{kind:?}")))?;
    let json = serde_json::to_string_pretty(&record)
        .map_err(|err| RuneError::parse_at(destination, ParseErrorKind::Json(err.to_string())))?;
    std::fs::write(destination, json).map_err(|source| RuneError::Io {
        path: destination.to_path_buf(),
        source,
    })
}

/// Reads one template file holding either a single record or a set document.
pub fn load_template(path: &Path) -> RuneResult<TemplateSet> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::InvalidData {
            return RuneError::parse_at(path, ParseErrorKind::Json(err.to_string()));
        }
        tracing::debug!(path = %path.display(), ?err, "template file unreadable");
        RuneError::NotFound {
            path: path.to_path_buf(),
        }
    })?;
    let document: TemplateDocument = serde_json::from_str(&content)
        .map_err(|err| RuneError::parse_at(path, ParseErrorKind::Json(err.to_string())))?;
    let (version, records) = match document {
        TemplateDocument::Set(set) => (set.schema_version, set.templates),
        TemplateDocument::Single(record) => (record.schema_version, vec![record]),
    };
    if version != SCHEMA_VERSION {
        return Err(RuneError::parse_at(
            path,
            ParseErrorKind::UnsupportedSchema { version },
        ));
    }

    let mut set = TemplateSet::new();
    for record in records {
        if record.schema_version != SCHEMA_VERSION {
            return Err(RuneError::parse_at(
                path,
                ParseErrorKind::UnsupportedSchema {
                    version: record.schema_version,
                },
            ));
        }
        validate_record(&record).map_err(|kind| RuneError::parse_at(path, kind))?;
        set.push(record.name, Gesture::new(record.points));
    }
    Ok(set)
}

/// Loads every template file under `dir`, skipping files that fail to parse.
pub fn load_templates(dir: &Path) -> RuneResult<TemplateSet> {
    if !dir.is_dir() {
        return Err(RuneError::NotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        match entry {
            Ok(entry) if entry.file_type().is_file() && is_template_file(entry.path()) => {
                files.push(entry.into_path());
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(dir = %dir.display(), %err, "failed to scan template dir"),
        }
    }
    files.sort();

    let mut set = TemplateSet::new();
    for file in files {
        match load_template(&file) {
            Ok(loaded) => set.extend(loaded),
            Err(err) => tracing::warn!(path = %file.display(), %err, "skipping rune template"),
        }
    }
    tracing::info!(dir = %dir.display(), count = set.len(), "loaded rune templates");
    Ok(set)
}

/// Loads several template directories in order. Missing ones are skipped.
pub fn load_template_dirs<P: AsRef<Path>>(dirs: &[P]) -> TemplateSet {
    let mut set = TemplateSet::new();
    for dir in dirs {
        match load_templates(dir.as_ref()) {
            Ok(loaded) => set.extend(loaded),
            Err(err) => tracing::warn!(%err, "template directory unavailable"),
        }
    }
    set
}

fn is_template_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(TEMPLATE_EXTENSION))
}

fn validate_record(record: &TemplateRecord) -> Result<(), ParseErrorKind> {
    if record.name.trim().is_empty() {
        return Err(ParseErrorKind::EmptyName);
    }
    if let Some(index) = record
        .points
        .iter()
        .position(|p| !p.x.is_finite() || !p.y.is_finite())
    {
        return Err(ParseErrorKind::InvalidNumber {
            index,
            coord: 0,
            value: "non-finite".into(),
        });
    }
    Gesture::new(record.points.clone()).validate()
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}
