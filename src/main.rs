use anyhow::anyhow;
use clap::{Parser, Subcommand};
use runecaster::draw::RuneCanvas;
use runecaster::logging;
use runecaster::runes::db::{load_template_dirs, TemplateSet};
use runecaster::runes::engine::{parse_gesture, Gesture};
use runecaster::runes::{Classifier, LoggingCaster, SpellDispatcher};
use runecaster::settings::{RuneSettings, SETTINGS_FILE};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "runecaster", about = "Classify drawn runes against gesture templates")]
struct Cli {
    /// Settings file
    #[arg(long, default_value = SETTINGS_FILE)]
    settings: String,
    /// Template directories; overrides the configured ones
    #[arg(long = "templates", global = true)]
    templates: Vec<PathBuf>,
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a gesture given as `x,y|x,y,stroke|...`
    Classify {
        points: String,
        /// Minimum score to cast; defaults to the configured one
        #[arg(long)]
        threshold: Option<f32>,
    },
    /// Store a gesture as a new template
    Add {
        name: String,
        points: String,
        /// Target directory; defaults to the user template directory
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// List loaded template classes
    List,
    /// Rasterize a gesture into a PNG
    Render {
        points: String,
        #[arg(long, default_value = "rune.png")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = RuneSettings::load(&cli.settings)?;
    logging::init(cli.debug || settings.debug_logging, settings.log_file.clone());

    let template_dirs = if cli.templates.is_empty() {
        settings.all_template_dirs()
    } else {
        cli.templates.clone()
    };

    match cli.command {
        Command::Classify { points, threshold } => {
            let templates = load_template_dirs(&template_dirs);
            let candidate = parse_gesture(&points)?;
            let result = Classifier::new(settings.normalize_config())
                .classify(&candidate, &templates)?;
            let dispatcher = SpellDispatcher::new(settings.spell_bindings.clone());
            let outcome = dispatcher.dispatch(
                &result,
                threshold.unwrap_or(settings.min_score),
                &mut LoggingCaster,
            );
            println!(
                "{} ({:.3}) -> {}",
                result.class_name,
                result.score,
                outcome.display_name()
            );
        }
        Command::Add { name, points, dir } => {
            let gesture = parse_gesture(&points)?;
            let dir = dir.unwrap_or_else(|| settings.user_template_dir());
            let path = TemplateSet::new().add_template(&dir, &name, &gesture)?;
            println!("{}", path.display());
        }
        Command::List => {
            let templates = load_template_dirs(&template_dirs);
            for class in templates.classes() {
                println!("{class}\t{}", templates.templates_for(class).count());
            }
        }
        Command::Render { points, out } => {
            let gesture = parse_gesture(&points)?;
            let canvas = render_gesture(&gesture, settings.texture_size(), settings.brush_size)?;
            canvas.save_png(&out)?;
            println!("{}", out.display());
        }
    }
    Ok(())
}

/// Fits the gesture into the canvas with a margin and paints each stroke.
fn render_gesture(gesture: &Gesture, size: u32, brush: u32) -> anyhow::Result<RuneCanvas> {
    let first = gesture.points.first().ok_or_else(|| anyhow!("gesture has no points"))?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &gesture.points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let extent = (max_x - min_x).max(max_y - min_y).max(f32::EPSILON);
    let margin = 0.1;

    let mut canvas = RuneCanvas::new(size, brush);
    let mut stroke = None;
    for p in &gesture.points {
        if stroke != Some(p.stroke_id) {
            canvas.lift_brush();
            stroke = Some(p.stroke_id);
        }
        let u = margin + (p.x - min_x) / extent * (1.0 - 2.0 * margin);
        let v = margin + (p.y - min_y) / extent * (1.0 - 2.0 * margin);
        let (x, y) = canvas.to_texture(u, v);
        canvas.paint_to(x, y);
    }
    Ok(canvas)
}
