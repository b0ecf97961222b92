//! Subcommand implementations.

use crate::cli::{Cli, Command};
use crate::script::parse_script;
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use whiteboard_core::camera::Camera;
use whiteboard_core::canvas::CanvasDocument;
use whiteboard_core::config::WhiteboardConfig;
use whiteboard_core::history::HistoryPosition;
use whiteboard_core::session::Session;
use whiteboard_core::shapes::SerializableColor;
use whiteboard_core::shortcuts::ShortcutRegistry;
use whiteboard_core::storage::{FileStorage, Storage};
use whiteboard_render::{default_export_file_name, export_png, load_font, Font, RasterRenderer};

/// Run a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Check { document } => {
            let summary = check(&document)?;
            println!("{}: {summary}", document.display());
        }
        Command::Render {
            document,
            output,
            font,
        } => {
            let written = render(&config, &document, output.as_deref(), font.as_deref())?;
            println!("Wrote {}", written.display());
        }
        Command::New {
            path,
            background,
            force,
        } => {
            new_document(&config, &path, background.as_deref(), force)?;
            println!("Created {}", path.display());
        }
        Command::Replay {
            script,
            document,
            output,
            png,
            frame,
            font,
            store,
            id,
        } => {
            let options = ReplayOptions {
                script,
                document,
                output,
                png,
                frame,
                font,
                store: store.zip(id),
            };
            let report = replay(config, &options)?;
            println!("{report}");
        }
        Command::List { store } => {
            for id in list(&store)? {
                println!("{id}");
            }
        }
        Command::Shortcuts => println!("{}", shortcuts()),
    }

    Ok(())
}

/// Load the configuration file, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<WhiteboardConfig> {
    let Some(path) = path else {
        return Ok(WhiteboardConfig::default());
    };
    WhiteboardConfig::load_from_file(path)
        .with_context(|| format!("loading config {}", path.display()))
}

fn read_document(path: &Path) -> Result<CanvasDocument> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    CanvasDocument::from_json(&json).with_context(|| format!("decoding {}", path.display()))
}

fn read_font(path: Option<&Path>) -> Result<Option<Font<'static>>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let bytes = fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
    let font = load_font(bytes).with_context(|| format!("loading font {}", path.display()))?;
    Ok(Some(font))
}

/// What a valid document contains.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSummary {
    pub shapes: usize,
    pub kinds: BTreeMap<&'static str, usize>,
    pub background: SerializableColor,
    /// `(x0, y0, x1, y1)` of the scene, if it has shapes.
    pub bounds: Option<(f64, f64, f64, f64)>,
}

impl fmt::Display for DocumentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} shapes", self.shapes)?;
        if !self.kinds.is_empty() {
            let kinds: Vec<String> = self
                .kinds
                .iter()
                .map(|(kind, count)| format!("{kind}: {count}"))
                .collect();
            write!(f, " ({})", kinds.join(", "))?;
        }
        write!(f, ", background {}", self.background)?;
        if let Some((x0, y0, x1, y1)) = self.bounds {
            write!(f, ", bounds ({x0:.1}, {y0:.1}) - ({x1:.1}, {y1:.1})")?;
        }
        Ok(())
    }
}

/// Validate a document file.
pub fn check(path: &Path) -> Result<DocumentSummary> {
    let document = read_document(path)?;
    let mut kinds = BTreeMap::new();
    for shape in document.shapes() {
        *kinds.entry(shape.kind_name()).or_insert(0) += 1;
    }
    Ok(DocumentSummary {
        shapes: document.len(),
        kinds,
        background: document.background_color,
        bounds: document.bounds().map(|r| (r.x0, r.y0, r.x1, r.y1)),
    })
}

/// Export a document file as PNG at the default view. Returns the written path.
pub fn render(
    config: &WhiteboardConfig,
    document: &Path,
    output: Option<&Path>,
    font: Option<&Path>,
) -> Result<PathBuf> {
    let scene = read_document(document)?;
    let font = read_font(font)?;
    let camera = Camera::with_zoom_range(config.min_zoom, config.max_zoom);
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(default_export_file_name()));

    write_png(config, &scene, &camera, font.as_ref(), &output)?;
    Ok(output)
}

fn write_png(
    config: &WhiteboardConfig,
    scene: &CanvasDocument,
    camera: &Camera,
    font: Option<&Font<'static>>,
    output: &Path,
) -> Result<()> {
    let image = export_png(
        scene,
        camera,
        config.surface_width,
        config.surface_height,
        font,
    )?;
    fs::write(output, image.encode()?).with_context(|| format!("writing {}", output.display()))?;
    log::info!("Exported {}x{} to {}", image.width, image.height, output.display());
    Ok(())
}

/// Write an empty document.
pub fn new_document(
    config: &WhiteboardConfig,
    path: &Path,
    background: Option<&str>,
    force: bool,
) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to replace it)", path.display());
    }
    let background = match background {
        Some(hex) => match SerializableColor::from_hex(hex) {
            Some(color) => color,
            None => bail!("invalid background color {hex:?}"),
        },
        None => config.background()?,
    };
    let document = CanvasDocument::with_background(background);
    fs::write(path, document.to_json_pretty()?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Inputs and outputs of a replay run.
#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    pub script: PathBuf,
    pub document: Option<PathBuf>,
    pub output: Option<PathBuf>,
    /// Export of the final scene.
    pub png: Option<PathBuf>,
    /// Live frame of the final state, selection included.
    pub frame: Option<PathBuf>,
    pub font: Option<PathBuf>,
    /// Document directory and id to save the result under.
    pub store: Option<(PathBuf, String)>,
}

/// Outcome of a replay run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayReport {
    pub steps: usize,
    pub shapes: usize,
    pub history: HistoryPosition,
}

impl fmt::Display for ReplayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} steps, {} shapes, history {}/{}",
            self.steps,
            self.shapes,
            self.history.index + 1,
            self.history.len
        )
    }
}

/// Replay a script against a document and write the requested outputs.
pub fn replay(config: WhiteboardConfig, options: &ReplayOptions) -> Result<ReplayReport> {
    let script = fs::read_to_string(&options.script)
        .with_context(|| format!("reading {}", options.script.display()))?;
    let steps = parse_script(&script)
        .with_context(|| format!("parsing script {}", options.script.display()))?;
    let font = read_font(options.font.as_deref())?;

    let (width, height) = (config.surface_width, config.surface_height);
    let mut session = match &options.document {
        Some(path) => Session::with_document(config, read_document(path)?)?,
        None => Session::with_config(config)?,
    };
    let mut renderer = RasterRenderer::new(width, height);
    renderer.set_font(font.clone());

    for step in &steps {
        step.apply(&mut session);
        session.flush(&mut renderer);
    }
    log::debug!("Replayed {} steps", steps.len());

    if let Some(output) = &options.output {
        fs::write(output, session.document().to_json_pretty()?)
            .with_context(|| format!("writing {}", output.display()))?;
    }
    if let Some(png) = &options.png {
        write_png(
            session.config(),
            session.document(),
            session.camera(),
            font.as_ref(),
            png,
        )?;
    }
    if let Some(frame) = &options.frame {
        renderer.render()?;
        fs::write(frame, renderer.frame_png()?)
            .with_context(|| format!("writing {}", frame.display()))?;
    }
    if let Some((dir, id)) = &options.store {
        let storage = FileStorage::new(dir.clone())?;
        pollster::block_on(session.save_to(&storage, id))
            .with_context(|| format!("saving {id} to {}", dir.display()))?;
    }

    Ok(ReplayReport {
        steps: steps.len(),
        shapes: session.document().len(),
        history: session.history_position(),
    })
}

/// Ids of the documents in a document directory.
pub fn list(store: &Path) -> Result<Vec<String>> {
    let storage = FileStorage::new(store.to_path_buf())?;
    let ids = pollster::block_on(storage.list())?;
    Ok(ids)
}

/// Keyboard shortcut listing, one binding per line.
pub fn shortcuts() -> String {
    ShortcutRegistry::describe()
}
