//! View Replay - drive a GraphView from a recorded scenario
//!
//! Reads a JSON scenario (initial snapshot plus timed backend events and app
//! requests), replays it against a fresh view and prints every frame and
//! output as one JSON line on stdout.
//!
//! Usage:
//!   view_replay scenario.json
//!   view_replay scenario.json --config view.yaml
//!   GRAPH_VIEW_CONFIG=view.yaml RUST_LOG=graph_view=debug view_replay scenario.json

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use graph_view_sync::graph_view::{EngineConfig, PluginRegistry};
use graph_view_sync::types::{
    BackendEvent, ElementIdSet, ModelSnapshot, PathFocus, Point, RenderFrame, ViewOutput,
};
use graph_view_sync::GraphView;

#[derive(Parser, Debug)]
#[command(name = "view_replay")]
#[command(about = "Replay a recorded interaction scenario against the graph view")]
struct Args {
    /// Scenario file (JSON)
    scenario: PathBuf,

    /// Engine configuration (YAML); falls back to GRAPH_VIEW_CONFIG, then defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip frames, print outputs only
    #[arg(long)]
    outputs_only: bool,
}

// =============================================================================
// SCENARIO FORMAT
// =============================================================================

#[derive(Debug, Deserialize)]
struct Scenario {
    snapshot: ModelSnapshot,
    #[serde(default)]
    steps: Vec<Step>,
    /// Clock value for the final tick; defaults to the last step
    #[serde(default)]
    end_at: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Step {
    at: u64,
    #[serde(flatten)]
    action: Action,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Action {
    Event(BackendEvent),
    Request(AppRequest),
}

/// App-side calls a scenario can make
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AppRequest {
    UpdateModel {
        snapshot: ModelSnapshot,
    },
    FocusPaths {
        paths: PathFocus,
    },
    DefocusPaths,
    FocusPathsAdd,
    StartConnection {
        vertex_id: String,
        #[serde(default)]
        connection_type: Option<String>,
    },
    FinishConnection,
    Preview {
        vertex_ids: Vec<String>,
    },
    ClosePreview {
        vertex_id: String,
    },
    ImportDropped {
        vertex_ids: Vec<String>,
        page: Point,
        #[serde(default)]
        container_origin: Point,
    },
    Paste {
        ids: ElementIdSet,
    },
    Cut {
        vertex_ids: Vec<String>,
    },
    SelectAll,
    SelectConnected,
    AddRelated {
        vertex_ids: Vec<String>,
    },
    MenuSelect {
        identifier: String,
    },
    MenuExport {
        component_path: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Line<'a> {
    Frame { at: u64, frame: &'a RenderFrame },
    Output { at: u64, output: &'a ViewOutput },
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::from_env().context("Failed to load config from environment")?,
    };

    let content = std::fs::read_to_string(&args.scenario)
        .with_context(|| format!("Failed to read scenario {}", args.scenario.display()))?;
    let scenario: Scenario =
        serde_json::from_str(&content).context("Failed to parse scenario")?;

    tracing::info!(
        model_id = %scenario.snapshot.model_id,
        steps = scenario.steps.len(),
        "replaying scenario"
    );

    let mut replay = Replay::new(config, args.outputs_only)?;
    replay.run(scenario)
}

struct Replay {
    view: GraphView,
    registry: Arc<PluginRegistry>,
    outputs_only: bool,
}

impl Replay {
    fn new(config: EngineConfig, outputs_only: bool) -> Result<Self> {
        let registry = Arc::new(PluginRegistry::new());
        let view = GraphView::new(config, Arc::clone(&registry))?;
        Ok(Self {
            view,
            registry,
            outputs_only,
        })
    }

    fn run(&mut self, scenario: Scenario) -> Result<()> {
        let end_at = scenario
            .end_at
            .or_else(|| scenario.steps.last().map(|s| s.at))
            .unwrap_or(0);

        let outputs = self
            .view
            .update_model(scenario.snapshot, Arc::clone(&self.registry));
        self.emit(0, &outputs)?;
        self.render(0)?;

        for step in scenario.steps {
            let ticked = self.view.tick(step.at);
            self.emit(step.at, &ticked)?;

            let outputs = match step.action {
                Action::Event(event) => self.view.handle_event(event, step.at),
                Action::Request(request) => self.request(request, step.at),
            };
            self.emit(step.at, &outputs)?;
        }

        let outputs = self.view.tick(end_at);
        self.emit(end_at, &outputs)?;
        let outputs = self.view.shutdown();
        self.emit(end_at, &outputs)
    }

    fn request(&mut self, request: AppRequest, now: u64) -> Vec<ViewOutput> {
        match request {
            AppRequest::UpdateModel { snapshot } => {
                let mut outputs = self
                    .view
                    .update_model(snapshot, Arc::clone(&self.registry));
                outputs.push(ViewOutput::Rerender);
                outputs
            }
            AppRequest::FocusPaths { paths } => self.view.focus_paths(paths),
            AppRequest::DefocusPaths => self.view.defocus_paths(),
            AppRequest::FocusPathsAdd => self.view.focus_paths_add(),
            AppRequest::StartConnection {
                vertex_id,
                connection_type,
            } => self.view.start_vertex_connection(&vertex_id, connection_type),
            AppRequest::FinishConnection => self.view.finish_vertex_connection(),
            AppRequest::Preview { vertex_ids } => self.view.preview_vertices(&vertex_ids),
            AppRequest::ClosePreview { vertex_id } => self.view.close_preview(&vertex_id),
            AppRequest::ImportDropped {
                vertex_ids,
                page,
                container_origin,
            } => self.view.import_dropped(vertex_ids, page, container_origin),
            AppRequest::Paste { ids } => self.view.elements_pasted(ids),
            AppRequest::Cut { vertex_ids } => self.view.elements_cut(vertex_ids),
            AppRequest::SelectAll => {
                self.view.select_all(now);
                Vec::new()
            }
            AppRequest::SelectConnected => {
                self.view.select_connected(now);
                Vec::new()
            }
            AppRequest::AddRelated { vertex_ids } => self.view.add_related(vertex_ids),
            AppRequest::MenuSelect { identifier } => self.view.menu_select(&identifier, now),
            AppRequest::MenuExport { component_path } => self.view.menu_export(&component_path),
        }
    }

    /// Print outputs; a `Rerender` among them triggers one new frame
    fn emit(&mut self, at: u64, outputs: &[ViewOutput]) -> Result<()> {
        let mut rerender = false;
        for output in outputs {
            if *output == ViewOutput::Rerender {
                rerender = true;
                continue;
            }
            println!("{}", serde_json::to_string(&Line::Output { at, output })?);
        }
        if rerender {
            self.render(at)?;
        }
        Ok(())
    }

    fn render(&mut self, at: u64) -> Result<()> {
        match self.view.render() {
            Ok(frame) if !self.outputs_only => {
                println!("{}", serde_json::to_string(&Line::Frame { at, frame: &frame })?);
            }
            Ok(_) => {}
            Err(err) if err.is_recoverable() => {
                tracing::warn!(code = err.code(), error = %err, "render failed");
            }
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }
}
