//! TESSERA CLI
//!
//! A minimal host for the composition core: validate dashboard payloads,
//! replay patch messages against them, and trace how an event routes.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod load;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail};
use console::style;
use std::path::{Path, PathBuf};
use tessera_core::PanelId;
use tessera_link::Event;
use tessera_patch::{Composition, PatchOutcome};
use tessera_schema::{Dashboard, SchemaValidator, ViewResolver};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "TESSERA - linked multi-panel dashboard composition", long_about = None)]
struct Cli {
    /// Session config (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Initial cross-view state (JSON)
    #[arg(short, long, global = true)]
    state: Option<PathBuf>,
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a dashboard payload and resolve its views
    Validate {
        /// Dashboard file
        dashboard: PathBuf,
    },
    /// Apply patch messages to a dashboard and print the result
    Patch {
        /// Dashboard file
        dashboard: PathBuf,
        /// Patch files, applied in order
        #[arg(required = true)]
        patches: Vec<PathBuf>,
        /// Print what each patch changed
        #[arg(long)]
        diff: bool,
    },
    /// Publish one event and print where it went
    Route {
        /// Dashboard file
        dashboard: PathBuf,
        /// Publishing panel
        #[arg(short, long)]
        panel: String,
        /// Event kind
        #[arg(short, long)]
        kind: String,
        /// Field the value refers to
        #[arg(short, long)]
        field: Option<String>,
        /// Value as JSON (bare words are taken as strings)
        #[arg(long)]
        value: String,
    },
    /// Print the initial-state overlay of every panel it reaches
    Overlays {
        /// Dashboard file
        dashboard: PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let default_level = if cli.verbose { "tessera=debug" } else { "tessera=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let session = Session {
        config: cli.config,
        state: cli.state,
    };
    match cli.command {
        Commands::Validate { dashboard } => validate(&dashboard),
        Commands::Patch {
            dashboard,
            patches,
            diff,
        } => patch(&session, &dashboard, &patches, diff),
        Commands::Route {
            dashboard,
            panel,
            kind,
            field,
            value,
        } => route(&session, &dashboard, &panel, &kind, field, &value),
        Commands::Overlays { dashboard } => overlays(&session, &dashboard),
    }
}

/// Files every session-backed command shares
struct Session {
    config: Option<PathBuf>,
    state: Option<PathBuf>,
}

impl Session {
    fn load(&self, dashboard: &Path) -> Result<Composition> {
        let config = load::load_config(self.config.as_deref())?;
        let state = load::load_state(self.state.as_deref())?;
        load::load_composition(dashboard, &state, config)
    }
}

fn validate(path: &Path) -> Result<()> {
    let value = load::read_json(path)?;
    let dashboard = Dashboard::from_value(&value).wrap_err("not a dashboard payload")?;
    let version = dashboard.version();
    let dashboard = dashboard.into_v2();

    if let Err(errors) = SchemaValidator::new().validate_dashboard(&dashboard) {
        for error in &errors {
            println!("{} {}", style("error").red().bold(), error);
        }
        bail!("{} problem(s) in {}", errors.len(), path.display());
    }

    let resolver = ViewResolver::new().with_registry(&dashboard.view_registry);
    println!(
        "{} dashboard {} ({} panels, {} links, layout {})",
        style("ok").green().bold(),
        version,
        dashboard.panels.len(),
        dashboard.links.len(),
        dashboard.layout
    );
    for panel in &dashboard.panels {
        let url = resolver.resolve(panel)?;
        println!("  {:<16} {}", panel.id.as_str(), style(url).dim());
    }
    for link in &dashboard.links {
        println!("  {link}");
    }
    Ok(())
}

fn patch(session: &Session, dashboard: &Path, patches: &[PathBuf], diff: bool) -> Result<()> {
    let mut composition = session.load(dashboard)?;

    for path in patches {
        let message = load::read_json(path)?;
        let (outcome, changes) = composition
            .apply_message_with_diff(&message)
            .wrap_err_with(|| format!("applying {}", path.display()))?;
        print_outcome(path, &outcome);
        if diff {
            print!("{changes}");
            if !changes.has_changes() {
                println!();
            }
        }
    }

    println!("{}", composition.snapshot().to_json()?);
    Ok(())
}

fn print_outcome(path: &Path, outcome: &PatchOutcome) {
    let status = if outcome.is_complete() {
        style("applied").green()
    } else if outcome.is_halted() {
        style("halted").red()
    } else {
        style("partial").yellow()
    };
    println!(
        "{} {} ({} ops, {} recompiles)",
        status.bold(),
        path.display(),
        outcome.applied.len(),
        outcome.recompiled
    );
    for rejected in outcome.errors() {
        println!("  #{} {}: {}", rejected.index, rejected.op, rejected.error);
    }
}

fn route(
    session: &Session,
    dashboard: &Path,
    panel: &str,
    kind: &str,
    field: Option<String>,
    value: &str,
) -> Result<()> {
    let mut composition = session.load(dashboard)?;
    let source = PanelId::from(panel);
    if !composition.registry().contains(panel) {
        bail!("panel {panel:?} is not in the dashboard");
    }

    let mut event = Event::new(load::parse_kind(kind)?, source.clone(), load::parse_value(value));
    event.field = field;
    let report = composition.publish(&source, event);

    if report.deliveries.is_empty() {
        println!("{}", style("no routes").yellow());
    }
    for delivery in &report.deliveries {
        let indent = "  ".repeat(delivery.depth);
        println!("{indent}{} -> {}  {}", delivery.source, delivery.target, delivery.event);
    }
    for skipped in &report.suppressed {
        println!(
            "{} {} -> {} ({})",
            style("suppressed").dim(),
            skipped.source,
            skipped.target,
            skipped.kind
        );
    }
    println!("{}", composition.snapshot().to_json()?);
    Ok(())
}

fn overlays(session: &Session, dashboard: &Path) -> Result<()> {
    if session.state.is_none() {
        println!("{}", style("no --state given").yellow());
    }
    let composition = session.load(dashboard)?;
    if composition.overlays().is_empty() {
        println!("{}", style("no overlays").yellow());
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(composition.overlays())?);
    Ok(())
}
