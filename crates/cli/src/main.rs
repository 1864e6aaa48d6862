mod provenance;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

use boundary::analysis::{
    analyze_boundary, analyze_boundary_with_verification, analyze_edges_with_uncertainty,
    analyze_vertices_with_uncertainty, edge_ranges, EdgeInput,
};
use boundary::caps::Capabilities;
use boundary::geom::{BoundaryCfg, Vertex};
use boundary::montecarlo::{McCfg, UncertainVertex};
use boundary::resolve::resolve_edge;

use provenance::Payload;

#[derive(Parser)]
#[command(name = "boundary")]
#[command(about = "Boundary area, perimeter and closure analysis with measurement ranges")]
struct Cmd {
    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Analyze an exact vertex list
    Analyze {
        /// JSON array of {"id", "x", "y"}
        #[arg(long)]
        input: PathBuf,
        /// JSON array of expected edge lengths, in order
        #[arg(long)]
        expected: Option<PathBuf>,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Walk ranged edges and propagate their uncertainty
    Uncertain {
        /// JSON array of {"name", "direction", "length"}
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        sampling: SamplingArgs,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Analyze vertices whose coordinates may be ranges
    Vertices {
        /// JSON array of {"id", "x", "y"} with number, [min, max] or range coordinates
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        sampling: SamplingArgs,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Find the length of one ranged edge that closes the walk
    Resolve {
        /// JSON array of {"name", "direction", "length"}
        #[arg(long)]
        input: PathBuf,
        /// Zero-based index of the edge to resolve
        #[arg(long)]
        edge: usize,
        /// Closure gap to aim for
        #[arg(long, default_value_t = 0.0)]
        target: f64,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Print version, git revision and available capabilities
    Report,
}

#[derive(Args, Clone)]
struct CommonArgs {
    #[arg(long, default_value = "FT")]
    unit: String,
    /// Maximum first-to-last gap for a closed ring
    #[arg(long, default_value_t = 0.1)]
    closure_tol: f64,
    /// Check polygon simplicity with the geo-based validity check
    #[arg(long)]
    geometry: bool,
    /// Write JSON here (plus a provenance sidecar) instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Clone)]
struct SamplingArgs {
    #[arg(long, default_value_t = 10_000)]
    samples: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Disable sampling; report point estimates only
    #[arg(long)]
    no_stats: bool,
}

impl CommonArgs {
    fn boundary_cfg(&self) -> BoundaryCfg {
        BoundaryCfg {
            closure_tol: self.closure_tol,
            ..BoundaryCfg::default()
        }
    }
}

fn capabilities(seed: u64, stats: bool, geometry: bool) -> Capabilities {
    let mut caps = Capabilities::seeded(seed);
    if !stats {
        caps = caps.without_rng();
    }
    if !geometry {
        caps = caps.without_geometry();
    }
    caps
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose { Level::DEBUG } else { Level::INFO };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let (doc, out, payload) = run(cmd.action)?;
    emit(&doc, out.as_deref(), payload)
}

/// Execute one subcommand; returns the document, its destination and provenance.
fn run(action: Action) -> Result<(Value, Option<PathBuf>, Payload)> {
    match action {
        Action::Analyze {
            input,
            expected,
            common,
        } => {
            let caps = capabilities(0, false, common.geometry);
            let doc = analyze(&input, expected.as_deref(), &common, &caps)?;
            let payload = Payload::new(
                "analyze",
                json!({
                    "input": input,
                    "expected": expected,
                    "unit": common.unit,
                    "closure_tol": common.closure_tol,
                }),
            )
            .with_capabilities(caps.report());
            Ok((doc, common.out, payload))
        }
        Action::Uncertain {
            input,
            sampling,
            common,
        } => {
            let mut caps = capabilities(sampling.seed, !sampling.no_stats, common.geometry);
            let doc = uncertain(&input, &sampling, &common, &mut caps)?;
            let payload = Payload::new("uncertain", sampling_params(&input, &sampling, &common))
                .with_capabilities(caps.report());
            Ok((doc, common.out, payload))
        }
        Action::Vertices {
            input,
            sampling,
            common,
        } => {
            let mut caps = capabilities(sampling.seed, !sampling.no_stats, common.geometry);
            let doc = vertices(&input, &sampling, &common, &mut caps)?;
            let payload = Payload::new("vertices", sampling_params(&input, &sampling, &common))
                .with_capabilities(caps.report());
            Ok((doc, common.out, payload))
        }
        Action::Resolve {
            input,
            edge,
            target,
            common,
        } => {
            let caps = capabilities(0, false, common.geometry);
            let doc = resolve(&input, edge, target, &common.unit, &caps)?;
            let payload = Payload::new(
                "resolve",
                json!({"input": input, "edge": edge, "target": target, "unit": common.unit}),
            )
            .with_capabilities(caps.report());
            Ok((doc, common.out, payload))
        }
        Action::Report => {
            let caps = Capabilities::seeded(0);
            let doc = json!({
                "version": boundary::VERSION,
                "code_rev": provenance::current_git_rev(),
                "capabilities": caps.report(),
            });
            Ok((doc, None, Payload::new("report", json!({}))))
        }
    }
}

fn sampling_params(input: &Path, sampling: &SamplingArgs, common: &CommonArgs) -> Value {
    json!({
        "input": input,
        "unit": common.unit,
        "closure_tol": common.closure_tol,
        "samples": sampling.samples,
        "seed": sampling.seed,
        "stats": !sampling.no_stats,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

fn analyze(
    input: &Path,
    expected: Option<&Path>,
    common: &CommonArgs,
    caps: &Capabilities,
) -> Result<Value> {
    let verts: Vec<Vertex> = read_json(input)?;
    tracing::info!(input = %input.display(), vertices = verts.len(), "analyze");
    let cfg = common.boundary_cfg();
    let analysis = match expected {
        Some(path) => {
            let lengths: Vec<f64> = read_json(path)?;
            analyze_boundary_with_verification(&verts, &lengths, &common.unit, &cfg, caps)
        }
        None => analyze_boundary(&verts, &common.unit, &cfg, caps),
    }
    .context("analyzing boundary")?;
    Ok(serde_json::to_value(analysis)?)
}

fn uncertain(
    input: &Path,
    sampling: &SamplingArgs,
    common: &CommonArgs,
    caps: &mut Capabilities,
) -> Result<Value> {
    let edges: Vec<EdgeInput> = read_json(input)?;
    tracing::info!(input = %input.display(), edges = edges.len(), samples = sampling.samples, "uncertain");
    let analysis = analyze_edges_with_uncertainty(
        &edges,
        &common.unit,
        &McCfg::with_samples(sampling.samples),
        &common.boundary_cfg(),
        caps,
    )
    .context("propagating edge ranges")?;
    Ok(serde_json::to_value(analysis)?)
}

fn vertices(
    input: &Path,
    sampling: &SamplingArgs,
    common: &CommonArgs,
    caps: &mut Capabilities,
) -> Result<Value> {
    let verts: Vec<UncertainVertex> = read_json(input)?;
    tracing::info!(input = %input.display(), vertices = verts.len(), samples = sampling.samples, "vertices");
    let analysis = analyze_vertices_with_uncertainty(
        &verts,
        &common.unit,
        &McCfg::with_samples(sampling.samples),
        &common.boundary_cfg(),
        caps,
    )
    .context("propagating coordinate ranges")?;
    Ok(serde_json::to_value(analysis)?)
}

fn resolve(input: &Path, edge: usize, target: f64, unit: &str, caps: &Capabilities) -> Result<Value> {
    let edges: Vec<EdgeInput> = read_json(input)?;
    let ranges = edge_ranges(&edges, unit).context("reading edge lengths")?;
    let resolution = resolve_edge(&ranges, edge, target, caps)
        .with_context(|| format!("resolving edge {edge}"))?;
    let name = edges[edge].display_name(edge);
    tracing::info!(
        edge = %name,
        value = resolution.optimized.optimized_value,
        success = resolution.optimized.success,
        "resolved"
    );
    Ok(json!({
        "edge_name": name,
        "unit": unit,
        "resolution": resolution,
    }))
}

fn emit<T: Serialize>(doc: &T, out: Option<&Path>, payload: Payload) -> Result<()> {
    let text = serde_json::to_string_pretty(doc)?;
    let Some(out) = out else {
        println!("{text}");
        return Ok(());
    };
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    fs::write(out, text).with_context(|| format!("writing {}", out.display()))?;
    let sidecar = provenance::write_sidecar(out, payload)?;
    tracing::info!(out = %out.display(), provenance = %sidecar.display(), "wrote analysis");
    Ok(())
}
