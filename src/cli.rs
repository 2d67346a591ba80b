use crate::config::{RankDir, load_config};
use crate::dump::DiagramDump;
use crate::model::parse_model;
use crate::pipeline::build_canvas;
use crate::sketch::LineType;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "schema-canvas",
    version,
    about = "Lay out a data model and sketch its association lines"
)]
pub struct Args {
    /// Input model file (.json/.json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the diagram JSON. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON file (layout, sketch and canvas sections)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Line style, overrides the config file
    #[arg(long = "line", value_enum)]
    pub line: Option<LineArg>,

    /// Rank direction, overrides the config file
    #[arg(long = "rankdir", value_enum)]
    pub rankdir: Option<RankDirArg>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum LineArg {
    Linear,
    Rectilinear,
}

impl From<LineArg> for LineType {
    fn from(arg: LineArg) -> Self {
        match arg {
            LineArg::Linear => LineType::Linear,
            LineArg::Rectilinear => LineType::Rectilinear,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum RankDirArg {
    Tb,
    Bt,
    Lr,
    Rl,
}

impl From<RankDirArg> for RankDir {
    fn from(arg: RankDirArg) -> Self {
        match arg {
            RankDirArg::Tb => RankDir::Tb,
            RankDirArg::Bt => RankDir::Bt,
            RankDirArg::Lr => RankDir::Lr,
            RankDirArg::Rl => RankDir::Rl,
        }
    }
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(line) = args.line {
        config.sketch.line_type = line.into();
    }
    if let Some(rankdir) = args.rankdir {
        config.layout.rankdir = rankdir.into();
    }

    let input = read_input(args.input.as_deref())?;
    let model = parse_model(&input)?;
    let snapshot = build_canvas(&model, &config)?;
    tracing::debug!(
        nodes = snapshot.diagram.nodes().count(),
        edges = snapshot.diagram.edges().len(),
        width = snapshot.canvas.width,
        height = snapshot.canvas.height,
        "diagram built"
    );
    write_output(&snapshot.dump(), args.output.as_deref())
}

/// Logs go to stderr so stdout stays parseable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_output(dump: &DiagramDump, output: Option<&Path>) -> Result<()> {
    let json = dump.to_json()?;
    match output {
        Some(path) => std::fs::write(path, json)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
