//! CLI Entry Point for daq-scan
//!
//! Builds a multi-axis scan from the command line and shows what it would
//! visit, without touching any hardware.
//!
//! # Usage
//!
//! Preview a 2D scan:
//! ```bash
//! daq-scan preview --axis x=0:20:10 --list y=100,200
//! ```
//!
//! Same scan, y outermost, snake traversal, as JSON:
//! ```bash
//! daq-scan preview --axis x=0:20:10 --list y=100,200 --order y,x --snake --json
//! ```
//!
//! List the orderings a selector would offer:
//! ```bash
//! daq-scan permutations x y z
//! ```

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use daq_scan::{
    config::ScanConfig, tracing_setup, AxisTransforms, LinearSubScan, Permutations,
    ScanCoordinateEngine, ScanError, SubScanProvider, TabularSubScan, TraversalMode,
};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::io::{self, BufWriter, Write as _};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Parser)]
#[command(name = "daq-scan")]
#[command(about = "Multi-axis scan builder", long_about = None)]
struct Cli {
    /// Configuration file (defaults to config/daq_scan.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a scan and print its steps
    Preview(PreviewArgs),

    /// Print every ordering of the given axis names
    Permutations {
        /// Axis names
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(Args)]
struct PreviewArgs {
    /// Linear axis as NAME=START:STOP:STEP (repeatable)
    #[arg(long = "axis", value_parser = parse_linear)]
    axes: Vec<LinearAxisArg>,

    /// Tabular axis as NAME=v1,v2,... (repeatable)
    #[arg(long = "list", value_parser = parse_list)]
    lists: Vec<ListAxisArg>,

    /// Axis order, outermost first
    #[arg(long, value_delimiter = ',')]
    order: Vec<String>,

    /// Walk the trajectory as a snake
    #[arg(long)]
    snake: bool,

    /// Randomize the visiting order of an axis (repeatable)
    #[arg(long)]
    randomize: Vec<String>,

    /// Visit an axis back and forth (repeatable)
    #[arg(long = "back-and-forth")]
    back_and_forth: Vec<String>,

    /// Rows to print (defaults to scan.table_preview_rows)
    #[arg(long)]
    rows: Option<usize>,

    /// Print the full scan summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone)]
struct LinearAxisArg {
    name: String,
    start: f64,
    stop: f64,
    step: f64,
}

#[derive(Debug, Clone)]
struct ListAxisArg {
    name: String,
    values: Vec<f64>,
}

fn split_name(arg: &str) -> Result<(&str, &str), String> {
    match arg.split_once('=') {
        Some((name, rest)) if !name.trim().is_empty() => Ok((name.trim(), rest)),
        _ => Err(format!("expected NAME=..., got '{}'", arg)),
    }
}

fn parse_number(text: &str) -> Result<f64, String> {
    text.trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid number '{}': {}", text, e))
}

fn parse_linear(arg: &str) -> Result<LinearAxisArg, String> {
    let (name, range) = split_name(arg)?;
    let parts: Vec<&str> = range.split(':').collect();
    let [start, stop, step] = parts.as_slice() else {
        return Err(format!("expected NAME=START:STOP:STEP, got '{}'", arg));
    };
    Ok(LinearAxisArg {
        name: name.to_string(),
        start: parse_number(start)?,
        stop: parse_number(stop)?,
        step: parse_number(step)?,
    })
}

fn parse_list(arg: &str) -> Result<ListAxisArg, String> {
    let (name, values) = split_name(arg)?;
    let values = values
        .split(',')
        .map(parse_number)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ListAxisArg {
        name: name.to_string(),
        values,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ScanConfig::load_from(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ScanConfig::load().context("loading configuration")?,
    };
    tracing_setup::init_from_config(&config)?;
    debug!(app = %config.application.name, "configuration loaded");

    match cli.command {
        Commands::Preview(args) => {
            print!("{}", render_preview(&args, &config)?);
            Ok(())
        }
        Commands::Permutations { names } => {
            let mut out = BufWriter::new(io::stdout().lock());
            write_permutations(&names, &mut out)?;
            out.flush()?;
            Ok(())
        }
    }
}

/// One ordering per line, streamed as they are generated.
fn write_permutations(names: &[String], out: &mut impl io::Write) -> Result<()> {
    let mut seen = HashSet::new();
    if let Some(dup) = names.iter().find(|n| !seen.insert(n.as_str())) {
        bail!("axis name '{}' given more than once", dup);
    }
    for ordering in Permutations::new(names) {
        writeln!(out, "{}", ordering.join(", "))?;
    }
    Ok(())
}

fn attach(
    engine: &mut ScanCoordinateEngine,
    name: &str,
    provider: Arc<dyn SubScanProvider>,
) -> Result<()> {
    if !engine.attach_actuator(name, provider)? {
        bail!("axis '{}' given more than once", name);
    }
    Ok(())
}

fn toggle(
    engine: &mut ScanCoordinateEngine,
    name: &str,
    update: impl Fn(&mut AxisTransforms),
) -> Result<()> {
    let mut transforms = engine
        .transforms(name)
        .ok_or_else(|| ScanError::UnknownAxis(name.to_string()))?;
    update(&mut transforms);
    engine.set_transforms(name, transforms)?;
    Ok(())
}

fn build_engine(args: &PreviewArgs, config: &ScanConfig) -> Result<ScanCoordinateEngine> {
    let mut engine = ScanCoordinateEngine::from_settings(&config.scan);

    for axis in &args.axes {
        let provider = LinearSubScan::from_step(axis.start, axis.stop, axis.step);
        attach(&mut engine, &axis.name, Arc::new(provider))?;
    }
    for list in &args.lists {
        let provider = TabularSubScan::new(list.values.clone());
        attach(&mut engine, &list.name, Arc::new(provider))?;
    }
    if engine.is_empty() {
        bail!("no axis given; use --axis NAME=START:STOP:STEP or --list NAME=v1,v2,...");
    }

    if !args.order.is_empty() {
        engine.set_order(args.order.clone())?;
    }
    if args.snake {
        engine.set_traversal(TraversalMode::Snake);
    }
    for name in &args.randomize {
        toggle(&mut engine, name, |t| t.randomize = true)?;
    }
    for name in &args.back_and_forth {
        toggle(&mut engine, name, |t| t.back_and_forth = true)?;
    }
    Ok(engine)
}

fn render_preview(args: &PreviewArgs, config: &ScanConfig) -> Result<String> {
    let engine = build_engine(args, config)?;
    let limit = config.scan.steps_limit;
    let mut out = String::new();

    if args.json {
        let info = engine.activate(limit)?;
        writeln!(out, "{}", serde_json::to_string_pretty(&info)?)?;
        return Ok(out);
    }

    engine.ensure_within_limit(limit)?;
    let total = engine.total_steps();
    writeln!(
        out,
        "{} scan, {} steps, shape {:?}, order [{}]",
        engine.scan_dim(),
        total,
        engine.scan_shape(),
        engine.order().join(", ")
    )?;

    let header: Vec<String> = engine
        .axis_labels()
        .iter()
        .map(|l| format!("{:>14}", l))
        .collect();
    writeln!(out, "{:>8} {}", "step", header.join(" "))?;

    let rows = args.rows.unwrap_or(config.scan.table_preview_rows);
    let preview = engine.preview(rows);
    for (step, coords) in &preview {
        let cells: Vec<String> = coords.iter().map(|v| format!("{:>14}", v)).collect();
        writeln!(out, "{:>8} {}", step, cells.join(" "))?;
    }
    if total > preview.len() {
        writeln!(out, "... {} more steps", total - preview.len())?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_linear() {
        let arg = parse_linear("x=0:20:10").unwrap();
        assert_eq!(arg.name, "x");
        assert_eq!((arg.start, arg.stop, arg.step), (0.0, 20.0, 10.0));

        assert!(parse_linear("x=0:20").is_err());
        assert!(parse_linear("=0:20:10").is_err());
        assert!(parse_linear("x=a:20:10").is_err());
    }

    #[test]
    fn test_parse_list() {
        let arg = parse_list("theta=3, -1.5,7").unwrap();
        assert_eq!(arg.name, "theta");
        assert_eq!(arg.values, vec![3.0, -1.5, 7.0]);
        assert!(parse_list("theta").is_err());
        assert!(parse_list("theta=1,,2").is_err());
    }

    #[test]
    fn test_cli_parses_preview() {
        let cli = Cli::try_parse_from([
            "daq-scan",
            "preview",
            "--axis",
            "x=0:20:10",
            "--list",
            "y=100,200",
            "--order",
            "y,x",
            "--snake",
            "--back-and-forth",
            "x",
        ])
        .unwrap();
        let Commands::Preview(args) = cli.command else {
            panic!("expected preview");
        };
        assert_eq!(args.order, vec!["y".to_string(), "x".to_string()]);

        let engine = build_engine(&args, &ScanConfig::default()).unwrap();
        assert_eq!(engine.order(), ["y".to_string(), "x".to_string()].as_slice());
        assert_eq!(engine.traversal(), TraversalMode::Snake);
        assert!(engine.transforms("x").unwrap().back_and_forth);
        assert_eq!(engine.total_steps(), 6);
    }

    fn preview_args(argv: &[&str]) -> PreviewArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        let Commands::Preview(args) = cli.command else {
            panic!("expected preview");
        };
        args
    }

    #[test]
    fn test_preview_refuses_scan_over_limit() {
        let mut config = ScanConfig::default();
        config.scan.steps_limit = 5;

        for argv in [
            &["daq-scan", "preview", "--axis", "x=0:20:10", "--list", "y=1,2"][..],
            &["daq-scan", "preview", "--axis", "x=0:20:10", "--list", "y=1,2", "--json"][..],
        ] {
            let err = render_preview(&preview_args(argv), &config).unwrap_err();
            let scan_err = err.downcast_ref::<ScanError>().unwrap();
            assert!(matches!(
                scan_err,
                ScanError::StepLimitExceeded { total: 6, limit: 5 }
            ));
        }

        config.scan.steps_limit = 6;
        let args = preview_args(&["daq-scan", "preview", "--axis", "x=0:20:10", "--list", "y=1,2"]);
        let table = render_preview(&args, &config).unwrap();
        assert!(table.starts_with("2D scan, 6 steps, shape [3, 2], order [x, y]"));
        assert_eq!(table.lines().count(), 8);
    }

    #[test]
    fn test_preview_row_cap_and_json() {
        let config = ScanConfig::default();
        let args = preview_args(&["daq-scan", "preview", "--list", "y=1,2,3", "--rows", "2"]);
        let table = render_preview(&args, &config).unwrap();
        assert!(table.ends_with("... 1 more steps\n"));

        let args = preview_args(&["daq-scan", "preview", "--list", "y=1,2,3", "--json"]);
        let json: serde_json::Value =
            serde_json::from_str(&render_preview(&args, &config).unwrap()).unwrap();
        assert_eq!(json["n_steps"], 3);
        assert_eq!(json["selected_actuators"][0], "y");
    }

    #[test]
    fn test_permutations_streamed_and_duplicates_rejected() {
        let names: Vec<String> = ["x", "y", "z"].iter().map(|s| s.to_string()).collect();
        let mut out = Vec::new();
        write_permutations(&names, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 6);
        assert_eq!(text.lines().next(), Some("x, y, z"));
        assert_eq!(text.lines().last(), Some("z, y, x"));

        let names: Vec<String> = ["x", "y", "x"].iter().map(|s| s.to_string()).collect();
        let mut out = Vec::new();
        let err = write_permutations(&names, &mut out).unwrap_err();
        assert!(err.to_string().contains("'x' given more than once"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_duplicate_and_unknown_axes_rejected() {
        let cli = Cli::try_parse_from([
            "daq-scan", "preview", "--axis", "x=0:2:1", "--list", "x=1,2",
        ])
        .unwrap();
        let Commands::Preview(args) = cli.command else {
            panic!("expected preview");
        };
        assert!(build_engine(&args, &ScanConfig::default()).is_err());

        let cli = Cli::try_parse_from([
            "daq-scan", "preview", "--axis", "x=0:2:1", "--randomize", "z",
        ])
        .unwrap();
        let Commands::Preview(args) = cli.command else {
            panic!("expected preview");
        };
        assert!(build_engine(&args, &ScanConfig::default()).is_err());
    }
}
