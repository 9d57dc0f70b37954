//! Garden Planner session replay
//!
//! ```text
//! gp <script.ron> [--config <config.ron>] [--out <record.ron>]
//! ```
//!
//! Replays a recorded editing session headlessly and prints the committed
//! shape record as JSON.

mod script;

use std::path::PathBuf;

use gp_core::EditorConfig;

use crate::script::{Script, ScriptError};

const USAGE: &str = "gp <script.ron> [--config <config.ron>] [--out <record.ron>]";

/// Command-line arguments
#[derive(Debug, Default, PartialEq)]
struct Args {
    script: PathBuf,
    config: Option<PathBuf>,
    out: Option<PathBuf>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, ScriptError> {
        let mut parsed = Args::default();
        let mut script = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => parsed.config = Some(Self::value(&mut args, "--config")?),
                "--out" => parsed.out = Some(Self::value(&mut args, "--out")?),
                flag if flag.starts_with("--") => {
                    return Err(ScriptError::Usage(format!("unknown option {}", flag)));
                }
                _ if script.is_none() => script = Some(PathBuf::from(&arg)),
                _ => return Err(ScriptError::Usage(format!("unexpected argument {}", arg))),
            }
        }

        parsed.script = script.ok_or_else(|| ScriptError::Usage(USAGE.into()))?;
        Ok(parsed)
    }

    fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<PathBuf, ScriptError> {
        args.next()
            .map(PathBuf::from)
            .ok_or_else(|| ScriptError::Usage(format!("{} needs a path", flag)))
    }
}

fn main() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gp_editor=debug,gp_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), ScriptError> {
    let args = Args::parse(std::env::args().skip(1))?;
    let script = Script::load(&args.script)?;

    let config = match &args.config {
        Some(path) => EditorConfig::load(path)?,
        None => script.config.clone().unwrap_or_default(),
    };

    let outcome = script::run(&script, config)?;
    if let Some(area) = outcome.area {
        tracing::info!("{} area: {:.2} m²", script.kind, area);
    }

    let Some(record) = outcome.record else {
        tracing::warn!("Script ended without finishing a {}", script.kind);
        return Ok(());
    };

    if let Some(out) = &args.out {
        record.save(out)?;
        tracing::info!("Saved record to {}", out.display());
    }
    println!("{}", record.to_json()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ScriptError> {
        Args::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let args = parse(&["bed.ron", "--out", "bed.record.ron"]).unwrap();
        assert_eq!(args.script, PathBuf::from("bed.ron"));
        assert_eq!(args.out, Some(PathBuf::from("bed.record.ron")));
        assert_eq!(args.config, None);

        let args = parse(&["--config", "imperial.ron", "fence.ron"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("imperial.ron")));
        assert_eq!(args.script, PathBuf::from("fence.ron"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse(&[]), Err(ScriptError::Usage(_))));
        assert!(matches!(parse(&["a.ron", "b.ron"]), Err(ScriptError::Usage(_))));
        assert!(matches!(parse(&["a.ron", "--out"]), Err(ScriptError::Usage(_))));
        assert!(matches!(parse(&["a.ron", "--verbose"]), Err(ScriptError::Usage(_))));
    }
}
