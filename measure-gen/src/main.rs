//! Measure catalog generator
//!
//! Compiles unit declarations into the operation catalog and writes it as
//! JSON to stdout, for a code emitter to render.
//!
//! Declarations come from, in order of precedence:
//! - the first command-line argument (a JSON file)
//! - the `MEASURE_DECLARATIONS` environment variable (a JSON file)
//! - the built-in standard set
//!
//! Logs go to stderr; the level follows `RUST_LOG` (default info).

use std::env;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use measure_core::CatalogError;
use measure_units::{compile, Declarations, OperationCatalog};

const DECLARATIONS_VAR: &str = "MEASURE_DECLARATIONS";
const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Error)]
enum GenError {
    #[error("cannot read declarations from {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid declarations in {}: {source}", .path.display())]
    Parse { path: PathBuf, source: serde_json::Error },

    #[error("[{code}] {0}", code = .0.code())]
    Catalog(#[from] CatalogError),

    #[error("cannot write catalog: {0}")]
    Write(#[from] io::Error),

    #[error("cannot serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Where the declarations come from
#[derive(Debug, Clone, PartialEq)]
enum Source {
    Argument(PathBuf),
    Environment(PathBuf),
    Standard,
}

impl Source {
    fn resolve(argument: Option<String>, environment: Option<String>) -> Source {
        match (argument, environment) {
            (Some(path), _) => Source::Argument(PathBuf::from(path)),
            (None, Some(path)) if !path.is_empty() => Source::Environment(PathBuf::from(path)),
            _ => Source::Standard,
        }
    }

    fn load(&self) -> Result<Declarations, GenError> {
        match self {
            Source::Argument(path) | Source::Environment(path) => load_file(path),
            Source::Standard => Ok(Declarations::standard()),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Argument(path) => write!(f, "{}", path.display()),
            Source::Environment(path) => {
                write!(f, "{} (from {})", path.display(), DECLARATIONS_VAR)
            }
            Source::Standard => write!(f, "standard"),
        }
    }
}

fn load_file(path: &Path) -> Result<Declarations, GenError> {
    let content = fs::read_to_string(path)
        .map_err(|source| GenError::Read { path: path.to_path_buf(), source })?;
    serde_json::from_str(&content)
        .map_err(|source| GenError::Parse { path: path.to_path_buf(), source })
}

/// Document written to stdout
#[derive(Serialize)]
struct Report<'a> {
    generator: &'static str,
    source: String,
    units: usize,
    operations: usize,
    catalog: &'a OperationCatalog,
}

fn run(source: &Source, out: &mut impl Write) -> Result<(), GenError> {
    let declarations = source.load()?;
    let catalog = compile(&declarations)?;
    info!(units = catalog.len(), operations = catalog.operation_count(), "compiled catalog");

    let report = Report {
        generator: GENERATOR_VERSION,
        source: source.to_string(),
        units: catalog.len(),
        operations: catalog.operation_count(),
        catalog: &catalog,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn init_logging() {
    let level = env::var("RUST_LOG")
        .ok()
        .and_then(|v| v.parse::<Level>().ok())
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

fn main() -> ExitCode {
    init_logging();

    let source = Source::resolve(env::args().nth(1), env::var(DECLARATIONS_VAR).ok());
    info!(version = GENERATOR_VERSION, %source, "measure-gen started");

    let stdout = io::stdout();
    match run(&source, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("measure-gen-{}-{}", std::process::id(), name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_source_precedence() {
        let arg = Some("a.json".to_string());
        let var = Some("b.json".to_string());
        assert_eq!(Source::resolve(arg.clone(), var.clone()), Source::Argument(PathBuf::from("a.json")));
        assert_eq!(Source::resolve(None, var), Source::Environment(PathBuf::from("b.json")));
        assert_eq!(Source::resolve(None, Some(String::new())), Source::Standard);
        assert_eq!(Source::resolve(None, None), Source::Standard);
    }

    #[test]
    fn test_run_standard() {
        let mut out = Vec::new();
        run(&Source::Standard, &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["source"], "standard");
        assert_eq!(json["units"], 196);
        assert!(json["catalog"]["units"].is_object());
    }

    #[test]
    fn test_run_from_file() {
        let declarations = serde_json::to_string(&Declarations::standard()).unwrap();
        let path = temp_file("standard.json", &declarations);
        let mut out = Vec::new();
        run(&Source::Argument(path.clone()), &mut out).unwrap();
        fs::remove_file(&path).ok();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["units"], 196);
    }

    #[test]
    fn test_missing_file() {
        let path = PathBuf::from("/nonexistent/measure/declarations.json");
        let err = run(&Source::Argument(path), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, GenError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/measure/declarations.json"));
    }

    #[test]
    fn test_malformed_file() {
        let path = temp_file("malformed.json", r#"{"dimensions": [{"dimension": "weight"}]}"#);
        let err = run(&Source::Environment(path.clone()), &mut Vec::new()).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(matches!(err, GenError::Parse { .. }));
    }

    #[test]
    fn test_catalog_error_carries_code() {
        let path = temp_file("nobase.json", r#"{
            "dimensions": [{
                "dimension": "time",
                "components": [{
                    "dimension": "time", "name": "Min", "plural": "Mins",
                    "abbreviation": "min", "factor_to_base": 60.0
                }]
            }]
        }"#);
        let err = run(&Source::Argument(path.clone()), &mut Vec::new()).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(err.to_string().starts_with("[NO_BASE_COMPONENT]"), "{}", err);
    }
}
