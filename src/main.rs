//! dtanalyze CLI - Command-line interface
//!
//! Commands:
//!   analyze  - Check a decision table for impossible/duplicate/subsumed/conflicting rows
//!   schema   - Print JSON schema for an output type
//!   version  - Print version

use dtanalyze::logging::init_logging;
use dtanalyze::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "analyze" => cmd_analyze(&args[2..]),
        "schema" => cmd_schema(&args[2..]),
        "version" | "--version" | "-v" => {
            println!("dtanalyze {}", VERSION);
            Ok(true)
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(true)
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Err("Unknown command".into())
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn print_usage() {
    println!(
        r#"
dtanalyze - Decision table consistency analysis

USAGE:
    dtanalyze <COMMAND> [OPTIONS]

COMMANDS:
    analyze <table.yaml|json>        Report impossible, duplicate, subsumed and
                                     conflicting rows
    schema [report|config]           Print JSON schema for an output type
    version                          Print version

OPTIONS:
    --model <facts.yaml>             Fact model with field types and enumerations
                                     (without one, every field is free-format)
    --config <file>                  Configuration file (default: ./.dtanalyze.yaml)
    --json                           JSON output format

EXIT STATUS:
    0  no impossible or conflicting rows
    1  impossible or conflicting rows found
    2  error

EXAMPLES:
    dtanalyze analyze premiums.yaml --model facts.yaml
    dtanalyze analyze premiums.json --model facts.yaml --json
"#
    );
}

/// Returns `Ok(false)` when the table has errors
fn cmd_analyze(args: &[String]) -> Result<bool> {
    let Some(table_path) = args.first().filter(|a| !a.starts_with("--")) else {
        return Err(concat!(
            "Usage: dtanalyze analyze <table.yaml> ",
            "[--model <facts.yaml>] [--config <file>] [--json]"
        )
        .into());
    };
    let json_output = args.contains(&"--json".to_string());

    let config = load_config(option_value(args, "--config"))?;
    init_logging(&config.logging)?;

    let model = match option_value(args, "--model") {
        Some(path) => FactModel::load(&path)?,
        None => {
            tracing::warn!("no fact model given, all fields are free-format");
            FactModel::new()
        }
    };

    let doc = DecisionTable::load(Path::new(table_path))?;
    let analyses = Analyzer::with_config(&model, config).analyze(&doc.table, &doc.rows)?;
    let report = AnalysisReport::new(doc.table.name.clone(), analyses);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }

    Ok(!report.has_errors())
}

fn cmd_schema(args: &[String]) -> Result<bool> {
    let schema_name = args.first().map(|s| s.as_str()).unwrap_or("list");

    match schema_name {
        "list" => {
            println!("Available schemas: report, config");
            Ok(true)
        }
        "report" => print_schema::<AnalysisReport>(),
        "config" => print_schema::<AnalyzerConfig>(),
        _ => Err(format!("Unknown schema: {}", schema_name).into()),
    }
}

fn print_schema<T: schemars::JsonSchema>() -> Result<bool> {
    let schema = schemars::schema_for!(T);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(true)
}

/// Explicit `--config` path, else `.dtanalyze.yaml` in the working directory, else defaults
fn load_config(path: Option<PathBuf>) -> Result<AnalyzerConfig> {
    match path {
        Some(path) => AnalyzerConfig::load(&path),
        None => {
            let cwd = std::env::current_dir().map_err(Error::Io)?;
            Ok(AnalyzerConfig::load_from_dir(&cwd)?.unwrap_or_default())
        }
    }
}

fn option_value(args: &[String], flag: &str) -> Option<PathBuf> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}
