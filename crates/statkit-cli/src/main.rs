mod config;
mod solver;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

use statkit_core::formula::{self, related, FormulaSpec};
use statkit_core::reference::{self, ALL_CATEGORIES};
use statkit_core::solver::failure_message;
use statkit_core::{
    count_valid_numbers, evaluate, InputKind, InputValues, PreferenceStore, StatError,
};
use statkit_store::SqliteStore;

use crate::config::Config;
use crate::solver::UreqTransport;

#[derive(Parser)]
#[command(
    name = "statkit",
    version,
    about = "Statistics calculators, reference sheets and a tutoring proxy"
)]
struct Cli {
    /// Path to the preferences database
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available calculators
    Formulas,

    /// Describe one calculator and its inputs
    Formula {
        /// Formula id (e.g. mean, std-dev, z-score)
        id: String,
    },

    /// Run a calculator
    Calc {
        /// Formula id
        id: String,

        /// Input value as key=value (repeatable)
        #[arg(short, long = "input", value_parser = parse_key_val)]
        inputs: Vec<(String, String)>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Browse the symbol reference
    Symbols {
        /// Filter by symbol, name or description
        #[arg(short, long)]
        search: Option<String>,

        /// Restrict to one category
        #[arg(short, long, default_value = ALL_CATEGORIES)]
        category: String,

        /// Only show favorites
        #[arg(short, long)]
        favorites: bool,
    },

    /// Print the formula sheet
    Sheet,

    /// Toggle a symbol in the favorites list
    Favorite {
        /// Symbol as shown by `statkit symbols`
        symbol: String,
    },

    /// Ask the tutor to solve a problem step by step
    Solve {
        /// Problem text
        problem: String,

        /// Call the provider directly instead of the gateway
        #[arg(long)]
        direct: bool,
    },

    /// Show or clear solved problems
    History {
        /// Remove all history entries
        #[arg(long)]
        clear: bool,
    },

    /// Manage the locally cached API key
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },

    /// Show the active configuration
    Config,

    /// Run the completion gateway and static file server
    Serve {
        /// Address to listen on
        #[arg(long)]
        bind: Option<String>,

        /// Serve static files from this directory
        #[arg(long)]
        assets_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum KeyCommands {
    /// Store a key (prompts when not given)
    Set { key: Option<String> },
    /// Forget the stored key
    Clear,
}

fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{s}`"))?;
    Ok((key.trim().to_string(), value.to_string()))
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("dev", "statkit", "statkit")
        .map(|dirs| dirs.data_dir().join("prefs.db"))
        .unwrap_or_else(|| PathBuf::from("prefs.db"))
}

fn open_store(db: Option<PathBuf>, cfg: &Config) -> Result<SqliteStore> {
    let path = db
        .or_else(|| cfg.store.path.as_ref().map(PathBuf::from))
        .unwrap_or_else(default_db_path);
    SqliteStore::new(&path).context("failed to open database")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Commands::Serve { .. } => LevelFilter::INFO,
        _ => LevelFilter::WARN,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .init();

    let cfg = config::load_config()?;

    match cli.command {
        Commands::Formulas => cmd_formulas(),
        Commands::Formula { id } => cmd_formula(&id),
        Commands::Calc { id, inputs, json } => cmd_calc(&id, inputs, json),
        Commands::Symbols {
            search,
            category,
            favorites,
        } => {
            let store = if favorites {
                Some(open_store(cli.db, &cfg)?)
            } else {
                None
            };
            cmd_symbols(search.as_deref(), &category, store.as_ref())
        }
        Commands::Sheet => cmd_sheet(),
        Commands::Favorite { symbol } => cmd_favorite(&open_store(cli.db, &cfg)?, &symbol),
        Commands::Solve { problem, direct } => {
            cmd_solve(&open_store(cli.db, &cfg)?, &cfg, &problem, direct)
        }
        Commands::History { clear } => cmd_history(&open_store(cli.db, &cfg)?, clear),
        Commands::Key { command } => cmd_key(&open_store(cli.db, &cfg)?, command),
        Commands::Config => cmd_config(&cfg),
        Commands::Serve { bind, assets_dir } => cmd_serve(cfg, bind, assets_dir),
    }
}

// ---------------------------------------------------------------------------
// Calculators
// ---------------------------------------------------------------------------

fn cmd_formulas() -> Result<()> {
    println!("{:<22} {:<28} Symbol", "Id", "Name");
    println!("{}", "-".repeat(60));
    for spec in formula::registry() {
        println!(
            "{:<22} {:<28} {}",
            spec.id.as_str(),
            spec.display_name,
            spec.symbol
        );
    }
    Ok(())
}

fn cmd_formula(id: &str) -> Result<()> {
    let spec = formula::lookup(id)?;
    println!("{} ({})", spec.display_name, spec.symbol);
    println!("  {}", spec.formula_expression);
    println!("  {}", spec.description);
    println!();
    println!("Inputs:");
    for step in spec.inputs {
        let kind = match step.kind {
            InputKind::NumberList => "list of numbers".to_string(),
            InputKind::Number => "number".to_string(),
            InputKind::EnumSelect(_) => format!("one of {}", step.option_values().join(", ")),
        };
        println!("  {:<18} {} [{kind}]", step.id, step.label);
        if let Some(hint) = step.hint {
            println!("  {:<18} {hint}", "");
        }
        if let Some(example) = step.example {
            println!("  {:<18} e.g. {example}", "");
        }
    }
    let others: Vec<&str> = related(spec.id, 3).iter().map(|f| f.id.as_str()).collect();
    if !others.is_empty() {
        println!();
        println!("Related: {}", others.join(", "));
    }
    Ok(())
}

fn cmd_calc(id: &str, inputs: Vec<(String, String)>, json: bool) -> Result<()> {
    let values: InputValues = inputs.into_iter().collect();
    let spec = formula::lookup(id)?;
    for hint in list_hints(spec, &values) {
        // Keep stdout parseable in JSON mode.
        if json {
            eprintln!("{hint}");
        } else {
            println!("{hint}");
        }
    }

    let result = evaluate(id, &values)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    for step in &result.derivation_steps {
        println!("{:<26} {}", step.label, step.value);
    }
    println!();
    println!("Result: {}", result.final_value);
    Ok(())
}

/// One "Detected N valid numbers" line per number list the user filled in.
fn list_hints(spec: &FormulaSpec, values: &InputValues) -> Vec<String> {
    spec.inputs
        .iter()
        .filter(|step| matches!(step.kind, InputKind::NumberList))
        .filter_map(|step| values.get(step.id))
        .map(|raw| format!("Detected {} valid numbers", count_valid_numbers(raw)))
        .collect()
}

// ---------------------------------------------------------------------------
// Reference
// ---------------------------------------------------------------------------

fn cmd_symbols(search: Option<&str>, category: &str, store: Option<&SqliteStore>) -> Result<()> {
    if !reference::categories().iter().any(|c| *c == category) {
        bail!(
            "unknown category `{category}` (expected one of: {})",
            reference::categories().join(", ")
        );
    }
    let mut entries = reference::search(search.unwrap_or(""), category);
    let favorites = match store {
        Some(s) => s.favorites()?,
        None => Vec::new(),
    };
    if store.is_some() {
        entries.retain(|e| favorites.iter().any(|f| f.as_str() == e.symbol));
    }

    if entries.is_empty() {
        println!("No symbols found.");
        return Ok(());
    }
    for entry in entries {
        println!("{:<8} {} [{}]", entry.symbol, entry.name, entry.category);
        println!("         {}", entry.description);
        if let Some(f) = entry.formula {
            println!("         {f}");
        }
    }
    Ok(())
}

fn cmd_sheet() -> Result<()> {
    for section in reference::formula_sheet() {
        println!("== {} ==", section.category);
        for item in section.items {
            println!("{}", item.name);
            println!("  {}", item.formula);
            println!("  {}", item.explanation);
            println!("  Example: {}", item.example);
            if let Some(id) = item.calculator {
                println!("  Try it: statkit calc {id}");
            }
        }
        println!();
    }
    Ok(())
}

fn cmd_favorite(store: &SqliteStore, symbol: &str) -> Result<()> {
    if reference::symbol(symbol).is_none() {
        bail!("unknown symbol `{symbol}`; see `statkit symbols`");
    }
    if store.toggle_favorite(symbol)? {
        println!("Added {symbol} to favorites.");
    } else {
        println!("Removed {symbol} from favorites.");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

fn cmd_solve(store: &SqliteStore, cfg: &Config, problem: &str, direct: bool) -> Result<()> {
    let outcome = solver::route(&cfg.solver, direct, store).and_then(|route| {
        let transport = UreqTransport::new(Duration::from_secs(cfg.solver.timeout_secs));
        solver::solve(problem, &route, cfg.solver.model(), &transport, store)
    });
    match outcome {
        Ok(solution) => {
            println!("{solution}");
            Ok(())
        }
        Err(StatError::Config(msg)) => bail!(msg),
        Err(e) => bail!(failure_message(&e)),
    }
}

fn cmd_history(store: &SqliteStore, clear: bool) -> Result<()> {
    if clear {
        store.clear_history()?;
        println!("History cleared.");
        return Ok(());
    }
    let history = store.history()?;
    if history.is_empty() {
        println!("No solved problems yet.");
        return Ok(());
    }
    for entry in &history {
        println!("[{}] {}", entry.timestamp.format("%Y-%m-%d %H:%M"), entry.problem);
        for line in entry.solution.lines() {
            println!("    {line}");
        }
        println!();
    }
    Ok(())
}

fn cmd_key(store: &SqliteStore, command: KeyCommands) -> Result<()> {
    match command {
        KeyCommands::Set { key } => {
            let key = match key {
                Some(k) => k,
                None => rpassword::prompt_password_stdout("Grok API key: ")
                    .context("failed to read key")?,
            };
            let key = key.trim();
            if key.is_empty() {
                bail!("empty key, nothing stored");
            }
            store.set_cached_api_key(key)?;
            println!("API key saved.");
        }
        KeyCommands::Clear => {
            store.clear_cached_api_key()?;
            println!("API key removed.");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config / gateway
// ---------------------------------------------------------------------------

fn cmd_config(cfg: &Config) -> Result<()> {
    println!("Config: {}", config::show_config_path());
    println!();
    println!("[store]");
    println!(
        "  path = {}",
        cfg.store
            .path
            .as_deref()
            .unwrap_or("(default platform path)")
    );
    println!();
    println!("[gateway]");
    println!("  bind = {}", cfg.gateway.bind);
    println!("  completion_path = {}", cfg.gateway.completion_path);
    println!("  timeout_secs = {}", cfg.gateway.timeout_secs);
    match &cfg.gateway.assets_dir {
        Some(dir) => println!("  assets_dir = {}", dir.display()),
        None => println!("  assets_dir = (embedded)"),
    }
    match cfg.gateway.resolve() {
        Ok(up) => {
            println!("  endpoint = {}", up.endpoint);
            println!("  model = {}", up.model);
            println!("  api_key = (set)");
        }
        Err(_) => println!("  api_key = (not set)"),
    }
    println!();
    println!("[solver]");
    println!("  mode = {}", cfg.solver.mode);
    println!("  proxy_url = {}", cfg.solver.proxy_url);
    println!("  endpoint = {}", cfg.solver.endpoint());
    println!("  model = {}", cfg.solver.model());
    let key_state = if cfg.solver.api_key.is_some() {
        "(set)"
    } else {
        "(not set)"
    };
    println!("  api_key = {key_state}");
    Ok(())
}

fn cmd_serve(cfg: Config, bind: Option<String>, assets_dir: Option<PathBuf>) -> Result<()> {
    let mut gateway = cfg.gateway;
    if let Some(bind) = bind {
        gateway.bind = bind;
    }
    if assets_dir.is_some() {
        gateway.assets_dir = assets_dir;
    }
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime
        .block_on(statkit_gateway::serve(gateway))
        .context("gateway stopped with an error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use statkit_core::FormulaId;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("values=1, 2, 3").unwrap(),
            ("values".to_string(), "1, 2, 3".to_string())
        );
        assert_eq!(
            parse_key_val("expr=a=b").unwrap(),
            ("expr".to_string(), "a=b".to_string())
        );
        assert!(parse_key_val("novalue").is_err());
    }

    #[test]
    fn test_cli_parses_calc() {
        let cli = Cli::try_parse_from([
            "statkit", "calc", "z-score", "-i", "value=85", "-i", "mean=75", "-i", "stdDev=10",
        ])
        .unwrap();
        match cli.command {
            Commands::Calc { id, inputs, json } => {
                assert_eq!(id, "z-score");
                assert_eq!(inputs.len(), 3);
                assert!(!json);
            }
            _ => panic!("expected calc"),
        }
    }

    #[test]
    fn test_cli_parses_serve_and_key() {
        let cli = Cli::try_parse_from(["statkit", "serve", "--bind", "0.0.0.0:80"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { bind: Some(_), .. }));

        let cli = Cli::try_parse_from(["statkit", "key", "clear"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Key {
                command: KeyCommands::Clear
            }
        ));
    }

    #[test]
    fn test_list_hints_count_valid_numbers() {
        let spec = formula::lookup("std-dev").unwrap();
        let values = InputValues::new()
            .with("values", "2, 4, abc, 9")
            .with("type", "sample");
        assert_eq!(list_hints(spec, &values), vec!["Detected 3 valid numbers"]);

        assert!(list_hints(spec, &InputValues::new()).is_empty());
        let z = formula::lookup("z-score").unwrap();
        assert!(list_hints(z, &InputValues::new().with("value", "1")).is_empty());
    }

    #[test]
    fn test_sheet_calculators_resolve() {
        for section in reference::formula_sheet() {
            for item in section.items {
                if let Some(id) = item.calculator {
                    assert!(formula::lookup(id.as_str()).is_ok());
                    assert!(FormulaId::ALL.contains(&id));
                }
            }
        }
    }
}
