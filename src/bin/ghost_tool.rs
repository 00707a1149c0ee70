use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use rustmemodb_ghosts::{FieldValues, GhostOptions, InMemoryDB, Query, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ghost-tool")]
#[command(about = "Inspect ghost ranges over a JSON fixture database")]
struct Cli {
    /// Fixture file describing tables, indexes, rows and ghost keys
    #[arg(long)]
    fixture: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Materialize a closed key range
    Range {
        #[command(flatten)]
        scope: Scope,
        #[arg(long)]
        from: i64,
        #[arg(long)]
        to: i64,
    },
    /// Take the first N elements of the unbounded sequence
    Take {
        #[command(flatten)]
        scope: Scope,
        #[arg(long)]
        count: usize,
        #[arg(long)]
        from: Option<i64>,
        #[arg(long, default_value_t = rustmemodb_ghosts::ghosts::DEFAULT_WINDOW_SIZE)]
        batch_size: usize,
    },
}

#[derive(Args)]
struct Scope {
    #[arg(long)]
    table: String,
    /// Equality condition, `field=value`; repeatable
    #[arg(long = "where")]
    conditions: Vec<String>,
    /// Placeholder default, `field=value`; repeatable
    #[arg(long = "default")]
    defaults: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let db = InMemoryDB::load_fixture(&cli.fixture)
        .with_context(|| format!("Failed to load fixture '{}'", cli.fixture.display()))?;

    match cli.command {
        Command::Range { scope, from, to } => {
            let options = GhostOptions::new().range(from..=to);
            run(&db, &scope, options, usize::MAX)
        }
        Command::Take {
            scope,
            count,
            from,
            batch_size,
        } => {
            let mut options = GhostOptions::new().batch_size(batch_size);
            if let Some(from) = from {
                options = options.from_key(from);
            }
            run(&db, &scope, options, count)
        }
    }
}

fn run(db: &InMemoryDB, scope: &Scope, options: GhostOptions, limit: usize) -> Result<()> {
    let model = db.ghost_model(&scope.table)?;
    if let Some(advisory) = model.advisory() {
        eprintln!("{}", advisory);
    }

    let query = parse_assignments(&scope.conditions)?
        .into_iter()
        .fold(Query::all(scope.table.as_str()), |query, (field, value)| query.filter(field, value));
    let options = options.with_defaults(parse_assignments(&scope.defaults)?);

    let records = db.ghosts_in(&query, &options)?.take(limit)?;
    for record in &records {
        println!("{}", record);
    }

    let ghosts = records.iter().filter(|r| r.is_ghost()).count();
    eprintln!("{} record(s), {} ghost(s)", records.len(), ghosts);
    Ok(())
}

/// Parses `field=value` pairs. Values are read as JSON scalars, falling back
/// to plain text: `level=3`, `completed=true`, `name=Alice`.
fn parse_assignments(input: &[String]) -> Result<FieldValues> {
    let mut fields = FieldValues::new();

    for part in input {
        let (name, raw) = part
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid assignment '{}'. Expected format: field=value", part))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(anyhow!("Invalid assignment '{}': empty field name", part));
        }
        let value = serde_json::from_str::<Value>(raw.trim())
            .unwrap_or_else(|_| Value::Text(raw.trim().to_string()));
        fields.insert(name.to_string(), value);
    }

    Ok(fields)
}
