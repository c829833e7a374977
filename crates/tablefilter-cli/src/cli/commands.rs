use super::render::{render, Completion, Report};
use super::setup::{Assignment, Cli};
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::fs;
use tablefilter::{
    Choice, ColumnType, CustomChoice, FilterCoordinator, FilterSettings, MemTable, MemView,
    RowView, TableModel, Value,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match &cli.settings {
        Some(path) => FilterSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => FilterSettings::default(),
    };
    let raw = fs::read_to_string(&cli.table)
        .with_context(|| format!("reading {}", cli.table.display()))?;
    let json: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", cli.table.display()))?;
    let table = MemTable::from_json(&json)?;
    debug!(
        rows = table.row_count(),
        columns = table.column_count(),
        "table loaded"
    );

    let filters = resolve_filters(&cli, &table, &settings)?;
    let choice_columns = cli
        .choices
        .iter()
        .map(|name| column_of(&table, name))
        .collect::<Result<Vec<_>>>()?;
    let completions = cli
        .complete
        .iter()
        .map(|a| -> Result<(usize, String)> {
            Ok((column_of(&table, &a.column)?, a.text.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    let table = table.into_shared();
    let view = MemView::new(table.clone()).into_shared();
    let coordinator = FilterCoordinator::new(table.clone(), view.clone(), settings.clone())?;
    {
        let _guard = coordinator.suppress_notifications();
        for (column, choice) in filters {
            coordinator.apply_editor_filter(column, choice, false)?;
        }
    }
    coordinator.run_deferred();

    let model = table.borrow();
    let report = Report::build(
        &*model,
        &view.borrow().visible_rows(),
        coordinator.is_warning(),
        choice_columns
            .into_iter()
            .map(|column| -> Result<(String, Vec<Choice>)> {
                Ok((model.column_name(column), coordinator.choices(column)?))
            })
            .collect::<Result<Vec<_>>>()?,
        completions
            .into_iter()
            .map(|(column, text)| -> Result<Completion> {
                let found = coordinator.autocomplete(column, &Choice::from(text.as_str()))?;
                Ok(Completion {
                    column: model.column_name(column),
                    input: text,
                    completion: found.content.map(|choice| choice.to_string()),
                    exact: found.exact,
                })
            })
            .collect::<Result<Vec<_>>>()?,
        settings.max_visible_choices,
    );
    println!("{}", render(&report, cli.output)?);
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("TABLEFILTER_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn column_of(table: &MemTable, name: &str) -> Result<usize> {
    table
        .column_index(name)
        .ok_or_else(|| anyhow!("Unknown column '{}'", name))
}

/// Turns `--where` and `--pattern` arguments into editor contents.
fn resolve_filters(
    cli: &Cli,
    table: &MemTable,
    settings: &FilterSettings,
) -> Result<Vec<(usize, Choice)>> {
    let mut filters = Vec::new();
    for Assignment { column, text } in &cli.filters {
        let index = column_of(table, column)?;
        let choice = if *text == settings.match_empty_label {
            Choice::from(CustomChoice::match_empty(text.as_str()))
        } else {
            Choice::from(parse_value(&table.column_type(index), text))
        };
        filters.push((index, choice));
    }
    for Assignment { column, text } in &cli.pattern {
        let index = column_of(table, column)?;
        let custom = CustomChoice::pattern(text.as_str(), text)
            .with_context(|| format!("pattern for column '{}'", column))?;
        filters.push((index, Choice::from(custom)));
    }
    Ok(filters)
}

/// Reads command-line text as a value of the column's type, falling back to
/// text when it does not parse.
fn parse_value(kind: &ColumnType, text: &str) -> Value {
    let parsed = match kind {
        ColumnType::Bool => text.parse::<bool>().ok().map(Value::Bool),
        ColumnType::Int => text.parse::<i64>().ok().map(Value::Int),
        ColumnType::Float => text.parse::<f64>().ok().map(Value::Float),
        ColumnType::Text | ColumnType::Enum(_) => None,
    };
    parsed.unwrap_or_else(|| Value::from(text))
}
