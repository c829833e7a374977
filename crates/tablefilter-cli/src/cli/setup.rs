use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    #[default]
    Text,
    Json,
}

/// A `column=text` pair given on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub column: String,
    pub text: String,
}

fn parse_assignment(raw: &str) -> Result<Assignment, String> {
    let (column, text) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=TEXT, got '{}'", raw))?;
    if column.is_empty() {
        return Err(format!("missing column name in '{}'", raw));
    }
    Ok(Assignment {
        column: column.to_string(),
        text: text.to_string(),
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "tablefilter",
    bin_name = "tablefilter",
    version,
    about = "Filter the rows of a JSON table by column",
    long_about = None
)]
pub struct Cli {
    /// JSON file holding an array of row objects
    pub table: PathBuf,

    /// Keep rows whose column equals the value (the empty-match label selects empty cells)
    #[arg(short = 'w', long = "where", value_name = "COLUMN=VALUE", value_parser = parse_assignment)]
    pub filters: Vec<Assignment>,

    /// Keep rows whose column fully matches the regular expression
    #[arg(short, long, value_name = "COLUMN=REGEX", value_parser = parse_assignment)]
    pub pattern: Vec<Assignment>,

    /// Print the choices offered for a column
    #[arg(short, long, value_name = "COLUMN")]
    pub choices: Vec<String>,

    /// Complete partial input for a column
    #[arg(long, value_name = "COLUMN=TEXT", value_parser = parse_assignment)]
    pub complete: Vec<Assignment>,

    /// TOML settings file
    #[arg(short, long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputMode::Text)]
    pub output: OutputMode,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_split_on_the_first_equals() {
        let parsed = parse_assignment("expr=a=b").unwrap();
        assert_eq!(parsed.column, "expr");
        assert_eq!(parsed.text, "a=b");
    }

    #[test]
    fn assignments_need_a_column() {
        assert!(parse_assignment("=x").is_err());
        assert!(parse_assignment("nothing").is_err());
    }

    #[test]
    fn repeated_filters_accumulate() {
        let cli = Cli::try_parse_from([
            "tablefilter",
            "rows.json",
            "--where",
            "city=Paris",
            "-w",
            "country=France",
            "--choices",
            "city",
            "-o",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.filters.len(), 2);
        assert_eq!(cli.choices, vec!["city".to_string()]);
        assert_eq!(cli.output, OutputMode::Json);
    }
}
