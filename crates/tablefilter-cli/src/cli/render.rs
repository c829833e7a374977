//! # Rendering
//!
//! Commands build a [`Report`] from the coordinator's state; this module turns
//! it into either aligned plain text or JSON. Styling goes through `console`,
//! which drops colors when stdout is not a terminal.

use super::setup::OutputMode;
use anyhow::Result;
use console::style;
use serde::Serialize;
use tablefilter::{Choice, TableModel, Value};
use unicode_width::UnicodeWidthStr;

const COLUMN_GAP: &str = "  ";

#[derive(Debug, Serialize)]
pub struct ChoiceList {
    pub column: String,
    pub shown: Vec<String>,
    /// Choices beyond the visible limit.
    pub more: usize,
}

#[derive(Debug, Serialize)]
pub struct Completion {
    pub column: String,
    pub input: String,
    pub completion: Option<String>,
    pub exact: bool,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    /// Rows exist but the filters hide all of them.
    pub warning: bool,
    pub choices: Vec<ChoiceList>,
    pub completions: Vec<Completion>,
}

impl Report {
    pub fn build(
        model: &dyn TableModel,
        visible: &[usize],
        warning: bool,
        choices: Vec<(String, Vec<Choice>)>,
        completions: Vec<Completion>,
        max_visible_choices: usize,
    ) -> Self {
        let columns = (0..model.column_count())
            .map(|column| model.column_name(column))
            .collect();
        let rows = visible
            .iter()
            .map(|&row| {
                (0..model.column_count())
                    .map(|column| model.value_at(row, column))
                    .collect()
            })
            .collect();
        let choices = choices
            .into_iter()
            .map(|(column, list)| ChoiceList {
                column,
                more: list.len().saturating_sub(max_visible_choices),
                shown: list
                    .iter()
                    .take(max_visible_choices)
                    .map(Choice::to_string)
                    .collect(),
            })
            .collect();
        Self {
            columns,
            rows,
            warning,
            choices,
            completions,
        }
    }
}

pub fn render(report: &Report, mode: OutputMode) -> Result<String> {
    match mode {
        OutputMode::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputMode::Text => Ok(render_text(report)),
    }
}

fn render_text(report: &Report) -> String {
    let cells: Vec<Vec<String>> = report
        .rows
        .iter()
        .map(|row| row.iter().map(Value::to_string).collect())
        .collect();
    let widths: Vec<usize> = report
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.width())
                .chain([name.width()])
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::new();
    let header: Vec<String> = report
        .columns
        .iter()
        .zip(&widths)
        .map(|(name, &width)| style(pad(name, width)).bold().to_string())
        .collect();
    lines.push(header.join(COLUMN_GAP).trim_end().to_string());
    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| pad(cell, width))
            .collect();
        lines.push(line.join(COLUMN_GAP).trim_end().to_string());
    }
    if report.warning {
        lines.push(
            style("No rows match the current filters")
                .yellow()
                .to_string(),
        );
    }

    for list in &report.choices {
        let mut text = list.shown.join(", ");
        if list.more > 0 {
            text.push_str(&format!(" (+{} more)", list.more));
        }
        lines.push(format!("{}: {}", style(&list.column).bold(), text));
    }
    for completion in &report.completions {
        let outcome = match &completion.completion {
            Some(found) => format!("{} -> {}", completion.input, found),
            None => format!("{} {}", completion.input, style("(no match)").dim()),
        };
        lines.push(format!("{}: {}", style(&completion.column).bold(), outcome));
    }
    lines.join("\n")
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}
