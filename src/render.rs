//! Terminal rendering for records, summaries and chat messages

use colored::Colorize;
use prettytable::{format, Cell, Row, Table};
use serde_json::Value;

use crate::chat::{ChatMessage, Role};
use crate::flow::{fields, EntityType, FieldMap};

/// Format a JSON value for a table cell
///
/// Strings print without quotes, lists are comma-joined and `null` is empty.
pub fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(format_cell)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// Column names for a set of records: the union of keys, first-seen order
pub fn record_columns(records: &[Value]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        if let Value::Object(obj) = record {
            for key in obj.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
    }
    columns
}

/// Build a table with one row per record
pub fn records_table(records: &[Value]) -> Table {
    let columns = record_columns(records);
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(Row::new(
        columns.iter().map(|c| Cell::new(c).style_spec("b")).collect(),
    ));

    for record in records {
        let cells = columns
            .iter()
            .map(|column| Cell::new(&record.get(column).map(format_cell).unwrap_or_default()))
            .collect();
        table.add_row(Row::new(cells));
    }
    table
}

/// Build a two-column summary of collected fields, labelled from the field table
pub fn field_map_table(entity: EntityType, data: &FieldMap) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    for (name, value) in data {
        let label = fields::lookup(entity, name).map_or(name.as_str(), |f| f.label);
        table.add_row(Row::new(vec![
            Cell::new(label).style_spec("b"),
            Cell::new(&value.to_string()),
        ]));
    }
    table
}

/// Print records, or a notice when there are none
pub fn print_records(title: &str, records: &[Value]) {
    println!("\n{}", title.bold());
    if records.is_empty() {
        println!("{}", "No records found.".yellow());
        return;
    }
    records_table(records).printstd();
    println!();
}

/// One chat message as a terminal line
pub fn format_chat_message(message: &ChatMessage, show_stage_tags: bool) -> String {
    let speaker = match message.role {
        Role::User => "You".green().bold(),
        Role::Bot => "Assistant".cyan().bold(),
    };
    let tag = match message.stage {
        Some(stage) if show_stage_tags => format!("{} ", stage.colored_tag()),
        _ => String::new(),
    };
    let content = if message.is_destructive {
        format!("{}\n{}", message.content.red().bold(), "Type 'yes' or 'no'.".yellow())
    } else {
        message.content.clone()
    };
    format!("{}{}: {}", tag, speaker, content)
}
