use std::collections::HashMap;

use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};
use serde_json::Value;

use super::model::HistoryEntry;
use super::storage::HistoryStorage;
use crate::{Result, RuflowError};

/// 构建历史记录表格，最新的记录在最上面
pub fn history_table(entries: &[HistoryEntry]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["ID", "Time", "Method", "URL", "Status", "Duration"]);

    for entry in entries.iter().rev() {
        let status_color = if entry.response.status < 400 {
            Color::Green
        } else {
            Color::Red
        };

        table.add_row(vec![
            Cell::new(entry.short_id()),
            Cell::new(entry.timestamp.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(&entry.request.method),
            Cell::new(&entry.request.url).add_attribute(Attribute::Dim),
            Cell::new(entry.response.status).fg(status_color),
            Cell::new(format!("{}ms", entry.duration_ms)),
        ]);
    }

    table
}

/// 单条记录的详细信息
pub fn entry_details(entry: &HistoryEntry) -> String {
    let mut out = Vec::new();

    out.push("Request:".bold().to_string());
    out.push(format!("  {} {}", entry.request.method.cyan(), entry.request.url));
    out.push(format!("  ID: {}", entry.id));
    out.push(format!("  Time: {}", entry.timestamp.format("%Y-%m-%d %H:%M:%S")));
    push_map(&mut out, "Headers", &entry.request.headers);
    push_map(&mut out, "Query Parameters", &entry.request.params);
    if let Some(body) = &entry.request.body {
        out.push(format!("  {}", "Body:".bold()));
        let body = match body {
            Value::String(text) => text.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        };
        out.extend(body.lines().map(|line| format!("    {}", line)));
    }

    out.push(String::new());
    out.push("Response:".bold().to_string());
    let status = format!("{} {}", entry.response.status, entry.response.status_text);
    let status = if entry.response.status < 400 {
        status.green()
    } else {
        status.red()
    };
    out.push(format!("  Status: {}", status));
    out.push(format!("  Duration: {}ms", entry.duration_ms));
    push_map(&mut out, "Headers", &entry.response.headers);

    out.join("\n")
}

fn push_map(out: &mut Vec<String>, title: &str, map: &HashMap<String, String>) {
    if map.is_empty() {
        return;
    }
    out.push(format!("  {}", format!("{}:", title).bold()));
    let mut pairs: Vec<_> = map.iter().collect();
    pairs.sort();
    out.extend(pairs.into_iter().map(|(k, v)| format!("    {}: {}", k, v)));
}

pub fn list_history(storage: &HistoryStorage, limit: usize) -> Result<()> {
    let entries = storage.tail(limit)?;
    if entries.is_empty() {
        println!("No history yet.");
        return Ok(());
    }

    println!("{}", history_table(&entries));
    Ok(())
}

pub fn search_history(storage: &HistoryStorage, query: &str) -> Result<()> {
    let entries = storage.search(query)?;
    if entries.is_empty() {
        println!("No results found for '{}'", query);
        return Ok(());
    }

    println!("Search results ({}):", entries.len());
    println!("{}", history_table(&entries));
    Ok(())
}

pub fn show_history(storage: &HistoryStorage, id: &str) -> Result<()> {
    let entry = find_entry(storage, id)?;
    println!("{}", entry_details(&entry));
    Ok(())
}

/// 查找记录，不存在时返回错误
pub fn find_entry(storage: &HistoryStorage, id: &str) -> Result<HistoryEntry> {
    storage
        .find(id)?
        .ok_or_else(|| RuflowError::Other(format!("History entry '{}' not found", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Method, RequestOptions, ResponseData};
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_table_lists_newest_first() {
        let response = ResponseData::new(200, "OK", HashMap::new(), Value::Null, Duration::ZERO);
        let entries = vec![
            HistoryEntry::new(&RequestOptions::new(Method::Get, "https://a.test/first"), &response),
            HistoryEntry::new(&RequestOptions::new(Method::Post, "https://a.test/second"), &response),
        ];

        let rendered = history_table(&entries).to_string();
        let first = rendered.find("/first").unwrap();
        let second = rendered.find("/second").unwrap();
        assert!(second < first);
        assert!(rendered.contains("POST"));
    }

    #[test]
    fn test_entry_details() {
        colored::control::set_override(false);
        let request = RequestOptions::new(Method::Post, "https://a.test/users")
            .with_header("X-Trace", "abc")
            .with_query("dry_run", "1")
            .with_json(json!({"name": "Alice"}));
        let response = ResponseData::new(
            201,
            "Created",
            HashMap::from([("content-type".to_string(), "application/json".to_string())]),
            Value::Null,
            Duration::from_millis(15),
        );
        let entry = HistoryEntry::new(&request, &response);

        let details = entry_details(&entry);
        assert!(details.contains("POST https://a.test/users"));
        assert!(details.contains(&format!("ID: {}", entry.id)));
        assert!(details.contains("    X-Trace: abc"));
        assert!(details.contains("Query Parameters:"));
        assert!(details.contains("    dry_run: 1"));
        assert!(details.contains("\"name\": \"Alice\""));
        assert!(details.contains("Status: 201 Created"));
        assert!(details.contains("Duration: 15ms"));
        assert!(details.contains("    content-type: application/json"));
    }

    #[test]
    fn test_find_entry_missing_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = HistoryStorage::with_path(temp_dir.path().join("history.jsonl"));

        let err = find_entry(&storage, "nope").unwrap_err();
        assert!(err.to_string().contains("History entry 'nope' not found"));
    }
}
