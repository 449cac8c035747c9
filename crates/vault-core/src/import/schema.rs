//! Record schemas recognised on import

use std::collections::HashMap;

use serde_json::Value;

use super::delimited::DelimitedTable;
use super::types::{ImportRecord, ImportSource};

/// Headers identifying the foreign CSV export
const FOREIGN_CSV_HEADERS: [&str; 3] = ["name", "login_username", "login_password"];

/// Headers identifying the vault's own CSV export
const NATIVE_CSV_HEADERS: [&str; 3] = ["websiteName", "username", "password"];

/// Item type of login entries in the foreign JSON export
const FOREIGN_LOGIN_TYPE: u64 = 1;

/// Outcome of matching a JSON document against the known shapes
pub enum JsonMatch {
    Matched(ImportSource, Vec<ImportRecord>),
    Unrecognized,
}

/// Match a parsed JSON document against the known schemas
pub fn match_json(document: &Value) -> JsonMatch {
    if let Some(items) = document.get("items").and_then(Value::as_array) {
        let records = items.iter().filter_map(foreign_json_item).collect();
        return JsonMatch::Matched(ImportSource::ForeignJson, records);
    }

    if let Some(entries) = document.as_array() {
        let records = entries.iter().filter_map(native_json_entry).collect();
        return JsonMatch::Matched(ImportSource::NativeJson, records);
    }

    JsonMatch::Unrecognized
}

fn foreign_json_item(item: &Value) -> Option<ImportRecord> {
    // Only logins; other types are cards, notes, identities
    if item.get("type").and_then(Value::as_u64) != Some(FOREIGN_LOGIN_TYPE) {
        return None;
    }

    let login = item.get("login").filter(|l| l.is_object())?;
    let first_uri = login
        .get("uris")
        .and_then(Value::as_array)
        .and_then(|uris| uris.first())
        .and_then(|uri| uri.get("uri"))
        .and_then(Value::as_str);

    ImportRecord::from_fields(
        item.get("name").and_then(Value::as_str),
        first_uri,
        login.get("username").and_then(Value::as_str),
        login.get("password").and_then(Value::as_str),
    )
}

fn native_json_entry(entry: &Value) -> Option<ImportRecord> {
    let field = |name: &str| entry.get(name).and_then(Value::as_str);

    ImportRecord::from_fields(
        field("websiteName"),
        field("websiteUrl"),
        field("username"),
        field("password"),
    )
}

/// Match a delimited table against the known header sets
pub fn match_table(table: &DelimitedTable) -> Option<(ImportSource, Vec<ImportRecord>)> {
    if table.has_headers(&FOREIGN_CSV_HEADERS) {
        let records = table
            .records()
            .filter_map(|row| {
                ImportRecord::from_fields(
                    text_cell(&row, "name"),
                    text_cell(&row, "login_uri"),
                    text_cell(&row, "login_username"),
                    row.get("login_password").copied(),
                )
            })
            .collect();
        return Some((ImportSource::ForeignCsv, records));
    }

    if table.has_headers(&NATIVE_CSV_HEADERS) {
        let records = table
            .records()
            .filter_map(|row| {
                ImportRecord::from_fields(
                    text_cell(&row, "websiteName"),
                    text_cell(&row, "websiteUrl"),
                    text_cell(&row, "username"),
                    row.get("password").copied(),
                )
            })
            .collect();
        return Some((ImportSource::NativeCsv, records));
    }

    None
}

/// A non-secret cell, trimmed. Password cells are taken verbatim.
fn text_cell<'a>(row: &HashMap<&str, &'a str>, header: &str) -> Option<&'a str> {
    row.get(header).copied().map(str::trim)
}
