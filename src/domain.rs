use ratatui::crossterm::event::KeyEvent;
use std::io::Error;

use crate::engine::ColumnDefinition;

#[derive(Debug)]
pub enum DGError {
    IoError(Error),
    HttpError(reqwest::Error),
    JsonError(serde_json::Error),
    BadPayload(String),
    InvalidArgument(String),
}

impl From<Error> for DGError {
    fn from(err: Error) -> Self {
        DGError::IoError(err)
    }
}

impl From<reqwest::Error> for DGError {
    fn from(err: reqwest::Error) -> Self {
        DGError::HttpError(err)
    }
}

impl From<serde_json::Error> for DGError {
    fn from(err: serde_json::Error) -> Self {
        DGError::JsonError(err)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    Help,
    Exit,
    Refresh,
    EnterFilter,
    MoveLeft,
    MoveRight,
    ToggleSort,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    SetPageSize(usize),
    RawKey(KeyEvent),
}

#[derive(Debug, Clone)]
pub struct DGConfig {
    pub url: String,
    pub columns: Vec<ColumnDefinition>,
    pub page_size: usize,
    pub event_poll_time: u64,
}

// The column set of the demo record source.
pub fn default_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("id", "ID"),
        ColumnDefinition::new("postId", "Post ID"),
        ColumnDefinition::new("name", "Name"),
        ColumnDefinition::new("email", "Email"),
        ColumnDefinition::new("body", "Body"),
    ]
}

// Parses a comma separated list of "key[:display][:nosort]" column specs.
pub fn parse_columns(value: &str) -> Result<Vec<ColumnDefinition>, String> {
    let mut columns = Vec::new();
    for segment in value.split(',') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let mut parts = segment.split(':');
        let key = parts.next().unwrap_or_default();
        if key.is_empty() {
            return Err(format!("column spec '{segment}' has no key"));
        }
        let mut column = ColumnDefinition::new(key, key);
        for part in parts {
            if part == "nosort" {
                column = column.unsortable();
            } else {
                column.display_name = part.to_string();
            }
        }
        columns.push(column);
    }
    if columns.is_empty() {
        return Err("column list is empty".to_string());
    }
    Ok(columns)
}

pub const HELP_TEXT: &str = "dg - data grid viewer

  /        edit the filter text (Enter keeps it, Esc clears it)
  Esc      clear the filter
  <- ->    select a column
  s        cycle sorting on the selected column (asc, desc, off)
  n / p    next / previous page
  g / G    first / last page
  1..4     page size 10 / 20 / 50 / 100
  r        refetch the record set
  ?        this help
  q        quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_keys() {
        let columns = parse_columns("id,name").unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].key, "id");
        assert_eq!(columns[0].display_name, "id");
        assert!(columns[0].sortable);
    }

    #[test]
    fn parses_display_names_and_nosort() {
        let columns = parse_columns("postId:Post ID,body:Body:nosort").unwrap();
        assert_eq!(columns[0].display_name, "Post ID");
        assert!(columns[0].sortable);
        assert_eq!(columns[1].display_name, "Body");
        assert!(!columns[1].sortable);
    }

    #[test]
    fn rejects_empty_specs() {
        assert!(parse_columns("").is_err());
        assert!(parse_columns(" , ,").is_err());
        assert!(parse_columns(":Name").is_err());
    }
}
