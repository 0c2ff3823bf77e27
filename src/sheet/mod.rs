//! Collaborative sheet data model and queries.
//!
//! Types mirror the sheet service's JSON so transports can deserialize
//! responses directly into them.

mod client;
mod snapshot;

pub use client::{find_sheet_id, find_workspace_sheet_id, SheetClient, SheetScope, SheetService};
pub use snapshot::SheetSnapshot;

use serde::{Deserialize, Serialize};
use std::fmt;

pub type SheetId = i64;
pub type RowId = i64;
pub type ColumnId = i64;

/// Raw stored value of a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    // Tried before Number so large integer ids stay exact.
    Int(i64),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Checkbox-style truthiness: `true`, non-zero numbers and non-empty
    /// text other than "false"/"0"/"no".
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Bool(b) => *b,
            CellValue::Int(n) => *n != 0,
            CellValue::Number(n) => *n != 0.0,
            CellValue::Text(s) => {
                let s = s.trim();
                !(s.is_empty()
                    || s.eq_ignore_ascii_case("false")
                    || s.eq_ignore_ascii_case("no")
                    || s == "0")
            }
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(n) => write!(f, "{n}"),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub column_id: ColumnId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<CellValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_value: Option<String>,
}

impl Cell {
    /// Display value when non-empty, otherwise the raw value.
    pub fn effective_value(&self) -> Option<CellValue> {
        match self.display_value.as_deref() {
            Some(d) if !d.is_empty() => Some(CellValue::Text(d.to_string())),
            _ => self.value.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub id: RowId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<RowId>,
    #[serde(default)]
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub id: SheetId,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSummary {
    pub id: SheetId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSummary {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub sheets: Vec<SheetSummary>,
}

/// Cell change pushed back to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellUpdate {
    pub column_id: ColumnId,
    pub value: CellValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowUpdate {
    pub id: RowId,
    pub cells: Vec<CellUpdate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_service_json() {
        let sheet: Sheet = serde_json::from_str(
            r#"{
                "id": 42, "name": "ExaSPIM Merge Locations",
                "columns": [{"id": 1, "title": "Sample", "type": "TEXT_NUMBER"}],
                "rows": [
                    {"id": 10, "rowNumber": 1, "cells": [{"columnId": 1, "value": "653158_seg1", "displayValue": "653158_seg1"}]},
                    {"id": 11, "parentId": 10, "cells": [{"columnId": 1, "value": true}]},
                    {"id": 12, "parentId": 10, "cells": [{"columnId": 1, "value": 3.0}]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(sheet.rows[1].parent_id, Some(10));
        assert_eq!(sheet.rows[1].cells[0].value, Some(CellValue::Bool(true)));
        assert_eq!(sheet.rows[2].cells[0].value, Some(CellValue::Number(3.0)));
        assert_eq!(sheet.rows[0].cells[0].display_value.as_deref(), Some("653158_seg1"));
    }

    #[test]
    fn effective_value_prefers_display() {
        let cell = Cell {
            column_id: 1,
            value: Some(CellValue::Number(5.0)),
            display_value: Some("5 units".into()),
        };
        assert_eq!(cell.effective_value(), Some(CellValue::Text("5 units".into())));

        let empty_display = Cell {
            display_value: Some(String::new()),
            ..cell.clone()
        };
        assert_eq!(empty_display.effective_value(), Some(CellValue::Number(5.0)));

        let raw_only = Cell {
            display_value: None,
            ..cell
        };
        assert_eq!(raw_only.effective_value(), Some(CellValue::Number(5.0)));
    }

    #[test]
    fn truthiness() {
        assert!(CellValue::Bool(true).is_truthy());
        assert!(!CellValue::Bool(false).is_truthy());
        assert!(CellValue::Text("Yes".into()).is_truthy());
        assert!(!CellValue::Text("FALSE".into()).is_truthy());
        assert!(!CellValue::Text(" ".into()).is_truthy());
        assert!(!CellValue::Number(0.0).is_truthy());
        assert_eq!(CellValue::Number(123.0).to_string(), "123");
        assert_eq!(CellValue::Number(1.5).to_string(), "1.5");
        assert!(!CellValue::Int(0).is_truthy());
    }

    #[test]
    fn large_integer_ids_survive_without_display_value() {
        let cell: Cell =
            serde_json::from_str(r#"{"columnId": 1, "value": 864691135123456789}"#).unwrap();
        assert_eq!(cell.value, Some(CellValue::Int(864691135123456789)));
        assert_eq!(
            cell.effective_value().map(|v| v.to_string()).as_deref(),
            Some("864691135123456789")
        );

        let float: Cell = serde_json::from_str(r#"{"columnId": 1, "value": 2.5}"#).unwrap();
        assert_eq!(float.value, Some(CellValue::Number(2.5)));
    }
}
