use super::{CellValue, ColumnId, RowId, Sheet};
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Immutable view of a fetched sheet with lookup tables built once.
#[derive(Debug, Clone)]
pub struct SheetSnapshot {
    sheet: Sheet,
    row_index: HashMap<RowId, usize>,
    column_ids: HashMap<String, ColumnId>,
    /// (parent index, child indices) in order of first child appearance.
    children: Vec<(usize, Vec<usize>)>,
}

impl SheetSnapshot {
    /// Index `sheet`. Fails if a row names a parent that is not in the sheet.
    pub fn new(sheet: Sheet) -> Result<Self> {
        let row_index: HashMap<RowId, usize> = sheet
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| (row.id, idx))
            .collect();

        let column_ids = sheet
            .columns
            .iter()
            .map(|c| (c.title.clone(), c.id))
            .collect();

        let mut children: Vec<(usize, Vec<usize>)> = Vec::new();
        let mut slot_of_parent: HashMap<usize, usize> = HashMap::new();
        for (child_idx, row) in sheet.rows.iter().enumerate() {
            let Some(parent_id) = row.parent_id else {
                continue;
            };
            let parent_idx = *row_index.get(&parent_id).ok_or(Error::DanglingParent {
                row_id: row.id,
                parent_id,
            })?;
            let slot = *slot_of_parent.entry(parent_idx).or_insert_with(|| {
                children.push((parent_idx, Vec::new()));
                children.len() - 1
            });
            children[slot].1.push(child_idx);
        }

        Ok(Self {
            sheet,
            row_index,
            column_ids,
            children,
        })
    }

    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    pub fn row_count(&self) -> usize {
        self.sheet.rows.len()
    }

    pub fn row_index_of(&self, row_id: RowId) -> Option<usize> {
        self.row_index.get(&row_id).copied()
    }

    pub fn column_id(&self, column_name: &str) -> Result<ColumnId> {
        self.column_ids
            .get(column_name)
            .copied()
            .ok_or_else(|| Error::ColumnNotFound {
                column: column_name.to_string(),
            })
    }

    /// Parent rows that have children, each with its child row indices.
    pub fn children_map(&self) -> &[(usize, Vec<usize>)] {
        &self.children
    }

    /// Child row indices of `parent_idx` (empty for leaf rows).
    pub fn children_of(&self, parent_idx: usize) -> &[usize] {
        self.children
            .iter()
            .find(|(p, _)| *p == parent_idx)
            .map(|(_, c)| c.as_slice())
            .unwrap_or(&[])
    }

    /// Cell value at (`row_idx`, `column_name`): display value if present,
    /// raw value otherwise. `None` when the row has no such cell or both are empty.
    pub fn value_at(&self, row_idx: usize, column_name: &str) -> Result<Option<CellValue>> {
        let col_id = self.column_id(column_name)?;
        let row = self.sheet.rows.get(row_idx).ok_or(Error::RowOutOfRange {
            index: row_idx,
            len: self.sheet.rows.len(),
        })?;
        Ok(row
            .cells
            .iter()
            .find(|c| c.column_id == col_id)
            .and_then(|c| c.effective_value()))
    }

    /// Value at (`row_idx`, `column_name`) rendered as text.
    pub fn text_at(&self, row_idx: usize, column_name: &str) -> Result<Option<String>> {
        Ok(self.value_at(row_idx, column_name)?.map(|v| v.to_string()))
    }

    /// Row indices whose text value in `column_name` equals `value`,
    /// ignoring case.
    pub fn rows_where(&self, column_name: &str, value: &str) -> Result<Vec<usize>> {
        let needle = value.to_lowercase();
        let mut out = Vec::new();
        for idx in 0..self.sheet.rows.len() {
            if let Some(CellValue::Text(s)) = self.value_at(idx, column_name)? {
                if s.to_lowercase() == needle {
                    out.push(idx);
                }
            }
        }
        Ok(out)
    }

    /// Id of the first row (in row order) with a cell whose display value
    /// equals `keyword`.
    pub fn find_row_id(&self, keyword: &str) -> Result<RowId> {
        self.sheet
            .rows
            .iter()
            .find(|row| {
                row.cells
                    .iter()
                    .any(|c| c.display_value.as_deref() == Some(keyword))
            })
            .map(|row| row.id)
            .ok_or_else(|| Error::RowNotFound {
                keyword: keyword.to_string(),
            })
    }

    /// Whole sheet as column titles plus one value per column for each row.
    pub fn to_table(&self) -> (Vec<String>, Vec<Vec<Option<CellValue>>>) {
        let titles: Vec<String> = self.sheet.columns.iter().map(|c| c.title.clone()).collect();
        let rows = self
            .sheet
            .rows
            .iter()
            .map(|row| {
                self.sheet
                    .columns
                    .iter()
                    .map(|col| {
                        row.cells
                            .iter()
                            .find(|c| c.column_id == col.id)
                            .and_then(|c| c.effective_value())
                    })
                    .collect()
            })
            .collect();
        (titles, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{Cell, Column, Row};
    use pretty_assertions::assert_eq;

    fn text(column_id: ColumnId, s: &str) -> Cell {
        Cell {
            column_id,
            value: Some(CellValue::Text(s.to_string())),
            display_value: Some(s.to_string()),
        }
    }

    fn sheet() -> Sheet {
        Sheet {
            id: 1,
            name: "Reviews".into(),
            columns: vec![
                Column { id: 100, title: "Sample".into() },
                Column { id: 101, title: "Status".into() },
                Column { id: 102, title: "Count".into() },
            ],
            rows: vec![
                Row { id: 10, parent_id: None, cells: vec![text(100, "653158_a"), text(101, "Done")] },
                Row { id: 11, parent_id: Some(10), cells: vec![text(101, "done")] },
                Row { id: 20, parent_id: None, cells: vec![text(100, "700000_b")] },
                Row {
                    id: 21,
                    parent_id: Some(20),
                    cells: vec![Cell { column_id: 102, value: Some(CellValue::Number(7.0)), display_value: None }],
                },
                Row { id: 12, parent_id: Some(10), cells: vec![text(101, "DONE")] },
            ],
        }
    }

    #[test]
    fn children_grouped_by_parent_in_first_seen_order() {
        let snap = SheetSnapshot::new(sheet()).unwrap();
        assert_eq!(snap.children_map(), &[(0, vec![1, 4]), (2, vec![3])]);
        assert_eq!(snap.children_of(2), &[3]);
        assert!(snap.children_of(1).is_empty());
        assert_eq!(snap.row_index_of(21), Some(3));
    }

    #[test]
    fn dangling_parent_is_rejected() {
        let mut s = sheet();
        s.rows[1].parent_id = Some(999);
        assert!(matches!(
            SheetSnapshot::new(s),
            Err(Error::DanglingParent { row_id: 11, parent_id: 999 })
        ));
    }

    #[test]
    fn rows_where_ignores_case() {
        let snap = SheetSnapshot::new(sheet()).unwrap();
        assert_eq!(snap.rows_where("Status", "done").unwrap(), vec![0, 1, 4]);
        assert!(snap.rows_where("Count", "7").unwrap().is_empty());
        assert!(matches!(
            snap.rows_where("Nope", "x"),
            Err(Error::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn value_lookup() {
        let snap = SheetSnapshot::new(sheet()).unwrap();
        assert_eq!(
            snap.value_at(0, "Sample").unwrap(),
            Some(CellValue::Text("653158_a".into()))
        );
        assert_eq!(snap.value_at(3, "Count").unwrap(), Some(CellValue::Number(7.0)));
        assert_eq!(snap.text_at(3, "Count").unwrap().as_deref(), Some("7"));
        assert_eq!(snap.value_at(1, "Sample").unwrap(), None);
        assert!(matches!(
            snap.value_at(50, "Sample"),
            Err(Error::RowOutOfRange { index: 50, len: 5 })
        ));
    }

    #[test]
    fn find_row_returns_first_match() {
        let snap = SheetSnapshot::new(sheet()).unwrap();
        assert_eq!(snap.find_row_id("700000_b").unwrap(), 20);
        assert!(matches!(
            snap.find_row_id("missing"),
            Err(Error::RowNotFound { .. })
        ));
    }

    #[test]
    fn table_export() {
        let snap = SheetSnapshot::new(sheet()).unwrap();
        let (titles, rows) = snap.to_table();
        assert_eq!(titles, vec!["Sample", "Status", "Count"]);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[3], vec![None, None, Some(CellValue::Number(7.0))]);
    }

    #[test]
    fn text_at_keeps_large_integer_ids_exact() {
        let sheet: Sheet = serde_json::from_str(
            r#"{
                "id": 1, "name": "Merges",
                "columns": [{"id": 5, "title": "Ground Truth ID"}],
                "rows": [{"id": 10, "cells": [{"columnId": 5, "value": 864691135123456789}]}]
            }"#,
        )
        .unwrap();
        let snap = SheetSnapshot::new(sheet).unwrap();
        assert_eq!(
            snap.text_at(0, "Ground Truth ID").unwrap().as_deref(),
            Some("864691135123456789")
        );
    }
}
