//! Staging table for color rules.
//!
//! Row operations only touch this buffer; nothing reaches the backend until
//! the rows are saved through [`ColorClient::save`](super::ColorClient::save).

use super::types::{ColorName, ColorRule};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("row {index} does not exist (table has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    #[error("no row for color {0}")]
    ColorNotFound(ColorName),
}

/// Field changes applied by [`ColorTable::edit`]; `None` keeps the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowEdit {
    pub name: Option<ColorName>,
    pub action_id: Option<u32>,
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorTable {
    rows: Vec<ColorRule>,
}

impl ColorTable {
    pub fn new(rows: Vec<ColorRule>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ColorRule] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Replace the buffer, e.g. after loading from the backend.
    pub fn replace(&mut self, rows: Vec<ColorRule>) {
        self.rows = rows;
    }

    /// Append a default row (red, action 0, 1000 ms) and return its index.
    pub fn add(&mut self) -> usize {
        self.rows.push(ColorRule::default());
        self.rows.len() - 1
    }

    pub fn edit(&mut self, index: usize, edit: RowEdit) -> Result<&ColorRule, TableError> {
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(TableError::RowOutOfRange { index, len })?;

        if let Some(name) = edit.name {
            row.name = name;
        }
        if let Some(action_id) = edit.action_id {
            row.action_id = action_id;
        }
        if let Some(duration_ms) = edit.duration_ms {
            row.duration_ms = duration_ms;
        }
        Ok(row)
    }

    pub fn remove(&mut self, index: usize) -> Result<ColorRule, TableError> {
        if index >= self.rows.len() {
            return Err(TableError::RowOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        Ok(self.rows.remove(index))
    }

    /// Index of the first row for a color.
    pub fn position(&self, name: ColorName) -> Option<usize> {
        self.rows.iter().position(|row| row.name == name)
    }

    /// Update the first row for `rule.name`, or append the rule.
    pub fn upsert(&mut self, rule: ColorRule) -> usize {
        match self.position(rule.name) {
            Some(index) => {
                self.rows[index] = rule;
                index
            }
            None => {
                self.rows.push(rule);
                self.rows.len() - 1
            }
        }
    }

    /// Remove the first row for a color.
    pub fn remove_color(&mut self, name: ColorName) -> Result<ColorRule, TableError> {
        let index = self
            .position(name)
            .ok_or(TableError::ColorNotFound(name))?;
        self.remove(index)
    }
}
