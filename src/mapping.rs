//! Per-column naming and role selection for SQL output.
//!
//! Settings are keyed by column index and only materialize once a column is
//! touched; untouched columns report their defaults. The whole mapping is
//! reset when a different table is loaded.

use std::collections::BTreeMap;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::table::synthetic_header;

/// Display width past which column labels are shortened in the UI.
pub const LABEL_MAX_WIDTH: usize = 12;

/// Statement part a column can take part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Column list of `INSERT` statements.
    Insert,
    /// Assignments of `UPDATE ... SET`.
    Set,
    /// Conditions of `UPDATE ... WHERE`.
    Where,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSetting {
    pub custom_name: Option<String>,
    pub insert: bool,
    pub set: bool,
    pub filter: bool,
}

impl ColumnSetting {
    /// Column 0 is the `WHERE` key by default; every other column is
    /// assigned in `SET`. All columns are inserted.
    #[must_use]
    pub fn default_for(col: usize) -> Self {
        Self {
            custom_name: None,
            insert: true,
            set: col != 0,
            filter: col == 0,
        }
    }

    #[must_use]
    pub fn includes(&self, role: Role) -> bool {
        match role {
            Role::Insert => self.insert,
            Role::Set => self.set,
            Role::Where => self.filter,
        }
    }

    fn flag_mut(&mut self, role: Role) -> &mut bool {
        match role {
            Role::Insert => &mut self.insert,
            Role::Set => &mut self.set,
            Role::Where => &mut self.filter,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: BTreeMap<usize, ColumnSetting>,
}

impl ColumnMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current setting of `col`, defaults included.
    #[must_use]
    pub fn setting(&self, col: usize) -> ColumnSetting {
        self.columns
            .get(&col)
            .cloned()
            .unwrap_or_else(|| ColumnSetting::default_for(col))
    }

    fn entry(&mut self, col: usize) -> &mut ColumnSetting {
        self.columns
            .entry(col)
            .or_insert_with(|| ColumnSetting::default_for(col))
    }

    /// Name used for `col` in SQL: the custom name, else the header text,
    /// else `col_N`.
    #[must_use]
    pub fn name(&self, col: usize, headers: &[String]) -> String {
        if let Some(name) = self.columns.get(&col).and_then(|s| s.custom_name.as_ref()) {
            return name.clone();
        }
        headers
            .get(col)
            .filter(|h| !h.is_empty())
            .cloned()
            .unwrap_or_else(|| synthetic_header(col + 1))
    }

    /// Sets a custom name. A blank name restores the fallback.
    pub fn set_name(&mut self, col: usize, name: &str) {
        let name = name.trim();
        self.entry(col).custom_name = (!name.is_empty()).then(|| name.to_string());
    }

    #[must_use]
    pub fn includes(&self, col: usize, role: Role) -> bool {
        self.setting(col).includes(role)
    }

    pub fn set_included(&mut self, col: usize, role: Role, included: bool) {
        *self.entry(col).flag_mut(role) = included;
    }

    /// Column indices in `0..width` taking part in `role`, ascending.
    #[must_use]
    pub fn columns_for(&self, role: Role, width: usize) -> Vec<usize> {
        (0..width).filter(|&col| self.includes(col, role)).collect()
    }

    /// Name shortened to [`LABEL_MAX_WIDTH`] display columns for the UI.
    #[must_use]
    pub fn label(&self, col: usize, headers: &[String]) -> String {
        truncate_label(&self.name(col, headers), LABEL_MAX_WIDTH)
    }

    pub fn reset(&mut self) {
        self.columns.clear();
    }
}

/// Cuts `text` so that it fits `max` display columns, ending with `…` when
/// anything was dropped.
#[must_use]
pub fn truncate_label(text: &str, max: usize) -> String {
    if UnicodeWidthStr::width(text) <= max {
        return text.to_string();
    }
    let budget = max.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}
