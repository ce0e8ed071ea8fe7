//! State of one open extraction panel.
//!
//! An [`ExtractionSession`] owns the canonical table being shown, the active
//! tab, the SQL settings, the column mapping and the preview selection. The
//! host feeds it user actions and reads back the text to display.

use std::borrow::Cow;

use tracing::{debug, warn};

use crate::encode::sql::DEFAULT_TABLE_NAME;
use crate::encode::{EncodeOptions, Format, SqlMode, encode};
use crate::error::Result;
use crate::io;
use crate::mapping::{ColumnMapping, Role};
use crate::preview::render_grid;
use crate::selection::{
    GridShape, KeyCommand, KeyOutcome, SelectionEngine, SelectionRange, Viewport,
    materialize_selection,
};
use crate::table::CanonicalTable;

/// A clipboard with a preferred writer and a fallback.
pub trait Clipboard {
    /// # Errors
    /// Returns an error if the preferred writer is unavailable or refuses.
    fn write_primary(&mut self, text: &str) -> Result<()>;

    /// # Errors
    /// Returns an error if the fallback writer fails too.
    fn write_fallback(&mut self, text: &str) -> Result<()>;
}

/// Which writer took a copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Primary,
    Fallback,
    /// Both writers failed; the host should show a transient notice.
    Failed,
}

/// Writes `text` through the primary writer, falling back on failure.
pub fn copy_with_fallback(clipboard: &mut dyn Clipboard, text: &str) -> CopyOutcome {
    let Err(primary) = clipboard.write_primary(text) else {
        return CopyOutcome::Primary;
    };
    debug!(%primary, "primary clipboard failed, trying fallback");
    match clipboard.write_fallback(text) {
        Ok(()) => CopyOutcome::Fallback,
        Err(err) => {
            warn!(%primary, fallback = %err, "copy failed");
            CopyOutcome::Failed
        }
    }
}

/// Panel tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Preview,
    Output(Format),
}

/// What a key press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResponse {
    Ignored,
    Handled,
    Copied(CopyOutcome),
}

#[derive(Debug, Clone)]
pub struct ExtractionSession {
    table: Option<CanonicalTable>,
    tab: Tab,
    sql_table_name: String,
    sql_mode: SqlMode,
    mapping: ColumnMapping,
    selection: SelectionEngine,
    rendered: String,
}

impl Default for ExtractionSession {
    fn default() -> Self {
        Self {
            table: None,
            tab: Tab::Preview,
            sql_table_name: DEFAULT_TABLE_NAME.to_string(),
            sql_mode: SqlMode::Insert,
            mapping: ColumnMapping::new(),
            selection: SelectionEngine::new(),
            rendered: String::new(),
        }
    }
}

impl ExtractionSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `table` and shows its preview. The selection is cleared; the
    /// column mapping is kept only if the table is unchanged.
    pub fn open(&mut self, table: CanonicalTable) {
        if self.table.as_ref() != Some(&table) {
            self.mapping.reset();
        }
        self.selection.reset();
        debug!(
            rows = table.rows.len(),
            cols = table.width(),
            "extraction opened"
        );
        self.table = Some(table);
        self.tab = Tab::Preview;
        self.rendered.clear();
    }

    /// Discards the table and every piece of per-table state.
    pub fn close(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.table.is_some()
    }

    #[must_use]
    pub fn table(&self) -> Option<&CanonicalTable> {
        self.table.as_ref()
    }

    #[must_use]
    pub fn tab(&self) -> Tab {
        self.tab
    }

    #[must_use]
    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionEngine {
        &self.selection
    }

    /// Pointer events go straight to the selection engine.
    pub fn selection_mut(&mut self) -> &mut SelectionEngine {
        &mut self.selection
    }

    #[must_use]
    pub fn sql_table_name(&self) -> &str {
        &self.sql_table_name
    }

    #[must_use]
    pub fn sql_mode(&self) -> SqlMode {
        self.sql_mode
    }

    pub fn select_tab(&mut self, tab: Tab) {
        if let Tab::Output(format) = tab {
            if let Some(mode) = format.sql_mode() {
                self.sql_mode = mode;
            }
        }
        self.tab = tab;
        self.refresh();
    }

    pub fn set_sql_table_name(&mut self, name: &str) {
        self.sql_table_name = name.to_string();
        self.refresh_sql();
    }

    pub fn set_sql_mode(&mut self, mode: SqlMode) {
        self.sql_mode = mode;
        if self.sql_active() {
            self.tab = Tab::Output(Format::sql(mode));
        }
        self.refresh_sql();
    }

    pub fn rename_column(&mut self, col: usize, name: &str) {
        self.mapping.set_name(col, name);
        self.refresh_sql();
    }

    pub fn set_column_role(&mut self, col: usize, role: Role, included: bool) {
        self.mapping.set_included(col, role, included);
        self.refresh_sql();
    }

    fn sql_active(&self) -> bool {
        matches!(self.tab, Tab::Output(format) if format.is_sql())
    }

    fn refresh_sql(&mut self) {
        if self.sql_active() {
            self.refresh();
        }
    }

    fn refresh(&mut self) {
        let (Tab::Output(format), Some(table)) = (self.tab, self.table.as_ref()) else {
            self.rendered.clear();
            return;
        };
        let options = EncodeOptions {
            table_name: self.sql_table_name.clone(),
            mapping: self.mapping.clone(),
        };
        self.rendered = encode(format, table, &options);
    }

    /// Text for the active tab: the preview grid with the selection
    /// highlighted, or the encoded output.
    #[must_use]
    pub fn output(&self) -> Cow<'_, str> {
        match (self.tab, self.table.as_ref()) {
            (Tab::Preview, Some(table)) => Cow::Owned(render_grid(
                table,
                self.selection.range().map(|r| r.bounds()),
            )),
            (Tab::Output(_), Some(_)) => Cow::Borrowed(&self.rendered),
            (_, None) => Cow::Borrowed(""),
        }
    }

    /// Copies the encoded output. `None` on the preview tab or with no
    /// table open.
    pub fn copy_output(&self, clipboard: &mut dyn Clipboard) -> Option<CopyOutcome> {
        match self.tab {
            Tab::Output(_) if self.table.is_some() => {
                Some(copy_with_fallback(clipboard, &self.rendered))
            }
            _ => None,
        }
    }

    /// The current selection as tab-separated text.
    #[must_use]
    pub fn selection_text(&self) -> Option<String> {
        let table = self.table.as_ref()?;
        let range = self.selection.range()?;
        Some(materialize_selection(&range, table))
    }

    /// Copies the selection. `None` when nothing is selected.
    pub fn copy_selection(&self, clipboard: &mut dyn Clipboard) -> Option<CopyOutcome> {
        let text = self.selection_text()?;
        Some(copy_with_fallback(clipboard, &text))
    }

    /// Selects `range` directly.
    pub fn select(&mut self, range: SelectionRange) {
        self.selection.set_range(range);
    }

    fn shape(&self) -> GridShape {
        self.table.as_ref().map(GridShape::of).unwrap_or_default()
    }

    /// Routes a keyboard command. Only the preview tab reacts to keys.
    pub fn handle_key(
        &mut self,
        command: KeyCommand,
        focused: bool,
        viewport: &mut dyn Viewport,
        clipboard: &mut dyn Clipboard,
    ) -> KeyResponse {
        if self.tab != Tab::Preview || self.table.is_none() {
            return KeyResponse::Ignored;
        }
        let shape = self.shape();
        match self.selection.key(command, focused, shape, viewport) {
            KeyOutcome::Ignored => KeyResponse::Ignored,
            KeyOutcome::Handled => KeyResponse::Handled,
            KeyOutcome::Copy(_) => self
                .copy_selection(clipboard)
                .map_or(KeyResponse::Ignored, KeyResponse::Copied),
        }
    }

    /// Download name for the active output tab.
    #[must_use]
    pub fn export_file_name(&self, millis: u128) -> Option<String> {
        match self.tab {
            Tab::Output(format) => Some(io::export_file_name(format, millis)),
            Tab::Preview => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::selection::{Cell, GridViewport, Rect};

    #[derive(Default)]
    struct FakeClipboard {
        primary_fails: bool,
        fallback_fails: bool,
        contents: Option<String>,
    }

    impl Clipboard for FakeClipboard {
        fn write_primary(&mut self, text: &str) -> Result<()> {
            if self.primary_fails {
                return Err(Error::Clipboard("denied".into()));
            }
            self.contents = Some(text.to_string());
            Ok(())
        }

        fn write_fallback(&mut self, text: &str) -> Result<()> {
            if self.fallback_fails {
                return Err(Error::Clipboard("no selection api".into()));
            }
            self.contents = Some(text.to_string());
            Ok(())
        }
    }

    fn table() -> CanonicalTable {
        CanonicalTable::new(
            vec!["id".into(), "name".into()],
            vec![
                vec!["1".into(), "Ann".into()],
                vec!["2".into(), "Bo".into()],
            ],
        )
    }

    #[test]
    fn fallback_chain() {
        let mut ok = FakeClipboard::default();
        assert_eq!(copy_with_fallback(&mut ok, "x"), CopyOutcome::Primary);
        let mut fallback = FakeClipboard {
            primary_fails: true,
            ..FakeClipboard::default()
        };
        assert_eq!(copy_with_fallback(&mut fallback, "x"), CopyOutcome::Fallback);
        assert_eq!(fallback.contents.as_deref(), Some("x"));
        let mut broken = FakeClipboard {
            primary_fails: true,
            fallback_fails: true,
            contents: None,
        };
        assert_eq!(copy_with_fallback(&mut broken, "x"), CopyOutcome::Failed);
        assert_eq!(broken.contents, None);
    }

    #[test]
    fn mapping_changes_re_encode_sql() {
        let mut session = ExtractionSession::new();
        session.open(table());
        session.select_tab(Tab::Output(Format::SqlInsert));
        assert!(session.output().contains("INSERT INTO table_data (`id`, `name`)"));
        session.rename_column(1, "full name");
        assert!(session.output().contains("(`id`, `full_name`)"));
        session.set_column_role(0, Role::Insert, false);
        assert!(session.output().contains("INSERT INTO table_data (`full_name`) VALUES ('Ann');"));
        session.set_sql_mode(SqlMode::Update);
        assert_eq!(session.tab(), Tab::Output(Format::SqlUpdate));
        assert!(session.output().contains("UPDATE table_data SET `full_name` = 'Bo' WHERE `id` = 2;"));
        session.set_sql_table_name("users");
        assert!(session.output().contains("UPDATE users SET"));
    }

    #[test]
    fn reopening_a_different_table_resets_state() {
        let mut session = ExtractionSession::new();
        session.open(table());
        session.rename_column(0, "key");
        session.select(SelectionRange::anchored(Cell::new(0, 0)));

        session.open(table());
        assert_eq!(session.mapping().name(0, &table().headers), "key");
        assert_eq!(session.selection().range(), None);

        let mut other = table();
        other.rows.pop();
        session.open(other);
        assert_eq!(session.mapping().name(0, &table().headers), "id");
    }

    #[test]
    fn copy_shortcut_copies_the_selection() {
        let mut session = ExtractionSession::new();
        session.open(table());
        let mut vp = GridViewport::new(
            Rect::new(0.0, 0.0, 200.0, 100.0),
            GridShape::of(&table()),
            20.0,
            100.0,
        );
        let mut clipboard = FakeClipboard::default();
        let copy = KeyCommand::from_key("c", true, false).unwrap();
        assert_eq!(
            session.handle_key(copy, true, &mut vp, &mut clipboard),
            KeyResponse::Ignored
        );

        session.handle_key(KeyCommand::SelectAll, true, &mut vp, &mut clipboard);
        assert_eq!(
            session.handle_key(copy, true, &mut vp, &mut clipboard),
            KeyResponse::Copied(CopyOutcome::Primary)
        );
        assert_eq!(clipboard.contents.as_deref(), Some("id\tname\n1\tAnn\n2\tBo"));
        assert!(session.output().starts_with("|[id]|[name]|"));
    }

    #[test]
    fn output_tabs_copy_and_name_exports() {
        let mut session = ExtractionSession::new();
        session.open(table());
        let mut clipboard = FakeClipboard::default();
        assert_eq!(session.copy_output(&mut clipboard), None);
        assert_eq!(session.export_file_name(1), None);

        session.select_tab(Tab::Output(Format::Csv));
        assert_eq!(
            session.copy_output(&mut clipboard),
            Some(CopyOutcome::Primary)
        );
        assert_eq!(
            clipboard.contents.as_deref(),
            Some("\"id\",\"name\"\n\"1\",\"Ann\"\n\"2\",\"Bo\"")
        );
        assert_eq!(
            session.export_file_name(42).as_deref(),
            Some("table_export_42.csv")
        );
    }

    #[test]
    fn close_discards_the_table() {
        let mut session = ExtractionSession::new();
        session.open(table());
        session.set_sql_table_name("orders");
        session.select_tab(Tab::Output(Format::Json));
        session.close();
        assert!(!session.is_open());
        assert_eq!(session.output(), "");
        assert_eq!(session.tab(), Tab::Preview);
        assert_eq!(session.sql_table_name(), DEFAULT_TABLE_NAME);
    }
}
