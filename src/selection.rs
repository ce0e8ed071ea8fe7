//! Rectangular cell selection over the preview grid.
//!
//! Grid coordinates: row `-1` is the header row, rows `0..N` are data rows
//! and columns run `0..M`. A [`SelectionRange`] keeps its two anchors
//! unordered; [`SelectionRange::bounds`] yields the normalized box.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use tracing::trace;

use crate::error::{Error, Result};
use crate::table::CanonicalTable;

/// Row index of the header row.
pub const HEADER_ROW: isize = -1;
/// Distance from a viewport side within which dragging starts scrolling.
pub const EDGE_MARGIN: f64 = 30.0;
/// Scroll distance applied per active direction on each autoscroll tick.
pub const SCROLL_STEP: f64 = 20.0;
/// Period of the autoscroll timer.
pub const AUTOSCROLL_INTERVAL: Duration = Duration::from_millis(30);

/// A grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub row: isize,
    pub col: usize,
}

impl Cell {
    #[must_use]
    pub const fn new(row: isize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    pub start_row: isize,
    pub start_col: usize,
    pub end_row: isize,
    pub end_col: usize,
}

/// Normalized selection box, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_row: isize,
    pub max_row: isize,
    pub min_col: usize,
    pub max_col: usize,
}

impl Bounds {
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        (self.min_row..=self.max_row).contains(&cell.row)
            && (self.min_col..=self.max_col).contains(&cell.col)
    }

    #[must_use]
    pub fn cols(&self) -> RangeInclusive<usize> {
        self.min_col..=self.max_col
    }
}

impl SelectionRange {
    #[must_use]
    pub fn new(start: Cell, end: Cell) -> Self {
        Self {
            start_row: start.row,
            start_col: start.col,
            end_row: end.row,
            end_col: end.col,
        }
    }

    #[must_use]
    pub fn anchored(cell: Cell) -> Self {
        Self::new(cell, cell)
    }

    /// The whole grid, header row included.
    #[must_use]
    pub fn full(shape: GridShape) -> Self {
        Self::new(
            Cell::new(HEADER_ROW, 0),
            Cell::new(shape.last_row(), shape.last_col()),
        )
    }

    #[must_use]
    pub fn start(&self) -> Cell {
        Cell::new(self.start_row, self.start_col)
    }

    #[must_use]
    pub fn end(&self) -> Cell {
        Cell::new(self.end_row, self.end_col)
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds {
            min_row: self.start_row.min(self.end_row),
            max_row: self.start_row.max(self.end_row),
            min_col: self.start_col.min(self.end_col),
            max_col: self.start_col.max(self.end_col),
        }
    }

    /// Number of grid cells covered, clipped to `shape`.
    #[must_use]
    pub fn cell_count(&self, shape: GridShape) -> usize {
        let b = self.bounds();
        let rows = (b.min_row..=b.max_row.min(shape.last_row())).count();
        let cols = (b.min_col..=b.max_col.min(shape.last_col())).count();
        if shape.cols == 0 { 0 } else { rows * cols }
    }
}

impl fmt::Display for SelectionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{}:{},{}",
            self.start_row, self.start_col, self.end_row, self.end_col
        )
    }
}

fn parse_cell(text: &str) -> Option<Cell> {
    let (row, col) = text.split_once(',')?;
    let row: isize = row.trim().parse().ok()?;
    let col: usize = col.trim().parse().ok()?;
    (row >= HEADER_ROW).then_some(Cell::new(row, col))
}

impl FromStr for SelectionRange {
    type Err = Error;

    /// Parses `row,col:row,col`; a lone `row,col` selects one cell.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidRange(s.to_string());
        match s.split_once(':') {
            Some((start, end)) => Ok(Self::new(
                parse_cell(start).ok_or_else(invalid)?,
                parse_cell(end).ok_or_else(invalid)?,
            )),
            None => parse_cell(s).map(Self::anchored).ok_or_else(invalid),
        }
    }
}

/// Extent of the rendered grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridShape {
    /// Data rows, header excluded.
    pub rows: usize,
    pub cols: usize,
}

impl GridShape {
    #[must_use]
    pub fn of(table: &CanonicalTable) -> Self {
        Self {
            rows: table.rows.len(),
            cols: table.width(),
        }
    }

    /// Last data row, or the header row when there is no data.
    #[must_use]
    pub fn last_row(&self) -> isize {
        isize::try_from(self.rows).map_or(isize::MAX, |n| n - 1)
    }

    #[must_use]
    pub fn last_col(&self) -> usize {
        self.cols.saturating_sub(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Keyboard commands understood by the preview surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Ctrl/Meta + arrow; `extend` is set when Shift is held.
    JumpToEdge { direction: Direction, extend: bool },
    SelectAll,
    Copy,
}

impl KeyCommand {
    /// Maps a key press to a command. Only Ctrl/Meta chords are commands.
    #[must_use]
    pub fn from_key(key: &str, ctrl_or_meta: bool, shift: bool) -> Option<Self> {
        if !ctrl_or_meta {
            return None;
        }
        let jump = |direction| {
            Some(Self::JumpToEdge {
                direction,
                extend: shift,
            })
        };
        match key {
            "ArrowUp" => jump(Direction::Up),
            "ArrowDown" => jump(Direction::Down),
            "ArrowLeft" => jump(Direction::Left),
            "ArrowRight" => jump(Direction::Right),
            "a" | "A" => Some(Self::SelectAll),
            "c" | "C" => Some(Self::Copy),
            _ => None,
        }
    }
}

/// Result of [`SelectionEngine::key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not for the preview surface; let the host handle it.
    Ignored,
    Handled,
    /// The host should copy the materialized range.
    Copy(SelectionRange),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Scroll directions requested by the pointer position while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollDirections {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl ScrollDirections {
    /// A side is active when the pointer lies beyond it or within
    /// [`EDGE_MARGIN`] inside it.
    #[must_use]
    pub fn from_pointer(pointer: Point, bounds: Rect) -> Self {
        Self {
            up: pointer.y < bounds.top + EDGE_MARGIN,
            down: pointer.y > bounds.bottom() - EDGE_MARGIN,
            left: pointer.x < bounds.left + EDGE_MARGIN,
            right: pointer.x > bounds.right() - EDGE_MARGIN,
        }
    }

    #[must_use]
    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    /// Scroll offset applied by one autoscroll tick.
    #[must_use]
    pub fn step(&self) -> (f64, f64) {
        let axis = |neg: bool, pos: bool| match (neg, pos) {
            (true, false) => -SCROLL_STEP,
            (false, true) => SCROLL_STEP,
            _ => 0.0,
        };
        (axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// The scrollable container hosting the preview grid.
pub trait Viewport {
    /// Client rectangle of the container.
    fn bounds(&self) -> Rect;

    fn scroll_by(&mut self, dx: f64, dy: f64);

    /// Scrolls fully towards `direction`.
    fn scroll_to_edge(&mut self, direction: Direction);

    /// Data rows with a cell in `cols` that vertically overlaps the
    /// container, ascending.
    fn visible_rows(&self, cols: RangeInclusive<usize>) -> Vec<usize>;
}

/// A uniform grid: a header strip followed by equal-height data rows and
/// equal-width columns.
#[derive(Debug, Clone, PartialEq)]
pub struct GridViewport {
    pub bounds: Rect,
    pub shape: GridShape,
    pub header_height: f64,
    pub row_height: f64,
    pub col_width: f64,
    pub scroll_left: f64,
    pub scroll_top: f64,
}

impl GridViewport {
    #[must_use]
    pub fn new(bounds: Rect, shape: GridShape, row_height: f64, col_width: f64) -> Self {
        Self {
            bounds,
            shape,
            header_height: row_height,
            row_height,
            col_width,
            scroll_left: 0.0,
            scroll_top: 0.0,
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "grid dimensions stay far below f64 mantissa range"
    )]
    fn max_scroll(&self) -> (f64, f64) {
        let content_w = self.col_width * self.shape.cols as f64;
        let content_h = self.header_height + self.row_height * self.shape.rows as f64;
        (
            (content_w - self.bounds.width).max(0.0),
            (content_h - self.bounds.height).max(0.0),
        )
    }

    fn set_scroll(&mut self, left: f64, top: f64) {
        let (max_left, max_top) = self.max_scroll();
        self.scroll_left = left.clamp(0.0, max_left);
        self.scroll_top = top.clamp(0.0, max_top);
    }
}

impl Viewport for GridViewport {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn scroll_by(&mut self, dx: f64, dy: f64) {
        self.set_scroll(self.scroll_left + dx, self.scroll_top + dy);
    }

    fn scroll_to_edge(&mut self, direction: Direction) {
        let (max_left, max_top) = self.max_scroll();
        match direction {
            Direction::Up => self.scroll_top = 0.0,
            Direction::Down => self.scroll_top = max_top,
            Direction::Left => self.scroll_left = 0.0,
            Direction::Right => self.scroll_left = max_left,
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "row indices stay far below f64 mantissa range"
    )]
    fn visible_rows(&self, cols: RangeInclusive<usize>) -> Vec<usize> {
        if self.shape.cols == 0 || *cols.start() >= self.shape.cols {
            return Vec::new();
        }
        let origin = self.bounds.top + self.header_height - self.scroll_top;
        (0..self.shape.rows)
            .filter(|&row| {
                let top = origin + self.row_height * row as f64;
                let bottom = top + self.row_height;
                bottom > self.bounds.top && top < self.bounds.bottom()
            })
            .collect()
    }
}

/// Pointer and keyboard state machine over a [`SelectionRange`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionEngine {
    range: Option<SelectionRange>,
    dragging: bool,
    scroll: ScrollDirections,
}

impl SelectionEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn range(&self) -> Option<SelectionRange> {
        self.range
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Whether the host should keep the autoscroll timer running.
    #[must_use]
    pub fn is_autoscrolling(&self) -> bool {
        self.dragging && self.scroll.any()
    }

    #[must_use]
    pub fn scroll_directions(&self) -> ScrollDirections {
        self.scroll
    }

    /// Back to "no selection", as when a new table is loaded.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Anchors a new range at `cell`. With `shift` and an existing range only
    /// the end moves and no drag starts.
    pub fn pointer_down(&mut self, cell: Cell, shift: bool) {
        if shift {
            if let Some(range) = self.range.as_mut() {
                range.end_row = cell.row;
                range.end_col = cell.col;
                return;
            }
        }
        self.range = Some(SelectionRange::anchored(cell));
        self.dragging = true;
    }

    /// Tracks the pointer while the button is held. `cell` is the grid cell
    /// under the pointer, if any.
    pub fn pointer_move(&mut self, cell: Option<Cell>, pointer: Point, bounds: Rect) {
        if !self.dragging {
            return;
        }
        if let (Some(cell), Some(range)) = (cell, self.range.as_mut()) {
            range.end_row = cell.row;
            range.end_col = cell.col;
        }
        self.scroll = ScrollDirections::from_pointer(pointer, bounds);
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
        self.scroll = ScrollDirections::default();
    }

    /// One autoscroll timer tick: scrolls the viewport and pulls the range
    /// end to the furthest visible row in the scroll direction. Returns
    /// `true` if the range changed.
    pub fn autoscroll_tick(&mut self, viewport: &mut dyn Viewport) -> bool {
        if !self.is_autoscrolling() {
            return false;
        }
        let (dx, dy) = self.scroll.step();
        viewport.scroll_by(dx, dy);

        let Some(range) = self.range.as_mut() else {
            return false;
        };
        let visible = viewport.visible_rows(range.bounds().cols());
        let (Some(&first), Some(&last)) = (visible.first(), visible.last()) else {
            return false;
        };
        let (first, last) = (to_row(first), to_row(last));
        let before = range.end_row;
        if self.scroll.down && last > range.end_row {
            range.end_row = last;
        }
        if self.scroll.up && first < range.end_row {
            range.end_row = first;
        }
        trace!(from = before, to = range.end_row, "autoscroll tick");
        before != range.end_row
    }

    /// Applies a keyboard command. Commands are ignored unless the preview
    /// surface has focus.
    pub fn key(
        &mut self,
        command: KeyCommand,
        focused: bool,
        shape: GridShape,
        viewport: &mut dyn Viewport,
    ) -> KeyOutcome {
        if !focused {
            return KeyOutcome::Ignored;
        }
        match command {
            KeyCommand::JumpToEdge { direction, extend } => {
                viewport.scroll_to_edge(direction);
                let dragging = self.dragging;
                if let Some(range) = self.range.as_mut().filter(|_| dragging || extend) {
                    match direction {
                        Direction::Up => range.end_row = HEADER_ROW,
                        Direction::Down => range.end_row = shape.last_row(),
                        Direction::Left => range.end_col = 0,
                        Direction::Right => range.end_col = shape.last_col(),
                    }
                }
                KeyOutcome::Handled
            }
            KeyCommand::SelectAll => {
                self.select_all(shape);
                KeyOutcome::Handled
            }
            KeyCommand::Copy => self.range.map_or(KeyOutcome::Ignored, KeyOutcome::Copy),
        }
    }

    pub fn select_all(&mut self, shape: GridShape) {
        self.range = Some(SelectionRange::full(shape));
    }

    /// Replaces the range outright.
    pub fn set_range(&mut self, range: SelectionRange) {
        self.range = Some(range);
        self.dragging = false;
    }
}

fn to_row(row: usize) -> isize {
    isize::try_from(row).unwrap_or(isize::MAX)
}

fn clipped_slice(cells: &[String], cols: RangeInclusive<usize>) -> String {
    let start = (*cols.start()).min(cells.len());
    let end = cols.end().saturating_add(1).min(cells.len());
    cells[start..end.max(start)].join("\t")
}

/// Renders the selected cells as tab-separated lines: the header slice when
/// the header row is included, then each selected data row that exists.
#[must_use]
pub fn materialize_selection(range: &SelectionRange, table: &CanonicalTable) -> String {
    let b = range.bounds();
    let mut lines = Vec::new();
    if b.min_row == HEADER_ROW {
        lines.push(clipped_slice(&table.headers, b.cols()));
    }
    if b.max_row >= 0 {
        let first = usize::try_from(b.min_row.max(0)).unwrap_or(0);
        let last = usize::try_from(b.max_row).unwrap_or(0);
        for row in table.rows.iter().take(last + 1).skip(first) {
            lines.push(clipped_slice(row, b.cols()));
        }
    }
    lines.join("\n")
}
