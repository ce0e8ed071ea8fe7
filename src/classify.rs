//! Detection of table structures and the data-versus-layout heuristic.
//!
//! Three markup conventions are recognised: plain `<table>` elements,
//! Element UI grids (`.el-table`) and Ant Design grids
//! (`.ant-table-wrapper`). Component grids are always data tables; a plain
//! table nested inside one is left to its wrapper so it is registered once.
//!
//! [`Scanner`] keeps the per-page registration state. Registered nodes carry
//! the [`MARKER_ATTR`] attribute, which is what makes repeated scans of a
//! mutating page idempotent.

use std::fmt;

use markup5ever_rcdom::{Handle, NodeData};
use tracing::debug;

use crate::config::{DisplayMode, FilterConfig, SiteStatus};
use crate::dom;

/// Attribute set on every registered table node.
pub const MARKER_ATTR: &str = "data-table-extractor";

/// Class carried by Element UI table roots.
pub const ELEMENT_UI_ROOT: &str = "el-table";
/// Class carried by Ant Design table wrappers.
pub const ANT_DESIGN_ROOT: &str = "ant-table-wrapper";

const INTERACTIVE_TAGS: [&str; 6] = ["a", "button", "input", "select", "textarea", "form"];

/// Markup convention a table root follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkupKind {
    Standard,
    ElementUi,
    AntDesign,
}

impl MarkupKind {
    /// Detects the convention of `node`, if it is a table root at all.
    #[must_use]
    pub fn detect(node: &Handle) -> Option<Self> {
        if dom::has_class(node, ELEMENT_UI_ROOT) {
            Some(Self::ElementUi)
        } else if dom::has_class(node, ANT_DESIGN_ROOT) {
            Some(Self::AntDesign)
        } else if dom::is_tag(node, "table") {
            Some(Self::Standard)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_component(self) -> bool {
        !matches!(self, Self::Standard)
    }
}

impl fmt::Display for MarkupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Standard => "standard",
            Self::ElementUi => "element-ui",
            Self::AntDesign => "ant-design",
        })
    }
}

/// Why a standard table was judged to be a layout table.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    PresentationRole,
    TooFewRows { rows: usize, min: usize },
    TooFewColumns { columns: usize, min: usize },
    InteractiveDominant { ratio: f64, max: f64 },
    LayoutClass { token: String },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PresentationRole => f.write_str("presentation role"),
            Self::TooFewRows { rows, min } => write!(f, "{rows} rows, need {min}"),
            Self::TooFewColumns { columns, min } => {
                write!(f, "{columns} columns, need {min}")
            }
            Self::InteractiveDominant { ratio, max } => {
                write!(f, "interactive ratio {ratio:.2} above {max:.2}")
            }
            Self::LayoutClass { token } => write!(f, "layout class '{token}'"),
        }
    }
}

/// Measurements taken while judging a standard table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableMetrics {
    pub rows: usize,
    pub columns: usize,
    pub data_cells: usize,
    pub interactive_cells: usize,
}

impl TableMetrics {
    /// Fraction of data cells that are interactive-dominant; `None` for a
    /// header-only table.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "cell counts stay far below f64 mantissa range"
    )]
    pub fn interactive_ratio(&self) -> Option<f64> {
        (self.data_cells > 0).then(|| self.interactive_cells as f64 / self.data_cells as f64)
    }
}

/// Outcome of the data-table heuristic.
///
/// `metrics` is `None` when the heuristic did not run: component grids and
/// disabled filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub metrics: Option<TableMetrics>,
    pub rejection: Option<Rejection>,
}

impl Verdict {
    fn accepted(metrics: Option<TableMetrics>) -> Self {
        Self {
            metrics,
            rejection: None,
        }
    }

    fn rejected(metrics: TableMetrics, rejection: Rejection) -> Self {
        Self {
            metrics: Some(metrics),
            rejection: Some(rejection),
        }
    }

    #[must_use]
    pub fn is_data_table(&self) -> bool {
        self.rejection.is_none()
    }
}

/// A page structure together with its markup kind and verdict.
#[derive(Clone)]
pub struct ClassificationHandle {
    node: Handle,
    kind: MarkupKind,
    verdict: Verdict,
}

impl ClassificationHandle {
    #[must_use]
    pub fn node(&self) -> &Handle {
        &self.node
    }

    #[must_use]
    pub fn kind(&self) -> MarkupKind {
        self.kind
    }

    #[must_use]
    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    /// Returns `true` if both handles wrap the same node.
    #[must_use]
    pub fn same_node(&self, other: &Self) -> bool {
        std::rc::Rc::ptr_eq(&self.node, &other.node)
    }
}

impl fmt::Debug for ClassificationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationHandle")
            .field("tag", &dom::tag(&self.node))
            .field("kind", &self.kind)
            .field("verdict", &self.verdict)
            .finish()
    }
}

/// Classifies a single node. Returns `None` if it is not a table root.
#[must_use]
pub fn classify(node: &Handle, config: &FilterConfig) -> Option<ClassificationHandle> {
    let kind = MarkupKind::detect(node)?;
    let verdict = if kind.is_component() {
        Verdict::accepted(None)
    } else {
        judge_standard(node, config)
    };
    Some(ClassificationHandle {
        node: node.clone(),
        kind,
        verdict,
    })
}

/// Runs the data-table heuristic on a plain `<table>`.
///
/// The checks short-circuit in order: presentation role, row count, first
/// row column count, interactive ratio, layout class tokens.
#[must_use]
pub fn judge_standard(table: &Handle, config: &FilterConfig) -> Verdict {
    if !config.enabled {
        return Verdict::accepted(None);
    }
    let metrics = measure(table);

    if dom::attr(table, "role").is_some_and(|r| {
        let r = r.trim();
        r.eq_ignore_ascii_case("presentation") || r.eq_ignore_ascii_case("none")
    }) {
        return Verdict::rejected(metrics, Rejection::PresentationRole);
    }
    if metrics.rows < config.min_rows {
        return Verdict::rejected(
            metrics,
            Rejection::TooFewRows {
                rows: metrics.rows,
                min: config.min_rows,
            },
        );
    }
    if metrics.columns < config.min_cols {
        return Verdict::rejected(
            metrics,
            Rejection::TooFewColumns {
                columns: metrics.columns,
                min: config.min_cols,
            },
        );
    }
    if let Some(ratio) = metrics.interactive_ratio() {
        if ratio > config.max_interactive_ratio {
            return Verdict::rejected(
                metrics,
                Rejection::InteractiveDominant {
                    ratio,
                    max: config.max_interactive_ratio,
                },
            );
        }
    }
    let class = dom::attr(table, "class")
        .unwrap_or_default()
        .to_lowercase();
    if let Some(token) = config
        .layout_tokens
        .iter()
        .find(|t| !t.is_empty() && class.contains(&t.to_lowercase()))
    {
        return Verdict::rejected(
            metrics,
            Rejection::LayoutClass {
                token: token.clone(),
            },
        );
    }
    Verdict::accepted(Some(metrics))
}

fn measure(table: &Handle) -> TableMetrics {
    let rows = dom::descendants(table, |h| dom::is_tag(h, "tr"));
    let columns = rows.first().map_or(0, |first| {
        dom::descendants(first, |h| dom::is_tag(h, "th") || dom::is_tag(h, "td")).len()
    });
    let cells = dom::descendants(table, |h| dom::is_tag(h, "td"));
    let interactive_cells = cells.iter().filter(|c| is_interactive_dominant(c)).count();
    TableMetrics {
        rows: rows.len(),
        columns,
        data_cells: cells.len(),
        interactive_cells,
    }
}

/// A cell is interactive-dominant if it holds a control, or if its single
/// element child is (or wraps) an image.
fn is_interactive_dominant(cell: &Handle) -> bool {
    if dom::any_descendant(cell, |h| INTERACTIVE_TAGS.iter().any(|t| dom::is_tag(h, t))) {
        return true;
    }
    match dom::element_children(cell).as_slice() {
        [only] => dom::is_tag(only, "img") || dom::any_descendant(only, |h| dom::is_tag(h, "img")),
        _ => false,
    }
}

/// How the extract affordance of a registered table is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    OnHover,
    Pinned,
    /// The table left the page, went invisible, or the site is disabled.
    Suppressed,
}

/// A registered data table.
#[derive(Debug, Clone)]
pub struct Registration {
    pub handle: ClassificationHandle,
    pub affordance: Affordance,
}

/// Page-level scan state.
#[derive(Debug)]
pub struct Scanner {
    config: FilterConfig,
    site_disabled: bool,
    registrations: Vec<Registration>,
}

impl Scanner {
    #[must_use]
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            site_disabled: false,
            registrations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_site_disabled(mut self, disabled: bool) -> Self {
        self.site_disabled = disabled;
        self
    }

    #[must_use]
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    #[must_use]
    pub fn is_site_disabled(&self) -> bool {
        self.site_disabled
    }

    #[must_use]
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    /// Handles of every registered table, in registration order.
    #[must_use]
    pub fn handles(&self) -> Vec<ClassificationHandle> {
        self.registrations.iter().map(|r| r.handle.clone()).collect()
    }

    /// Applies a site enable/disable notification.
    ///
    /// Disabling suppresses every affordance immediately. Re-enabling takes
    /// effect on the next [`scan`](Self::scan).
    pub fn notify(&mut self, status: SiteStatus) {
        self.site_disabled = status.disabled;
        if status.disabled {
            for reg in &mut self.registrations {
                reg.affordance = Affordance::Suppressed;
            }
        }
    }

    /// Scans the tree under `root` and registers new data tables.
    ///
    /// Safe to call any number of times: nodes already carrying
    /// [`MARKER_ATTR`] are skipped, and existing registrations only have their
    /// affordance refreshed.
    pub fn scan(&mut self, root: &Handle) -> Vec<ClassificationHandle> {
        self.refresh(root);
        if self.site_disabled {
            debug!("site disabled, scan skipped");
            return self.handles();
        }

        let mut candidates = Vec::new();
        collect_candidates(root, false, &mut candidates);
        for node in candidates {
            if dom::attr(&node, MARKER_ATTR).is_some() {
                continue;
            }
            let Some(handle) = classify(&node, &self.config) else {
                continue;
            };
            if let Some(rejection) = &handle.verdict.rejection {
                debug!(kind = %handle.kind, %rejection, "skipping layout table");
                continue;
            }
            dom::set_attr(&node, MARKER_ATTR, "true");
            let affordance = self.affordance_for(&node, root);
            debug!(kind = %handle.kind, ?affordance, "registered table");
            self.registrations.push(Registration { handle, affordance });
        }
        self.handles()
    }

    fn refresh(&mut self, root: &Handle) {
        let states: Vec<Affordance> = self
            .registrations
            .iter()
            .map(|r| self.affordance_for(r.handle.node(), root))
            .collect();
        for (reg, affordance) in self.registrations.iter_mut().zip(states) {
            reg.affordance = affordance;
        }
    }

    fn affordance_for(&self, node: &Handle, root: &Handle) -> Affordance {
        if self.site_disabled || !dom::is_attached(node, root) || dom::is_hidden(node) {
            return Affordance::Suppressed;
        }
        match self.config.hover_mode {
            DisplayMode::Always => Affordance::Pinned,
            DisplayMode::Hover => Affordance::OnHover,
        }
    }
}

/// Collects table roots in document order. Plain tables inside a component
/// wrapper are skipped.
fn collect_candidates(handle: &Handle, in_component: bool, out: &mut Vec<Handle>) {
    let mut inside = in_component;
    if let NodeData::Element { .. } = handle.data {
        match MarkupKind::detect(handle) {
            Some(kind) if kind.is_component() => {
                out.push(handle.clone());
                inside = true;
            }
            Some(_) if !in_component => out.push(handle.clone()),
            _ => {}
        }
    }
    for child in handle.children.borrow().iter() {
        collect_candidates(child, inside, out);
    }
}

/// Classifies every table root under `root` without registering anything,
/// rejected tables included.
#[must_use]
pub fn survey(root: &Handle, config: &FilterConfig) -> Vec<ClassificationHandle> {
    let mut candidates = Vec::new();
    collect_candidates(root, false, &mut candidates);
    candidates
        .iter()
        .filter_map(|node| classify(node, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    fn first_table(html: &str) -> (markup5ever_rcdom::RcDom, Handle) {
        let dom = parse_html(html);
        let table = dom::first_descendant(&dom.document, |h| dom::is_tag(h, "table"))
            .expect("table present");
        (dom, table)
    }

    #[test]
    fn detects_markup_kinds() {
        let dom = parse_html(
            r#"<div class="el-table"></div><div class="ant-table-wrapper"></div><table></table>"#,
        );
        let kinds: Vec<_> = dom::descendants(&dom.document, |_| true)
            .iter()
            .filter_map(MarkupKind::detect)
            .collect();
        assert_eq!(
            kinds,
            vec![MarkupKind::ElementUi, MarkupKind::AntDesign, MarkupKind::Standard]
        );
    }

    #[test]
    fn single_row_is_rejected() {
        let (_dom, table) = first_table("<table><tr><td>a</td><td>b</td></tr></table>");
        let verdict = judge_standard(&table, &FilterConfig::default());
        assert_eq!(
            verdict.rejection,
            Some(Rejection::TooFewRows { rows: 1, min: 2 })
        );
    }

    #[test]
    fn role_check_runs_first() {
        let (_dom, table) =
            first_table(r#"<table role="presentation" class="nav"><tr><td>a</td></tr></table>"#);
        let verdict = judge_standard(&table, &FilterConfig::default());
        assert_eq!(verdict.rejection, Some(Rejection::PresentationRole));
    }

    #[test]
    fn header_only_table_skips_ratio_but_not_class_check() {
        let html = r#"<table class="sidebar"><tr><th>a</th><th>b</th></tr><tr><th>c</th><th>d</th></tr></table>"#;
        let (_dom, table) = first_table(html);
        let verdict = judge_standard(&table, &FilterConfig::default());
        assert_eq!(verdict.metrics.and_then(|m| m.interactive_ratio()), None);
        assert_eq!(
            verdict.rejection,
            Some(Rejection::LayoutClass {
                token: "sidebar".into()
            })
        );
    }

    #[test]
    fn image_only_cells_count_as_interactive() {
        let html = "<table><tr><td><img src=x></td><td><span><img src=y></span></td></tr>\
                    <tr><td><img src=z> caption</td><td>text</td></tr></table>";
        let (_dom, table) = first_table(html);
        let metrics = measure(&table);
        assert_eq!(metrics.data_cells, 4);
        assert_eq!(metrics.interactive_cells, 3);
    }

    #[test]
    fn disabled_filter_accepts_everything() {
        let (_dom, table) = first_table(r#"<table role="presentation"></table>"#);
        let config = FilterConfig {
            enabled: false,
            ..FilterConfig::default()
        };
        let verdict = judge_standard(&table, &config);
        assert!(verdict.is_data_table());
        assert!(verdict.metrics.is_none());
    }

    #[test]
    fn nested_tables_are_left_to_the_wrapper() {
        let dom = parse_html(
            r#"<div class="ant-table-wrapper"><table><tr><td>1</td></tr></table></div>"#,
        );
        let mut out = Vec::new();
        collect_candidates(&dom.document, false, &mut out);
        assert_eq!(out.len(), 1);
        assert!(dom::has_class(&out[0], ANT_DESIGN_ROOT));
    }
}
