use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use rayon::prelude::*;
use tablegrab::{
    ExtractionSession, FilterConfig, Format, Role, Scanner, SelectionRange, Settings,
    classify::{self, ClassificationHandle},
    classify_and_scan,
    config::{JsonFileStore, load_or_default, save_quietly, site_key},
    dom, io, normalize,
    session::Tab,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Find data tables in HTML pages and convert them")]
struct Cli {
    /// List detected tables instead of converting them
    #[arg(long)]
    list: bool,
    /// Output format: markdown, json, csv, sql-insert, sql-update or
    /// spreadsheet-xml
    #[arg(long, short, default_value = "markdown")]
    format: Format,
    /// Only convert the data table with this index
    #[arg(long)]
    table: Option<usize>,
    /// Target table name for SQL output
    #[arg(long = "sql-table", default_value = "table_data")]
    sql_table: String,
    /// Rename a column for SQL output, as `index=name`
    #[arg(long, value_parser = parse_rename)]
    rename: Vec<(usize, String)>,
    /// Leave a column out of INSERT statements
    #[arg(long = "no-insert")]
    no_insert: Vec<usize>,
    /// Columns assigned in UPDATE ... SET (replaces the default set)
    #[arg(long = "set")]
    set_cols: Vec<usize>,
    /// Columns matched in UPDATE ... WHERE (replaces the default key)
    #[arg(long = "where")]
    where_cols: Vec<usize>,
    /// Print the selected range as tab-separated text, as `row,col:row,col`
    /// with row -1 for the header row
    #[arg(long, allow_hyphen_values = true)]
    select: Option<SelectionRange>,
    /// Print a fixed-width preview grid
    #[arg(long)]
    preview: bool,
    /// Write export files into this directory instead of printing
    #[arg(long, conflicts_with_all = ["preview", "select", "list"])]
    out: Option<PathBuf>,
    /// URL the documents were loaded from; disabled sites yield no tables
    #[arg(long)]
    site: Option<String>,
    /// Settings file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Add a site to the disabled list in the settings file
    #[arg(long = "disable-site", requires = "config")]
    disable_site: Option<String>,
    /// Remove a site from the disabled list in the settings file
    #[arg(long = "enable-site", requires = "config")]
    enable_site: Option<String>,
    #[command(flatten)]
    filter: FilterArgs,
    /// Log scan decisions to stderr
    #[arg(long, short)]
    verbose: bool,
    /// HTML files to read; stdin when empty
    files: Vec<PathBuf>,
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Treat every table as a data table
    #[arg(long = "no-filter")]
    no_filter: bool,
    /// Minimum row count of a data table
    #[arg(long = "min-rows")]
    min_rows: Option<usize>,
    /// Minimum first-row cell count of a data table
    #[arg(long = "min-cols")]
    min_cols: Option<usize>,
    /// Interactive cell fraction above which a table is layout
    #[arg(long = "max-interactive-ratio")]
    max_interactive_ratio: Option<f64>,
}

impl FilterArgs {
    fn apply(&self, mut config: FilterConfig) -> FilterConfig {
        if self.no_filter {
            config.enabled = false;
        }
        if let Some(n) = self.min_rows {
            config.min_rows = n;
        }
        if let Some(n) = self.min_cols {
            config.min_cols = n;
        }
        if let Some(r) = self.max_interactive_ratio {
            config.max_interactive_ratio = r;
        }
        config
    }
}

fn parse_rename(arg: &str) -> Result<(usize, String), String> {
    let (col, name) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected index=name, got '{arg}'"))?;
    let col = col
        .trim()
        .parse()
        .map_err(|_| format!("invalid column index '{col}'"))?;
    Ok((col, name.to_string()))
}

/// One piece of output for a document.
struct Rendered {
    format: Format,
    text: String,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tablegrab=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Applies `--disable-site` / `--enable-site`. Returns `true` if the
/// settings changed.
fn edit_sites(cli: &Cli, settings: &mut Settings) -> anyhow::Result<bool> {
    let mut changed = false;
    if let Some(url) = &cli.disable_site {
        let key = site_key(url).with_context(|| format!("invalid site URL '{url}'"))?;
        if !settings.is_disabled(&key) {
            settings.toggle_site(&key);
            changed = true;
        }
        info!(site = %key, "site disabled");
    }
    if let Some(url) = &cli.enable_site {
        let key = site_key(url).with_context(|| format!("invalid site URL '{url}'"))?;
        changed |= settings.remove_site(&key);
        info!(site = %key, "site enabled");
    }
    Ok(changed)
}

fn configure(session: &mut ExtractionSession, cli: &Cli) {
    session.set_sql_table_name(&cli.sql_table);
    for (col, name) in &cli.rename {
        session.rename_column(*col, name);
    }
    for &col in &cli.no_insert {
        session.set_column_role(col, Role::Insert, false);
    }
    let width = session.table().map_or(0, tablegrab::CanonicalTable::width);
    if !cli.set_cols.is_empty() {
        for col in 0..width {
            session.set_column_role(col, Role::Set, cli.set_cols.contains(&col));
        }
    }
    if !cli.where_cols.is_empty() {
        for col in 0..width {
            session.set_column_role(col, Role::Where, cli.where_cols.contains(&col));
        }
    }
    if let Some(range) = cli.select {
        session.select(range);
    }
}

fn list_line(index: Option<usize>, handle: &ClassificationHandle) -> String {
    let table = normalize(handle);
    let verdict = handle
        .verdict()
        .rejection
        .as_ref()
        .map_or_else(|| "data".to_string(), |r| format!("layout ({r})"));
    format!(
        "{}\t{}\t{}x{}\t{verdict}",
        index.map_or_else(|| "-".to_string(), |i| i.to_string()),
        handle.kind(),
        table.rows.len(),
        table.width(),
    )
}

fn render_document(
    path: &Path,
    cli: &Cli,
    filter: &FilterConfig,
    site_disabled: bool,
) -> anyhow::Result<Vec<Rendered>> {
    let html = io::read_document(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let doc = dom::parse_html(&html);
    let mut scanner = Scanner::new(filter.clone()).with_site_disabled(site_disabled);
    let handles = classify_and_scan(&mut scanner, &doc.document);
    debug!(path = %path.display(), tables = handles.len(), "document scanned");

    if cli.list {
        let mut index = 0;
        let lines: Vec<String> = classify::survey(&doc.document, filter)
            .iter()
            .map(|handle| {
                let registered = handles.iter().any(|h| h.same_node(handle));
                let shown = registered.then(|| {
                    index += 1;
                    index - 1
                });
                list_line(shown, handle)
            })
            .collect();
        return Ok(vec![Rendered {
            format: cli.format,
            text: lines.join("\n"),
        }]);
    }

    if let Some(wanted) = cli.table {
        if wanted >= handles.len() && !site_disabled {
            bail!(
                "{}: no data table {wanted} ({} found)",
                path.display(),
                handles.len()
            );
        }
    }

    let mut out = Vec::new();
    for (idx, handle) in handles.iter().enumerate() {
        if cli.table.is_some_and(|wanted| wanted != idx) {
            continue;
        }
        let mut session = ExtractionSession::new();
        session.open(normalize(handle));
        configure(&mut session, cli);
        let text = if cli.preview {
            session.output().into_owned()
        } else if cli.select.is_some() {
            session.selection_text().unwrap_or_default()
        } else {
            session.select_tab(Tab::Output(cli.format));
            session.output().into_owned()
        };
        out.push(Rendered {
            format: cli.format,
            text,
        });
    }
    Ok(out)
}

fn emit(cli: &Cli, outputs: Vec<Rendered>, millis: &mut u128) -> anyhow::Result<()> {
    let Some(dir) = &cli.out else {
        if !outputs.is_empty() {
            let texts: Vec<String> = outputs.into_iter().map(|r| r.text).collect();
            println!("{}", texts.join("\n\n"));
        }
        return Ok(());
    };
    for rendered in outputs {
        let name = loop {
            let name = io::export_file_name(rendered.format, *millis);
            *millis += 1;
            if !dir.join(&name).exists() {
                break name;
            }
        };
        let path = io::write_export(dir, &name, &rendered.text)
            .with_context(|| format!("failed to write {}", dir.join(&name).display()))?;
        println!("{}", path.display());
    }
    Ok(())
}

/// Entry point: loads settings, scans every input document in parallel and
/// prints or writes the results in input order.
///
/// # Examples
///
/// ```sh
/// # Every data table of a saved page as Markdown
/// tablegrab page.html
///
/// # The second table as UPDATE statements keyed on column 0
/// tablegrab --table 1 --format sql-update --sql-table users page.html
///
/// # Header row plus the first two data rows of columns 0-1
/// tablegrab --select -1,0:1,1 page.html
/// ```
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store = cli.config.as_ref().map(JsonFileStore::new);
    let mut settings = store
        .as_ref()
        .map_or_else(Settings::default, |s| load_or_default(s));

    if let Some(store) = &store {
        if edit_sites(&cli, &mut settings)? {
            save_quietly(store, &settings);
        }
        if cli.files.is_empty() && (cli.disable_site.is_some() || cli.enable_site.is_some()) {
            return Ok(());
        }
    }

    let filter = cli.filter.apply(settings.table_filter_config.clone());
    let site_disabled = match &cli.site {
        Some(url) => {
            let key = site_key(url).with_context(|| format!("invalid site URL '{url}'"))?;
            settings.is_disabled(&key)
        }
        None => false,
    };
    if site_disabled {
        info!("site is disabled, no tables will be extracted");
    }

    let inputs = if cli.files.is_empty() {
        vec![PathBuf::from("-")]
    } else {
        cli.files.clone()
    };
    let results: Vec<_> = inputs
        .par_iter()
        .map(|path| render_document(path, &cli, &filter, site_disabled))
        .collect();

    let mut millis = io::unix_millis();
    let mut failure = None;
    for result in results {
        match result {
            Ok(outputs) => emit(&cli, outputs, &mut millis)?,
            Err(err) => {
                if failure.is_none() {
                    failure = Some(err);
                }
            }
        }
    }
    failure.map_or(Ok(()), Err)
}
