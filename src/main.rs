//! # search-sheet
//!
//! Demo picker: shows the searchable bottom sheet over the terminal and prints
//! the picked item to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use foldhash::HashSet;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};
use search_sheet::options::DEFAULT_MAX_HEIGHT_FRACTION;
use search_sheet::{
    ActionOutcome, CustomSheetOptions, SheetChrome, SheetOptions, Theme, ThemeConfig, show,
    show_custom,
};
use serde::Deserialize;

use std::cell::RefCell;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;
use std::sync::Mutex;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "search-sheet: pick one item from a list through a searchable bottom sheet.\n\
                  The picked item is printed to stdout; nothing is printed when the sheet is dismissed."
)]
struct Args {
    /// Items to choose from
    items: Vec<String>,

    /// JSON file with an array of strings or { "label", "checked" } objects
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Title shown above the search box
    #[arg(long)]
    title: Option<String>,

    /// Placeholder shown in the empty search box
    #[arg(long, default_value = "Search")]
    hint: String,

    /// Sort items alphabetically before showing them
    #[arg(long)]
    sort: bool,

    /// Multi-select: toggle checkboxes until the sheet is dismissed
    #[arg(long)]
    checkbox: bool,

    /// Allow deleting items from the list with Ctrl+D or the ✗ glyph
    #[arg(long)]
    deletable: bool,

    /// Fraction of the terminal height the sheet may use
    #[arg(long, default_value_t = DEFAULT_MAX_HEIGHT_FRACTION)]
    max_height: f32,

    /// Show labels exactly as given
    #[arg(long)]
    no_capitalize: bool,

    /// UI theme (dracula, solarized, gruvbox, everforest_light)
    #[arg(short, long)]
    theme: Option<String>,

    /// Show information about the demo in a custom sheet and exit
    #[arg(long)]
    about: bool,

    /// Write debug logs to this file
    #[arg(long)]
    log: Option<PathBuf>,
}

/// One entry of the `--file` JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum DemoItem {
    Label(String),
    Entry {
        label: String,
        #[serde(default)]
        checked: bool,
    },
}

impl DemoItem {
    fn into_parts(self) -> (String, bool) {
        match self {
            DemoItem::Label(label) => (label, false),
            DemoItem::Entry { label, checked } => (label, checked),
        }
    }
}

fn parse_items(json: &str) -> Result<Vec<DemoItem>> {
    serde_json::from_str(json).context("items file must be a JSON array")
}

/// Positional items first, then file items. Returns the labels and the
/// labels that start out checked.
fn collect_items(args: &Args) -> Result<(Vec<String>, HashSet<String>)> {
    let mut labels = args.items.clone();
    let mut checked = HashSet::default();
    if let Some(path) = &args.file {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        for item in parse_items(&json)? {
            let (label, is_checked) = item.into_parts();
            if is_checked {
                checked.insert(label.clone());
            }
            labels.push(label);
        }
    }
    Ok((labels, checked))
}

fn setup_tracing(path: &Path) -> Result<()> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("search_sheet=debug"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();
    Ok(())
}

fn chrome(args: &Args, theme: &ThemeConfig) -> SheetChrome {
    SheetChrome {
        theme: theme.clone(),
        max_height_fraction: args.max_height,
        ..SheetChrome::default()
    }
}

fn build_options(
    args: &Args,
    theme: &ThemeConfig,
    data: Rc<Vec<String>>,
) -> SheetOptions<String> {
    let mut options = SheetOptions::new(
        data,
        args.hint.clone(),
        |item: &String| Line::from(item.clone()),
        |item: &String, query: &str| item.to_lowercase().contains(&query.to_lowercase()),
    )
    .with_chrome(chrome(args, theme))
    .with_auto_capitalize(!args.no_capitalize);

    if let Some(title) = &args.title {
        options = options.with_title(title.clone());
    }
    if args.sort {
        options = options.with_sort(|items: &[String]| {
            let mut sorted = items.to_vec();
            sorted.sort_by_key(|item| item.to_lowercase());
            sorted
        });
    }
    options
}

/// Adds a delete action that removes the item from `backing` and hands the
/// sheet the shortened list.
fn with_delete(
    options: SheetOptions<String>,
    backing: Rc<RefCell<Vec<String>>>,
) -> SheetOptions<String> {
    options.with_on_delete(move |item: &String, _visible_idx| {
        let mut items = backing.borrow_mut();
        items.retain(|existing| existing != item);
        ActionOutcome::Replace(Rc::new(items.clone()))
    })
}

fn toggle(checked: &mut HashSet<String>, item: String) {
    if !checked.remove(&item) {
        checked.insert(item);
    }
}

fn about_view(theme: &ThemeConfig) -> Text<'static> {
    let key = Style::default().add_modifier(Modifier::BOLD);
    let rows = [
        ("type", "filter the list"),
        ("↑ ↓ PgUp PgDn", "move the highlight"),
        ("Enter / click", "pick the highlighted item"),
        ("Ctrl+U", "clear the search"),
        ("Ctrl+D", "delete the item (with --deletable)"),
        ("Esc / drag down", "dismiss"),
    ];
    let mut lines = vec![
        Line::from(Span::styled("search-sheet", theme.title)),
        Line::from(""),
    ];
    lines.extend(rows.iter().map(|(keys, action)| {
        Line::from(vec![
            Span::styled(format!("{keys:<18}"), key),
            Span::styled(*action, theme.text),
        ])
    }));
    Text::from(lines)
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log {
        setup_tracing(path)?;
    }

    let theme_name = args.theme.as_deref().unwrap_or("dracula");
    let theme = Theme::from_str(theme_name)
        .map_err(anyhow::Error::msg)?
        .config();

    if args.about {
        let options = CustomSheetOptions::new(about_view(&theme)).with_chrome(chrome(&args, &theme));
        show_custom(options)?;
        return Ok(());
    }

    let (labels, mut checked) = collect_items(&args)?;
    let backing = Rc::new(RefCell::new(labels));

    if args.checkbox {
        loop {
            let data = Rc::new(backing.borrow().clone());
            let snapshot = checked.clone();
            let mut options = build_options(&args, &theme, data)
                .with_checkbox(move |item: &String| snapshot.contains(item));
            if args.deletable {
                options = with_delete(options, Rc::clone(&backing));
            }
            match show(options)? {
                Some(item) => toggle(&mut checked, item),
                None => break,
            }
        }
        for label in backing.borrow().iter().filter(|label| checked.contains(*label)) {
            println!("{label}");
        }
        return Ok(());
    }

    let data = Rc::new(backing.borrow().clone());
    let mut options = build_options(&args, &theme, data);
    if args.deletable {
        options = with_delete(options, Rc::clone(&backing));
    }
    if let Some(item) = show(options)? {
        println!("{item}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["search-sheet"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_parse_items_accepts_strings_and_objects() {
        let items = parse_items(r#"["Apple", {"label": "Banana", "checked": true}, {"label": "Cherry"}]"#)
            .unwrap();
        assert_eq!(
            items,
            vec![
                DemoItem::Label("Apple".to_string()),
                DemoItem::Entry {
                    label: "Banana".to_string(),
                    checked: true
                },
                DemoItem::Entry {
                    label: "Cherry".to_string(),
                    checked: false
                },
            ]
        );
    }

    #[test]
    fn test_parse_items_rejects_non_array() {
        assert!(parse_items(r#"{"label": "Apple"}"#).is_err());
    }

    #[test]
    fn test_collect_items_from_positional_args() {
        let (labels, checked) = collect_items(&args(&["Apple", "Banana"])).unwrap();
        assert_eq!(labels, vec!["Apple", "Banana"]);
        assert!(checked.is_empty());
    }

    #[test]
    fn test_args_defaults() {
        let args = args(&[]);
        assert_eq!(args.hint, "Search");
        assert_eq!(args.max_height, DEFAULT_MAX_HEIGHT_FRACTION);
        assert!(!args.checkbox);
    }

    #[test]
    fn test_toggle_flips_membership() {
        let mut checked = HashSet::default();
        toggle(&mut checked, "Apple".to_string());
        assert!(checked.contains("Apple"));
        toggle(&mut checked, "Apple".to_string());
        assert!(checked.is_empty());
    }

    #[test]
    fn test_delete_hands_back_shortened_list() {
        let backing = Rc::new(RefCell::new(vec!["Apple".to_string(), "Banana".to_string()]));
        let theme = ThemeConfig::default();
        let data = Rc::new(backing.borrow().clone());
        let mut options = with_delete(build_options(&args(&[]), &theme, data), Rc::clone(&backing));
        let on_delete = options.on_delete.as_mut().unwrap();
        match on_delete(&"Apple".to_string(), 0) {
            ActionOutcome::Replace(items) => assert_eq!(*items, vec!["Banana".to_string()]),
            ActionOutcome::Keep => panic!("expected a replacement list"),
        }
        assert_eq!(*backing.borrow(), vec!["Banana".to_string()]);
    }

    #[test]
    fn test_sort_flag_orders_case_insensitively() {
        let theme = ThemeConfig::default();
        let options = build_options(
            &args(&["--sort"]),
            &theme,
            Rc::new(vec!["banana".to_string(), "Apple".to_string()]),
        );
        let sort = options.sort_items.as_ref().unwrap();
        assert_eq!(sort(options.data.as_slice()), vec!["Apple", "banana"]);
    }
}
