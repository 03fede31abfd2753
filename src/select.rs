//! Select input with an infinitely scrolling option popover.
//!
//! The closed select renders one trigger line with the committed option (or a
//! placeholder). Opening it shows a scrollable window of options backed by an
//! [`InfiniteList`]; the window is a [`viewport::Model`] and its last option
//! carries a [`ViewportSentinel`]. Every time the cursor moves, the search
//! changes or a page arrives, the sentinel is observed and a proximity hit
//! requests the next page. Typed characters narrow the loaded options by
//! label.
//!
//! ```rust
//! use datagrid_widgets::error::FetchError;
//! use datagrid_widgets::infinite::OptionItem;
//! use datagrid_widgets::select::{Model, SelectOptions};
//!
//! let select = Model::new(
//!     |page: u32| async move {
//!         Ok::<_, FetchError>(vec![OptionItem::new(page.to_string(), format!("Page {page}"))])
//!     },
//!     SelectOptions::default().with_placeholder("Pick an advertiser"),
//! );
//! assert!(!select.is_open());
//! assert!(strip_ansi_escapes::strip_str(select.view()).contains("Pick an advertiser"));
//! ```

use bubbletea_rs::{batch, Cmd, KeyMsg, Msg};
use crossterm::event::{KeyCode, KeyModifiers};
use lipgloss_extras::prelude::*;
use serde::{Deserialize, Serialize};

use crate::infinite::{InfiniteList, OptionItem, OptionPageMsg, PageFetcher};
use crate::key::{self, Binding, KeyMap as KeyMapTrait};
use crate::sentinel::ViewportSentinel;
use crate::{spinner, viewport};

/// Popover settings.
///
/// ```rust
/// use datagrid_widgets::select::SelectOptions;
///
/// let options: SelectOptions = serde_json::from_str(r#"{ "popup_height": 5 }"#).unwrap();
/// assert_eq!(options.popup_height, 5);
/// assert_eq!(options.sentinel_margin, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectOptions {
    /// Trigger text while nothing is selected.
    pub placeholder: String,
    /// Option rows visible at once.
    pub popup_height: usize,
    /// How many rows before the end the next page is requested.
    pub sentinel_margin: usize,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            placeholder: "Select…".to_string(),
            popup_height: 8,
            sentinel_margin: 2,
        }
    }
}

impl SelectOptions {
    /// Sets the placeholder (builder).
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Sets the visible option rows (builder).
    pub fn with_popup_height(mut self, height: usize) -> Self {
        self.popup_height = height;
        self
    }

    /// Sets the prefetch margin in rows (builder).
    pub fn with_sentinel_margin(mut self, margin: usize) -> Self {
        self.sentinel_margin = margin;
        self
    }
}

/// Key bindings of the select.
#[derive(Debug, Clone)]
pub struct SelectKeyMap {
    /// Opens the popover. Default: Enter, Space, Down.
    pub open: Binding,
    /// Closes without selecting. Default: Esc.
    pub close: Binding,
    /// Cursor up. Default: Up, Ctrl+P.
    pub up: Binding,
    /// Cursor down. Default: Down, Ctrl+N.
    pub down: Binding,
    /// Cursor one window up. Default: PageUp.
    pub page_up: Binding,
    /// Cursor one window down. Default: PageDown.
    pub page_down: Binding,
    /// Commits the option under the cursor. Default: Enter.
    pub choose: Binding,
    /// Deletes the last search character. Default: Backspace.
    pub delete: Binding,
}

impl Default for SelectKeyMap {
    fn default() -> Self {
        Self {
            open: Binding::new(vec![KeyCode::Enter, KeyCode::Char(' '), KeyCode::Down])
                .with_help("enter", "open"),
            close: Binding::new(vec![KeyCode::Esc]).with_help("esc", "close"),
            up: Binding::with_modifiers(vec![
                (KeyCode::Up, KeyModifiers::NONE),
                (KeyCode::Char('p'), KeyModifiers::CONTROL),
            ])
            .with_help("↑", "up"),
            down: Binding::with_modifiers(vec![
                (KeyCode::Down, KeyModifiers::NONE),
                (KeyCode::Char('n'), KeyModifiers::CONTROL),
            ])
            .with_help("↓", "down"),
            page_up: Binding::new(vec![KeyCode::PageUp]).with_help("pgup", "page up"),
            page_down: Binding::new(vec![KeyCode::PageDown]).with_help("pgdn", "page down"),
            choose: Binding::new(vec![KeyCode::Enter]).with_help("enter", "select"),
            delete: Binding::new(vec![KeyCode::Backspace]).with_help("⌫", "delete"),
        }
    }
}

impl KeyMapTrait for SelectKeyMap {
    fn short_help(&self) -> Vec<&key::Binding> {
        vec![&self.up, &self.down, &self.choose, &self.close]
    }

    fn full_help(&self) -> Vec<Vec<&key::Binding>> {
        vec![
            vec![&self.up, &self.down, &self.page_up, &self.page_down],
            vec![&self.choose, &self.close, &self.delete],
        ]
    }
}

/// Styles of the trigger and popover.
#[derive(Debug, Clone)]
pub struct SelectStyles {
    /// Trigger line showing the committed option.
    pub trigger: Style,
    /// Trigger line while nothing is selected.
    pub placeholder: Style,
    /// Search line.
    pub search: Style,
    /// Option under the cursor.
    pub cursor: Style,
    /// Other options.
    pub option: Style,
    /// Loading row and empty-state text.
    pub muted: Style,
    /// Spinner frame on the loading row.
    pub spinner: Style,
    /// Help line.
    pub help: Style,
}

impl Default for SelectStyles {
    fn default() -> Self {
        let muted = AdaptiveColor {
            Light: "#909090",
            Dark: "#626262",
        };
        Self {
            trigger: Style::new(),
            placeholder: Style::new().foreground(muted.clone()),
            search: Style::new().foreground(AdaptiveColor {
                Light: "#04B575",
                Dark: "#ECFD65",
            }),
            cursor: Style::new().foreground(AdaptiveColor {
                Light: "#EE6FF8",
                Dark: "#EE6FF8",
            }),
            option: Style::new(),
            muted: Style::new().foreground(muted.clone()),
            spinner: Style::new().foreground(AdaptiveColor {
                Light: "#EE6FF8",
                Dark: "#EE6FF8",
            }),
            help: Style::new().foreground(muted),
        }
    }
}

/// Commands produced by one step: a page fetch and the spinner tick that
/// animates it.
#[derive(Default)]
struct Effects {
    fetch: Option<Cmd>,
    tick: Option<Cmd>,
}

impl Effects {
    fn into_cmd(self) -> Option<Cmd> {
        match (self.fetch, self.tick) {
            (Some(fetch), Some(tick)) => Some(batch(vec![fetch, tick])),
            (fetch, tick) => fetch.or(tick),
        }
    }
}

/// The select component.
pub struct Model {
    /// Key bindings.
    pub keymap: SelectKeyMap,
    /// Styles.
    pub styles: SelectStyles,
    list: InfiniteList,
    viewport: viewport::Model,
    sentinel: ViewportSentinel,
    spinner: spinner::Model,
    placeholder: String,
    query: String,
    cursor: usize,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("list", &self.list)
            .field("viewport", &self.viewport)
            .field("sentinel", &self.sentinel)
            .field("query", &self.query)
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl Model {
    /// Creates a closed select loading options through `fetcher`.
    pub fn new(fetcher: impl PageFetcher, options: SelectOptions) -> Self {
        let styles = SelectStyles::default();
        Self {
            keymap: SelectKeyMap::default(),
            spinner: spinner::Model::new().with_style(styles.spinner.clone()),
            styles,
            list: InfiniteList::new(fetcher),
            viewport: viewport::Model::new(options.popup_height.max(1)),
            sentinel: ViewportSentinel::new(options.sentinel_margin),
            placeholder: options.placeholder,
            query: String::new(),
            cursor: 0,
        }
    }

    /// Replaces the styles, including the spinner's (builder).
    pub fn with_styles(mut self, styles: SelectStyles) -> Self {
        self.spinner = self.spinner.with_style(styles.spinner.clone());
        self.styles = styles;
        self
    }

    /// Animates the loading row with `frames`, e.g. [`spinner::DOT`] (builder).
    pub fn with_spinner(mut self, frames: spinner::Spinner) -> Self {
        self.spinner = self.spinner.with_spinner(frames);
        self
    }

    /// Starts with `item` committed (builder).
    pub fn with_selected(mut self, item: OptionItem) -> Self {
        self.list = self.list.with_selected(item);
        self
    }

    /// Loaded options matching the search, in arrival order.
    fn matches(&self) -> Vec<&OptionItem> {
        self.list.search(&self.query)
    }

    /// Re-derives the window, cursor and sentinel after anything that changes
    /// the rows, then requests the next page if the sentinel just came into
    /// view.
    fn refresh(&mut self) -> Effects {
        let len = self.matches().len();
        let loading_row = usize::from(self.list.is_loading());
        self.viewport.set_content_len(len + loading_row);
        self.cursor = self.cursor.min(len.saturating_sub(1));
        self.viewport.ensure_visible(self.cursor);

        match len {
            0 => self.sentinel.detach(),
            n => self.sentinel.attach(n - 1),
        }
        if self.list.is_open() && self.sentinel.observe(&self.viewport) {
            return self.load_more();
        }
        Effects::default()
    }

    fn load_more(&mut self) -> Effects {
        match self.list.on_sentinel_visible() {
            Some(fetch) => self.loading(fetch),
            None => Effects::default(),
        }
    }

    fn loading(&mut self, fetch: Cmd) -> Effects {
        self.viewport.set_content_len(self.matches().len() + 1);
        Effects {
            fetch: Some(fetch),
            tick: Some(self.spinner.tick()),
        }
    }

    fn open_popover(&mut self) -> Effects {
        let mut effects = match self.list.open() {
            Some(fetch) => self.loading(fetch),
            None => Effects::default(),
        };
        let more = self.refresh();
        if effects.fetch.is_none() {
            effects = more;
        }
        effects
    }

    fn close_popover(&mut self) {
        self.list.close();
        self.query.clear();
        self.cursor = 0;
        self.viewport.goto_top();
        self.sentinel.detach();
    }

    fn choose(&mut self) {
        let Some(value) = self.matches().get(self.cursor).map(|item| item.value.clone()) else {
            return;
        };
        self.list.select(&value);
        self.close_popover();
    }

    fn step(&mut self, msg: &Msg) -> Effects {
        if self.list.update(msg) {
            let failed = msg
                .downcast_ref::<OptionPageMsg>()
                .is_some_and(|page| page.result.is_err());
            let effects = self.refresh();
            if failed {
                // Retry on the next key rather than immediately.
                self.sentinel.rearm();
            }
            return effects;
        }

        if let Some(next_tick) = self.spinner.update(msg) {
            return Effects {
                fetch: None,
                tick: self.list.is_loading().then_some(next_tick),
            };
        }

        let Some(key_msg) = msg.downcast_ref::<KeyMsg>() else {
            return Effects::default();
        };

        if !self.list.is_open() {
            if self.keymap.open.matches(key_msg) {
                return self.open_popover();
            }
            return Effects::default();
        }

        let len = self.matches().len();
        if self.keymap.close.matches(key_msg) {
            self.close_popover();
            return Effects::default();
        } else if self.keymap.choose.matches(key_msg) {
            self.choose();
            return Effects::default();
        } else if self.keymap.up.matches(key_msg) {
            self.cursor = self.cursor.saturating_sub(1);
        } else if self.keymap.down.matches(key_msg) {
            if self.cursor + 1 < len {
                self.cursor += 1;
            }
        } else if self.keymap.page_up.matches(key_msg) {
            self.cursor = self.cursor.saturating_sub(self.viewport.height);
        } else if self.keymap.page_down.matches(key_msg) {
            self.cursor = (self.cursor + self.viewport.height).min(len.saturating_sub(1));
        } else if self.keymap.delete.matches(key_msg) {
            self.query.pop();
            self.cursor = 0;
        } else if let KeyCode::Char(c) = key_msg.key {
            if key_msg.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
                return Effects::default();
            }
            self.query.push(c);
            self.cursor = 0;
            self.viewport.goto_top();
        } else {
            return Effects::default();
        }
        self.refresh()
    }

    /// Opens the popover, fetching the first page the first time.
    pub fn open(&mut self) -> Option<Cmd> {
        self.open_popover().into_cmd()
    }

    /// Closes the popover and clears the search. Loaded options are kept.
    pub fn close(&mut self) {
        self.close_popover();
    }

    /// Handles keys, fetched pages and spinner ticks.
    pub fn update(&mut self, msg: &Msg) -> Option<Cmd> {
        self.step(msg).into_cmd()
    }

    /// Whether the popover is open.
    pub fn is_open(&self) -> bool {
        self.list.is_open()
    }

    /// The committed option.
    pub fn selected(&self) -> Option<&OptionItem> {
        self.list.selected()
    }

    /// Value of the committed option.
    pub fn value(&self) -> Option<&str> {
        self.list.selected().map(|item| item.value.as_str())
    }

    /// Current search text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Index of the highlighted option among the search matches.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The option list controller.
    pub fn list(&self) -> &InfiniteList {
        &self.list
    }

    /// The option window.
    pub fn viewport(&self) -> &viewport::Model {
        &self.viewport
    }

    /// One-line key help for the open popover.
    pub fn help_view(&self) -> String {
        let text = self
            .keymap
            .short_help()
            .into_iter()
            .filter(|b| b.enabled())
            .map(|b| format!("{} {}", b.help().key, b.help().desc))
            .collect::<Vec<_>>()
            .join(" • ");
        self.styles.help.render(&text)
    }

    /// Renders the trigger and, when open, the popover below it.
    pub fn view(&self) -> String {
        let trigger = match self.list.selected() {
            Some(item) => self.styles.trigger.render(&format!("▾ {}", item.label)),
            None => self
                .styles
                .placeholder
                .render(&format!("▾ {}", self.placeholder)),
        };
        if !self.list.is_open() {
            return trigger;
        }

        let mut lines = vec![trigger];
        if !self.query.is_empty() {
            lines.push(self.styles.search.render(&format!("  / {}", self.query)));
        }

        let matches = self.matches();
        if matches.is_empty() && !self.list.is_loading() {
            let empty = if self.query.is_empty() {
                "No options."
            } else {
                "No matches."
            };
            lines.push(self.styles.muted.render(&format!("  {empty}")));
        }

        for row in self.viewport.visible_range() {
            match matches.get(row) {
                Some(item) if row == self.cursor => lines.push(
                    self.styles
                        .cursor
                        .render(&format!("> {}", item.label)),
                ),
                Some(item) => lines.push(self.styles.option.render(&format!("  {}", item.label))),
                None => lines.push(format!(
                    "  {} {}",
                    self.spinner.view(),
                    self.styles.muted.render("Loading…")
                )),
            }
        }
        lines.join("\n")
    }
}
