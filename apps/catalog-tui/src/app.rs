//! Application state and rendering

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use catalog_client::listing::EMPTY_MESSAGE;
use catalog_client::{ClientError, FetchOutcome, FetchRequest, ListView, ListingState, VirtualWindow};
use catalog_core::Item;

/// What the event loop should do after a key press
#[derive(Debug)]
pub enum Action {
    None,
    Quit,
    Fetch(FetchRequest),
    Open(i64),
}

/// Results delivered from background tasks
#[derive(Debug)]
pub enum Message {
    Listing(FetchOutcome),
    Detail(i64, Result<Item, ClientError>),
}

/// Main application state
pub struct App {
    /// Search, paging and fetched rows
    pub listing: ListingState,
    /// Selected row within the current page
    pub selected: usize,
    /// First visible line of the list
    pub scroll: u32,
    /// Lines available for rows at the last render
    pub list_height: u32,
    /// Status line
    pub status: Option<String>,
}

impl App {
    pub fn new() -> Self {
        Self {
            listing: ListingState::new(),
            selected: 0,
            scroll: 0,
            list_height: 0,
            status: None,
        }
    }

    pub fn start(&mut self) -> FetchRequest {
        self.listing.start()
    }

    pub fn receive(&mut self, message: Message) {
        match message {
            Message::Listing(outcome) => {
                if self.listing.apply(outcome) {
                    self.selected = 0;
                    self.scroll = 0;
                    self.status = self
                        .listing
                        .last_error()
                        .map(|e| format!("Failed to fetch items: {e}"));
                }
            }
            Message::Detail(_, Ok(item)) => {
                let price = item
                    .fields
                    .get("price")
                    .map_or_else(|| "-".to_string(), |p| p.to_string());
                self.status = Some(format!("{} | price {} | {}", item.name(), price, item.link()));
            }
            Message::Detail(id, Err(e)) => {
                tracing::error!("Failed to open item {}: {}", id, e);
                self.status = Some(format!("Item {id}: {e}"));
            }
        }
    }

    /// Handle a key press
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Action {
        match code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
            KeyCode::Char(c) => Action::Fetch(self.listing.push_search_char(c)),
            KeyCode::Backspace => self.listing.pop_search_char().map_or(Action::None, Action::Fetch),
            KeyCode::Left | KeyCode::PageUp => self.listing.prev_page().map_or(Action::None, Action::Fetch),
            KeyCode::Right | KeyCode::PageDown => {
                self.listing.next_page().map_or(Action::None, Action::Fetch)
            }
            KeyCode::Up => {
                self.move_selection(-1);
                Action::None
            }
            KeyCode::Down => {
                self.move_selection(1);
                Action::None
            }
            KeyCode::Enter => match self.listing.view() {
                ListView::Rows(items) => items
                    .get(self.selected)
                    .map_or(Action::None, |item| Action::Open(item.id)),
                _ => Action::None,
            },
            _ => Action::None,
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let count = self.listing.items().len();
        if count == 0 {
            return;
        }
        self.selected = self.selected.saturating_add_signed(delta).min(count - 1);
        self.scroll = self.window().scroll_to(self.selected, self.scroll, count);
    }

    fn window(&self) -> VirtualWindow {
        VirtualWindow::new(1, self.list_height)
    }

    /// Render the application
    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search input
                Constraint::Length(1), // Search help
                Constraint::Min(0),    // Item list
                Constraint::Length(1), // Pager
                Constraint::Length(1), // Status line
            ])
            .split(frame.area());

        self.render_search(frame, chunks[0]);
        frame.render_widget(
            Paragraph::new("Use the input above to filter items by name.")
                .style(Style::default().fg(Color::DarkGray)),
            chunks[1],
        );
        self.render_list(frame, chunks[2]);
        self.render_pager(frame, chunks[3]);
        self.render_status(frame, chunks[4]);
    }

    fn render_search(&self, frame: &mut Frame, area: Rect) {
        let text = if self.listing.search().is_empty() {
            Span::styled("Type to search...", Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(self.listing.search())
        };
        let input = Paragraph::new(Line::from(text))
            .block(Block::default().title("Search items").borders(Borders::ALL));
        frame.render_widget(input, area);
    }

    fn render_list(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title("Items").borders(Borders::ALL);
        self.list_height = u32::from(block.inner(area).height);

        match self.listing.view() {
            ListView::Loading => {
                let loading = Paragraph::new("Loading items...").block(block);
                frame.render_widget(loading, area);
            }
            ListView::Empty => {
                let empty = Paragraph::new(EMPTY_MESSAGE)
                    .style(Style::default().fg(Color::DarkGray))
                    .block(block);
                frame.render_widget(empty, area);
            }
            ListView::Rows(items) => {
                let range = self.window().visible_range(items.len(), self.scroll);
                let rows: Vec<ListItem> = items[range.clone()]
                    .iter()
                    .zip(range)
                    .map(|(item, index)| self.row(item, index))
                    .collect();
                frame.render_widget(List::new(rows).block(block), area);
            }
        }
    }

    fn row(&self, item: &Item, index: usize) -> ListItem<'static> {
        let style = if index == self.selected {
            Style::default().bg(Color::Blue).fg(Color::White)
        } else if index % 2 == 0 {
            Style::default().bg(Color::Black)
        } else {
            Style::default()
        };

        ListItem::new(Line::from(vec![
            Span::styled(item.name().to_string(), Style::default().fg(Color::Cyan)),
            Span::styled(format!("  {}", item.link()), Style::default().fg(Color::DarkGray)),
        ]))
        .style(style)
    }

    fn render_pager(&self, frame: &mut Frame, area: Rect) {
        let button = |label: &'static str, enabled: bool| {
            let style = if enabled {
                Style::default().fg(Color::White).bg(Color::Blue).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(label, style)
        };

        let pager = Line::from(vec![
            button(" < Prev ", self.listing.can_prev()),
            Span::raw(format!("  {}  ", self.listing.page_label())),
            button(" Next > ", self.listing.can_next()),
        ])
        .centered();
        frame.render_widget(Paragraph::new(pager), area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let text = self
            .status
            .clone()
            .unwrap_or_else(|| "Enter: open  Up/Down: select  Left/Right: page  Esc: quit".to_string());
        frame.render_widget(
            Paragraph::new(text).style(Style::default().bg(Color::DarkGray)),
            area,
        );
    }
}
