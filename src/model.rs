use std::sync::mpsc::{Receiver, Sender, channel};
use tracing::{debug, info, trace};

use crate::domain::{DGConfig, HELP_TEXT, Message};
use crate::engine::{self, PageNav, Record, ViewState};
use crate::fetch::{self, FetchResult};
use crate::inputter::{InputResult, Inputter};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    LOADING,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    FILTERINPUT,
    POPUP,
}

// Snapshot of everything the renderer needs for one frame. All cell data is
// already projected to display text in column order.
pub struct UIData {
    pub title: String,
    pub headers: Vec<String>,
    pub page_rows: Vec<Vec<String>>,
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub page_index: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub can_prev: bool,
    pub can_next: bool,
    pub selected_column: usize,
    pub loading: bool,
    pub filter_text: String,
    pub active_filter_input: bool,
    pub filter_input: InputResult,
    pub show_popup: bool,
    pub popup_message: String,
    pub status_message: String,
}

impl UIData {
    fn empty() -> Self {
        UIData {
            title: String::new(),
            headers: Vec::new(),
            page_rows: Vec::new(),
            total_rows: 0,
            filtered_rows: 0,
            page_index: 0,
            page_count: 1,
            page_size: engine::DEFAULT_PAGE_SIZE,
            can_prev: false,
            can_next: false,
            selected_column: 0,
            loading: false,
            filter_text: String::new(),
            active_filter_input: false,
            filter_input: InputResult::default(),
            show_popup: false,
            popup_message: String::new(),
            status_message: String::new(),
        }
    }
}

pub struct Model {
    config: DGConfig,
    pub status: Status,
    modus: Modus,
    store: Vec<Record>,
    view: ViewState,
    selected_column: usize,
    input: Inputter,
    fetch_tx: Sender<FetchResult>,
    fetch_rx: Receiver<FetchResult>,
    uidata: UIData,
    status_message: String,
}

impl Model {
    pub fn init(config: DGConfig) -> Self {
        let (fetch_tx, fetch_rx) = channel();
        let view = ViewState {
            page_size: config.page_size,
            ..ViewState::default()
        };
        let mut model = Self {
            config,
            status: Status::READY,
            modus: Modus::TABLE,
            store: Vec::new(),
            view,
            selected_column: 0,
            input: Inputter::default(),
            fetch_tx,
            fetch_rx,
            uidata: UIData::empty(),
            status_message: "Started dg!".to_string(),
        };
        model.update_uidata();
        model
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::FILTERINPUT
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn refresh(&mut self) {
        // No in-flight guard beyond the loading flag. A second request while
        // one is outstanding is fine, the last response to land wins.
        self.status = Status::LOADING;
        fetch::spawn_fetch(self.config.url.clone(), self.fetch_tx.clone());
        self.set_status_message(format!("Fetching {} ...", self.config.url));
        self.update_uidata();
    }

    // Drains the fetch channel; called once per event loop tick.
    pub fn poll_fetch(&mut self) {
        while let Ok(result) = self.fetch_rx.try_recv() {
            self.apply_fetch(result);
        }
    }

    fn apply_fetch(&mut self, result: FetchResult) {
        match result {
            Ok(records) => {
                info!("Record store replaced with {} records", records.len());
                self.store = records;
                // The view settings survive a refresh, only the page is
                // re-clamped against the new filtered set.
                self.view.clamp_page(self.filtered_row_count());
                self.status = Status::READY;
                self.set_status_message(format!("Loaded {} records", self.store.len()));
            }
            Err(e) => {
                self.status = Status::READY;
                self.set_status_message(format!("Fetch failed: {e:?}"));
            }
        }
        self.update_uidata();
    }

    pub fn update(&mut self, message: Message) {
        trace!("Update: Modus {:?}, Message {:?}", self.modus, message);
        match self.modus {
            Modus::TABLE => match message {
                Message::Quit => self.quit(),
                Message::Help => self.show_help(),
                Message::Exit => self.clear_filter(),
                Message::Refresh => self.refresh(),
                Message::EnterFilter => self.enter_filter_input(),
                Message::MoveLeft => self.move_column_selection(-1),
                Message::MoveRight => self.move_column_selection(1),
                Message::ToggleSort => self.toggle_sort(),
                Message::NextPage => self.navigate(PageNav::Next),
                Message::PrevPage => self.navigate(PageNav::Prev),
                Message::FirstPage => self.navigate(PageNav::First),
                Message::LastPage => self.navigate(PageNav::Last),
                Message::SetPageSize(size) => self.set_page_size(size),
                Message::RawKey(_) => {}
            },
            Modus::FILTERINPUT => {
                if let Message::RawKey(key) = message {
                    self.filter_input(key);
                }
            }
            Modus::POPUP => match message {
                Message::Quit => self.quit(),
                Message::Exit | Message::Help => self.close_popup(),
                _ => {}
            },
        }
    }

    // -------------------- Control handling functions ---------------------- //

    fn filtered_row_count(&self) -> usize {
        engine::filter(&self.store, &self.view.filter_text, &self.config.columns).len()
    }

    fn enter_filter_input(&mut self) {
        self.modus = Modus::FILTERINPUT;
        self.input.start(&self.view.filter_text);
        self.update_uidata();
    }

    fn filter_input(&mut self, key: ratatui::crossterm::event::KeyEvent) {
        let result = self.input.read(key);
        // Live re-filter on every keystroke. Escape cleared the input, so a
        // canceled round drops the filter along with the mode.
        self.view.set_filter_text(result.input.clone());
        if result.finished {
            self.modus = Modus::TABLE;
            debug!("Filter set to \"{}\"", self.view.filter_text);
        }
        self.update_uidata();
    }

    fn clear_filter(&mut self) {
        if !self.view.filter_text.is_empty() {
            self.view.set_filter_text("");
            self.set_status_message("Filter cleared");
        }
        self.update_uidata();
    }

    fn move_column_selection(&mut self, step: isize) {
        let last = self.config.columns.len() - 1;
        self.selected_column = if step < 0 {
            self.selected_column.saturating_sub(step.unsigned_abs())
        } else {
            std::cmp::min(last, self.selected_column + step as usize)
        };
        self.update_uidata();
    }

    fn toggle_sort(&mut self) {
        let column = &self.config.columns[self.selected_column];
        self.view.toggle_sort(column);
        match self.view.indicator(&column.key) {
            Some(direction) => {
                self.set_status_message(format!("Sorting {} {:?}", column.key, direction))
            }
            None => self.set_status_message("Sorting off"),
        }
        self.update_uidata();
    }

    fn navigate(&mut self, nav: PageNav) {
        self.view.navigate(nav, self.filtered_row_count());
        self.update_uidata();
    }

    fn set_page_size(&mut self, size: usize) {
        self.view.set_page_size(size, self.filtered_row_count());
        self.update_uidata();
    }

    fn show_help(&mut self) {
        self.modus = Modus::POPUP;
        self.update_uidata();
    }

    fn close_popup(&mut self) {
        self.modus = Modus::TABLE;
        self.update_uidata();
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    fn update_uidata(&mut self) {
        let columns = &self.config.columns;
        let rows = engine::filter(&self.store, &self.view.filter_text, columns);
        let filtered_rows = rows.len();
        let rows = engine::sort(&self.store, rows, self.view.sort.as_ref());
        let page = engine::paginate(&rows, self.view.page_index, self.view.page_size);

        let headers = columns
            .iter()
            .map(|c| match self.view.indicator(&c.key) {
                Some(engine::SortDirection::Ascending) => format!("{} ↑", c.display_name),
                Some(engine::SortDirection::Descending) => format!("{} ↓", c.display_name),
                None => c.display_name.clone(),
            })
            .collect();

        let page_rows = page
            .rows
            .iter()
            .map(|&ridx| {
                columns
                    .iter()
                    .map(|c| engine::cell_text(&self.store[ridx], &c.key))
                    .collect()
            })
            .collect();

        self.uidata = UIData {
            title: self.config.url.clone(),
            headers,
            page_rows,
            total_rows: self.store.len(),
            filtered_rows,
            page_index: self.view.page_index,
            page_count: page.page_count,
            page_size: self.view.page_size,
            can_prev: page.can_prev,
            can_next: page.can_next,
            selected_column: self.selected_column,
            loading: self.status == Status::LOADING,
            filter_text: self.view.filter_text.clone(),
            active_filter_input: self.modus == Modus::FILTERINPUT,
            filter_input: self.input.get(),
            show_popup: self.modus == Modus::POPUP,
            popup_message: HELP_TEXT.to_string(),
            status_message: self.status_message.clone(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::default_columns;
    use ratatui::crossterm::event::{KeyCode, KeyEvent};
    use serde_json::json;

    fn config() -> DGConfig {
        DGConfig {
            url: "http://localhost/records".to_string(),
            columns: default_columns(),
            page_size: 10,
            event_poll_time: 100,
        }
    }

    fn comments(count: usize) -> Vec<Record> {
        (0..count)
            .map(|i| {
                let body = if i % 3 == 0 { "alice was here" } else { "lorem ipsum" };
                json!({
                    "id": i + 1,
                    "postId": i / 5 + 1,
                    "name": format!("comment {i}"),
                    "email": format!("user{i}@example.org"),
                    "body": body,
                })
                .as_object()
                .unwrap()
                .clone()
            })
            .collect()
    }

    fn type_text(model: &mut Model, text: &str) {
        for chr in text.chars() {
            model.update(Message::RawKey(KeyEvent::from(KeyCode::Char(chr))));
        }
    }

    #[test]
    fn empty_model_renders_one_empty_page() {
        let model = Model::init(config());
        let ui = model.get_uidata();
        assert_eq!(ui.page_count, 1);
        assert!(ui.page_rows.is_empty());
        assert!(!ui.can_prev);
        assert!(!ui.can_next);
    }

    #[test]
    fn fetched_records_replace_the_store() {
        let mut model = Model::init(config());
        model.apply_fetch(Ok(comments(25)));
        let ui = model.get_uidata();
        assert_eq!(ui.total_rows, 25);
        assert_eq!(ui.page_count, 3);
        assert_eq!(ui.page_rows.len(), 10);
        assert_eq!(model.status, Status::READY);
    }

    #[test]
    fn the_last_fetch_wins() {
        let mut model = Model::init(config());
        model.apply_fetch(Ok(comments(25)));
        model.apply_fetch(Ok(comments(3)));
        assert_eq!(model.get_uidata().total_rows, 3);
    }

    #[test]
    fn a_failed_fetch_keeps_the_store() {
        let mut model = Model::init(config());
        model.apply_fetch(Ok(comments(5)));
        model.apply_fetch(Err(crate::domain::DGError::BadPayload("nope".into())));
        let ui = model.get_uidata();
        assert_eq!(ui.total_rows, 5);
        assert!(ui.status_message.contains("Fetch failed"));
    }

    #[test]
    fn refresh_reclamps_the_page_but_keeps_the_view() {
        let mut model = Model::init(config());
        model.apply_fetch(Ok(comments(95)));
        model.update(Message::ToggleSort);
        model.update(Message::LastPage);
        assert_eq!(model.get_uidata().page_index, 9);

        model.apply_fetch(Ok(comments(5)));
        let ui = model.get_uidata();
        assert_eq!(ui.page_index, 0);
        assert_eq!(ui.headers[0], "ID ↑");
    }

    #[test]
    fn sort_toggle_cycles_and_decorates_the_header() {
        let mut model = Model::init(config());
        model.apply_fetch(Ok(comments(5)));
        model.update(Message::MoveRight);
        model.update(Message::MoveRight);
        model.update(Message::ToggleSort);
        assert_eq!(model.get_uidata().headers[2], "Name ↑");
        model.update(Message::ToggleSort);
        assert_eq!(model.get_uidata().headers[2], "Name ↓");
        model.update(Message::ToggleSort);
        assert_eq!(model.get_uidata().headers[2], "Name");
    }

    #[test]
    fn column_selection_is_clamped() {
        let mut model = Model::init(config());
        model.update(Message::MoveLeft);
        assert_eq!(model.get_uidata().selected_column, 0);
        for _ in 0..10 {
            model.update(Message::MoveRight);
        }
        assert_eq!(model.get_uidata().selected_column, 4);
    }

    #[test]
    fn live_filter_typing_refilters_and_resets_the_page() {
        let mut model = Model::init(config());
        model.apply_fetch(Ok(comments(30)));
        model.update(Message::NextPage);
        assert_eq!(model.get_uidata().page_index, 1);

        model.update(Message::EnterFilter);
        assert!(model.raw_keyevents());
        type_text(&mut model, "alice");
        let ui = model.get_uidata();
        assert_eq!(ui.page_index, 0);
        assert_eq!(ui.filtered_rows, 10); // every third comment
        assert_eq!(ui.total_rows, 30);

        model.update(Message::RawKey(KeyEvent::from(KeyCode::Enter)));
        assert!(!model.raw_keyevents());
        assert_eq!(model.get_uidata().filter_text, "alice");
    }

    #[test]
    fn escape_in_the_filter_box_drops_the_filter() {
        let mut model = Model::init(config());
        model.apply_fetch(Ok(comments(30)));
        model.update(Message::EnterFilter);
        type_text(&mut model, "alice");
        model.update(Message::RawKey(KeyEvent::from(KeyCode::Esc)));
        let ui = model.get_uidata();
        assert_eq!(ui.filter_text, "");
        assert_eq!(ui.filtered_rows, 30);
    }

    #[test]
    fn escape_in_table_mode_clears_the_filter() {
        let mut model = Model::init(config());
        model.apply_fetch(Ok(comments(30)));
        model.update(Message::EnterFilter);
        type_text(&mut model, "alice");
        model.update(Message::RawKey(KeyEvent::from(KeyCode::Enter)));
        model.update(Message::Exit);
        assert_eq!(model.get_uidata().filtered_rows, 30);
    }

    #[test]
    fn page_size_messages_repage_the_view() {
        let mut model = Model::init(config());
        model.apply_fetch(Ok(comments(95)));
        model.update(Message::LastPage);
        model.update(Message::SetPageSize(50));
        let ui = model.get_uidata();
        assert_eq!(ui.page_size, 50);
        assert_eq!(ui.page_count, 2);
        assert_eq!(ui.page_index, 1);
        assert_eq!(ui.page_rows.len(), 45);
    }

    #[test]
    fn help_popup_opens_and_closes() {
        let mut model = Model::init(config());
        model.update(Message::Help);
        assert!(model.get_uidata().show_popup);
        // Table actions are inert while the popup is up.
        model.update(Message::NextPage);
        assert_eq!(model.get_uidata().page_index, 0);
        model.update(Message::Exit);
        assert!(!model.get_uidata().show_popup);
    }

    #[test]
    fn quitting_from_any_modus() {
        let mut model = Model::init(config());
        model.update(Message::Help);
        model.update(Message::Quit);
        assert_eq!(model.status, Status::QUITTING);
    }
}
