use std::time::Duration;
use tracing::trace;

use crate::domain::{DGConfig, DGError, Message};
use crate::model::Model;
use ratatui::crossterm::event::{self, Event, KeyCode};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &DGConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, DGError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            // While the filter box is open every key belongs to the inputter.
            if model.raw_keyevents() {
                return Ok(Some(Message::RawKey(key)));
            }
            return Ok(self.handle_key(key));
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Esc => Some(Message::Exit),
            KeyCode::Char('r') => Some(Message::Refresh),
            KeyCode::Char('/') => Some(Message::EnterFilter),
            KeyCode::Left => Some(Message::MoveLeft),
            KeyCode::Right => Some(Message::MoveRight),
            KeyCode::Char('s') => Some(Message::ToggleSort),
            KeyCode::Char('n') => Some(Message::NextPage),
            KeyCode::Char('p') => Some(Message::PrevPage),
            KeyCode::Char('g') => Some(Message::FirstPage),
            KeyCode::Char('G') => Some(Message::LastPage),
            KeyCode::Char('1') => Some(Message::SetPageSize(10)),
            KeyCode::Char('2') => Some(Message::SetPageSize(20)),
            KeyCode::Char('3') => Some(Message::SetPageSize(50)),
            KeyCode::Char('4') => Some(Message::SetPageSize(100)),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
