use crossterm::event::{Event, KeyCode};
use ratatui::{prelude::*, widgets::*};

use super::Component;
use crate::viz::util::event_keycode;

/// The latest rendering of the action-value table
#[derive(Default)]
pub struct TableView {
    text: String,
    episode: u16,
    scroll: u16,
}

impl TableView {
    pub fn update(&mut self, episode: u16, text: String) {
        self.episode = episode;
        self.text = text;
    }
}

impl WidgetRef for TableView {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.text.as_str())
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title(format!("Q-table after episode {}", self.episode)),
            )
            .scroll((self.scroll, 0))
            .render(area, buf);
    }
}

impl Component for TableView {
    fn handle_ui_event(&mut self, event: &Event) -> bool {
        match event_keycode(event) {
            Some(KeyCode::Down) => self.scroll = self.scroll.saturating_add(1),
            Some(KeyCode::Up) => self.scroll = self.scroll.saturating_sub(1),
            _ => return false,
        }
        true
    }
}
