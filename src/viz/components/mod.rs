mod logs;
mod plot;
mod table;

use crossterm::event::Event;
use ratatui::widgets::WidgetRef;

pub use logs::Logs;
pub use plot::Plots;
pub use table::TableView;

/// A dashboard tab that can react to terminal input
pub trait Component: WidgetRef {
    /// **Returns** whether the event was consumed
    fn handle_ui_event(&mut self, event: &Event) -> bool;
}
