use crossterm::event::{Event, KeyCode};
use log::LevelFilter;
use ratatui::{prelude::*, widgets::WidgetRef};
use tui_logger::{TuiLoggerSmartWidget, TuiWidgetEvent, TuiWidgetState};

use super::Component;
use crate::{algo::tabular::q_table::STEP_LOG_TARGET, viz::util::event_keycode};

/// The log stream of the learning run
///
/// Episode and batch records are always shown. The agent's per-step records flood the view during a
/// long run, so they are hidden until toggled on with `t`.
pub struct Logs {
    state: TuiWidgetState,
    show_steps: bool,
}

impl Logs {
    pub fn new() -> Self {
        Self {
            state: widget_state(false),
            show_steps: false,
        }
    }

    /// Show or hide the per-step records
    ///
    /// Capture follows the display, so hidden steps are not buffered either.
    pub fn toggle_steps(&mut self) {
        self.show_steps = !self.show_steps;
        tui_logger::set_level_for_target(STEP_LOG_TARGET, step_level(self.show_steps));
        self.state = widget_state(self.show_steps);
    }

    fn title(&self) -> &'static str {
        if self.show_steps {
            "Log (t: hide steps)"
        } else {
            "Log (t: show steps)"
        }
    }
}

fn step_level(show_steps: bool) -> LevelFilter {
    if show_steps {
        LevelFilter::Trace
    } else {
        LevelFilter::Debug
    }
}

fn widget_state(show_steps: bool) -> TuiWidgetState {
    TuiWidgetState::new()
        .set_default_display_level(LevelFilter::Debug)
        .set_level_for_target(STEP_LOG_TARGET, step_level(show_steps))
}

impl WidgetRef for Logs {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        TuiLoggerSmartWidget::default()
            .title_log(self.title())
            .style(Style::default().white())
            .style_error(Style::default().light_red())
            .style_warn(Style::default().light_yellow())
            .style_info(Style::default().cyan())
            .style_trace(Style::default().dark_gray())
            .output_separator(' ')
            .state(&self.state)
            .render(area, buf);
    }
}

impl Component for Logs {
    fn handle_ui_event(&mut self, event: &Event) -> bool {
        let Some(key) = event_keycode(event) else {
            return false;
        };

        let widget_event = match key {
            KeyCode::Char('t') => {
                self.toggle_steps();
                return true;
            }
            KeyCode::Char(' ') => TuiWidgetEvent::SpaceKey,
            KeyCode::Esc => TuiWidgetEvent::EscapeKey,
            KeyCode::PageUp => TuiWidgetEvent::PrevPageKey,
            KeyCode::PageDown => TuiWidgetEvent::NextPageKey,
            KeyCode::Up => TuiWidgetEvent::UpKey,
            KeyCode::Down => TuiWidgetEvent::DownKey,
            KeyCode::Left => TuiWidgetEvent::LeftKey,
            KeyCode::Right => TuiWidgetEvent::RightKey,
            KeyCode::Char('+') => TuiWidgetEvent::PlusKey,
            KeyCode::Char('-') => TuiWidgetEvent::MinusKey,
            KeyCode::Char('s') => TuiWidgetEvent::HideKey,
            KeyCode::Char('f') => TuiWidgetEvent::FocusKey,
            _ => return false,
        };

        self.state.transition(widget_event);
        true
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEvent, KeyEventKind, KeyModifiers};

    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn steps_are_hidden_until_toggled() {
        let mut logs = Logs::new();
        assert!(!logs.show_steps);
        assert_eq!(logs.title(), "Log (t: show steps)");

        assert!(logs.handle_ui_event(&key(KeyCode::Char('t'))));
        assert!(logs.show_steps);
        assert_eq!(logs.title(), "Log (t: hide steps)");

        assert!(logs.handle_ui_event(&key(KeyCode::Char('t'))));
        assert!(!logs.show_steps);
    }

    #[test]
    fn step_records_sit_one_level_below_episodes() {
        assert_eq!(step_level(false), LevelFilter::Debug);
        assert_eq!(step_level(true), LevelFilter::Trace);
        assert_eq!(STEP_LOG_TARGET, "qgrid::algo::tabular::q_table");
    }

    #[test]
    fn releases_are_ignored() {
        let mut logs = Logs::new();
        let release = Event::Key(KeyEvent::new_with_kind(
            KeyCode::Char('t'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ));
        assert!(!logs.handle_ui_event(&release));
        assert!(!logs.show_steps);
        assert!(!logs.handle_ui_event(&key(KeyCode::Char('x'))));
    }
}
