use std::{
    io,
    sync::mpsc::{Receiver, TryRecvError},
    time::Duration,
};

use crossterm::event::{self, KeyCode};
use ratatui::{prelude::*, widgets::*};

use super::{
    components::{Component, Logs, Plots, TableView},
    tui,
    util::event_keycode,
};

const TABS: [&str; 3] = ["Plots", "Q-table", "Logs"];

#[derive(Default, Clone, Copy, PartialEq, Eq)]
enum Status {
    #[default]
    Learning,
    Done,
    Quit,
}

/// Statistics of one finished episode
pub struct Update {
    pub episode: u16,
    /// One value per plot, in the order the plots were named
    pub data: Vec<f64>,
    /// The table as it stands after the episode
    pub table: String,
}

/// The root of the dashboard, holding its state and running the render loop
pub struct App {
    status: Status,
    episode: u16,
    total_episodes: u16,
    selected_tab: usize,
    plots: Plots,
    table: TableView,
    logs: Logs,
}

impl App {
    pub fn new(plots: &[&'static str], episodes: u16) -> Self {
        Self {
            status: Status::default(),
            episode: 0,
            total_episodes: episodes,
            selected_tab: 0,
            plots: Plots::new(plots, episodes),
            table: TableView::default(),
            logs: Logs::new(),
        }
    }

    /// Initialize the terminal and draw until the user quits
    ///
    /// Restores the terminal on exit
    pub fn run(&mut self, rx: Receiver<Update>) -> io::Result<()> {
        let mut terminal = tui::init()?;

        while self.status != Status::Quit {
            if self.status == Status::Learning {
                self.drain(&rx);
            }
            tui_logger::move_events();

            terminal.draw(|frame| frame.render_widget(&*self, frame.size()))?;

            if event::poll(Duration::from_millis(16))? {
                self.handle_event(&event::read()?);
            }
        }

        tui::restore()
    }

    fn drain(&mut self, rx: &Receiver<Update>) {
        loop {
            match rx.try_recv() {
                Ok(Update {
                    episode,
                    data,
                    table,
                }) => {
                    self.episode = episode + 1;
                    self.plots.update(episode, &data);
                    self.table.update(episode, table);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.status = Status::Done;
                    break;
                }
            }
        }
    }

    fn handle_event(&mut self, event: &event::Event) {
        match event_keycode(event) {
            Some(KeyCode::Char('q')) => self.status = Status::Quit,
            Some(KeyCode::Tab) => self.selected_tab = (self.selected_tab + 1) % TABS.len(),
            _ => {
                let _ = match self.selected_tab {
                    0 => self.plots.handle_ui_event(event),
                    1 => self.table.handle_ui_event(event),
                    _ => self.logs.handle_ui_event(event),
                };
            }
        }
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [menu_area, main_area, progress_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(3),
        ])
        .areas(area);

        Tabs::new(TABS)
            .block(Block::default().padding(Padding::uniform(1)))
            .white()
            .bold()
            .highlight_style(Style::default().light_green())
            .select(self.selected_tab)
            .render(menu_area, buf);

        match self.selected_tab {
            0 => self.plots.render_ref(main_area, buf),
            1 => self.table.render_ref(main_area, buf),
            _ => self.logs.render_ref(main_area, buf),
        }

        let title = match self.status {
            Status::Learning => "Learning",
            Status::Done | Status::Quit => "Done, press q to quit",
        };
        let ratio = if self.total_episodes == 0 {
            1.0
        } else {
            (f64::from(self.episode) / f64::from(self.total_episodes)).min(1.0)
        };
        Gauge::default()
            .block(Block::bordered().border_type(BorderType::Rounded).title(title))
            .gauge_style(Color::Cyan)
            .ratio(ratio)
            .render(progress_area, buf);
    }
}
