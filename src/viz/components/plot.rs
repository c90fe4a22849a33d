use crossterm::event::{Event, KeyCode};
use ratatui::{prelude::*, widgets::*};

use super::Component;
use crate::viz::util::event_keycode;

/// A learning curve: one value per episode
struct Plot {
    title: &'static str,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    data: Vec<(f64, f64)>,
}

impl Plot {
    fn new(title: &'static str, episodes: u16) -> Self {
        Self {
            title,
            x_bounds: [0.0, episodes.into()],
            y_bounds: [f64::MAX, f64::MIN],
            data: Vec::new(),
        }
    }

    fn push(&mut self, episode: f64, value: f64) {
        self.x_bounds = [self.x_bounds[0].min(episode), self.x_bounds[1].max(episode)];
        self.y_bounds = [self.y_bounds[0].min(value), self.y_bounds[1].max(value)];
        self.data.push((episode, value));
    }

    fn labels(bounds: [f64; 2]) -> Vec<Span<'static>> {
        if bounds[0] > bounds[1] {
            return Vec::new();
        }
        bounds.iter().map(|b| format!("{b:.2}").bold()).collect()
    }
}

impl Widget for &Plot {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let dataset = Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Scatter)
            .cyan()
            .data(&self.data);

        let x_axis = Axis::default()
            .title("Episode")
            .dark_gray()
            .labels(Plot::labels(self.x_bounds))
            .bounds(self.x_bounds);

        let y_axis = Axis::default()
            .title(self.title)
            .dark_gray()
            .labels(Plot::labels(self.y_bounds))
            .bounds(self.y_bounds);

        Chart::new(vec![dataset])
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title(self.title)
                    .padding(Padding::uniform(2)),
            )
            .x_axis(x_axis)
            .y_axis(y_axis)
            .render(area, buf);
    }
}

/// One plot per episode statistic, cycled with the arrow keys
pub struct Plots {
    plots: Vec<Plot>,
    selected: usize,
}

impl Plots {
    pub fn new(names: &[&'static str], episodes: u16) -> Self {
        Self {
            plots: names.iter().map(|&n| Plot::new(n, episodes)).collect(),
            selected: 0,
        }
    }

    pub fn update(&mut self, episode: u16, data: &[f64]) {
        for (plot, &value) in self.plots.iter_mut().zip(data) {
            plot.push(episode.into(), value);
        }
    }
}

impl WidgetRef for Plots {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        if let Some(plot) = self.plots.get(self.selected) {
            plot.render(area, buf);
        }
    }
}

impl Component for Plots {
    fn handle_ui_event(&mut self, event: &Event) -> bool {
        let len = self.plots.len();
        if len == 0 {
            return false;
        }

        match event_keycode(event) {
            Some(KeyCode::Right) => self.selected = (self.selected + 1) % len,
            Some(KeyCode::Left) => self.selected = (self.selected + len - 1) % len,
            _ => return false,
        }
        true
    }
}
