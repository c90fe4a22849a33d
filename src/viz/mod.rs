use std::{
    io,
    sync::mpsc::{self, Sender},
    thread::{self, JoinHandle},
};

mod app;
mod components;
mod tui;
mod util;

pub use app::{App, Update};

/// Start the dashboard on its own thread and route `log` output to its log tab
///
/// One plot is shown per entry of `plots`; each [`Update`] must carry a value for every plot, in the
/// same order. The dashboard stays open after the sender is dropped, until the user quits with `q`.
///
/// **Returns** the dashboard thread's handle and the sending end of its update channel
pub fn init(plots: &[&'static str], episodes: u16) -> (JoinHandle<io::Result<()>>, Sender<Update>) {
    if tui_logger::init_logger(log::LevelFilter::Trace).is_ok() {
        tui_logger::set_default_level(log::LevelFilter::Debug);
    }

    let (tx, rx) = mpsc::channel();
    let mut app = App::new(plots, episodes);
    let handle = thread::spawn(move || app.run(rx));

    (handle, tx)
}
