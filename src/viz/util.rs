use crossterm::event::{Event, KeyCode, KeyEventKind};

/// The key code of a key press, `None` for any other event
pub(super) fn event_keycode(event: &Event) -> Option<KeyCode> {
    let Event::Key(key) = event else {
        return None;
    };

    (key.kind == KeyEventKind::Press).then_some(key.code)
}
