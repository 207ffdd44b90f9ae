use iced::widget::operation;
use iced::{widget, window, Size, Task};

use crate::{Message, WINDOW_HEIGHT, WINDOW_WIDTH};

pub(crate) fn native_window_settings() -> window::Settings {
    let mut settings = window::Settings::default();
    settings.size = Size::new(WINDOW_WIDTH, WINDOW_HEIGHT);
    settings.min_size = Some(Size::new(420.0, 360.0));
    settings.resizable = true;
    settings.position = window::Position::Centered;
    settings
}

pub(crate) fn focus_lookup_input(input_id: widget::Id) -> Task<Message> {
    Task::batch(vec![
        operation::focus(input_id.clone()),
        operation::move_cursor_to_end(input_id),
    ])
}
