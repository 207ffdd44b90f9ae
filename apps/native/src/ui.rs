use iced::alignment::Horizontal;
use iced::widget::{column, container, image, row, scrollable, text, text_input};
use iced::{Alignment, Color, Element, Fill, Length, Subscription, Theme};

use dexd::{DetailView, Screen, ViewState};

use crate::{App, Message, INDEX_FONT_SIZE, POLL_INTERVAL, SPRITE_SIZE};

pub(crate) fn view(app: &App) -> Element<'_, Message> {
    if let Some(message) = &app.startup_error {
        return fatal_view(message);
    }

    match &app.snapshot {
        ViewState::Fatal { message } => fatal_view(message),
        ViewState::Ready(screen) => ready_view(app, screen),
    }
}

fn fatal_view(message: &str) -> Element<'_, Message> {
    container(
        text(format!("Error: {message}"))
            .size(18)
            .color(Color::from_rgb8(255, 92, 92)),
    )
    .width(Fill)
    .height(Fill)
    .center_x(Fill)
    .center_y(Fill)
    .padding(24)
    .into()
}

fn ready_view<'a>(app: &'a App, screen: &'a Screen) -> Element<'a, Message> {
    let prompt = row![
        text(">"),
        text_input("1", &app.raw_input)
            .id(app.input_id.clone())
            .on_input(Message::InputChanged)
            .padding(8)
            .size(18)
            .width(Length::Fixed(160.0)),
        text(if screen.detail_loading {
            "loading..."
        } else {
            ""
        })
        .size(13)
        .color(Color::from_rgb8(255, 184, 76)),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let mut content = column![
        text("Pokédex").size(30),
        text(&screen.range_hint).size(14),
        prompt
    ]
    .spacing(10);

    if let Some(detail) = &screen.detail {
        content = content.push(detail_panel(app, detail));
    }

    if let Some(error) = &screen.detail_error {
        content = content.push(
            container(
                text(format!("Error: {error}"))
                    .size(14)
                    .color(Color::from_rgb8(255, 150, 150)),
            )
            .padding(6)
            .width(Fill)
            .style(container::bordered_box),
        );
    }

    let mut listed = column![];
    for (position, name) in screen.index.iter().enumerate() {
        listed = listed.push(
            row![
                text(format!("{}.", position + 1))
                    .size(INDEX_FONT_SIZE)
                    .color(Color::from_rgb8(145, 150, 160))
                    .width(Length::Fixed(48.0)),
                text(name).size(INDEX_FONT_SIZE)
            ]
            .spacing(6),
        );
    }

    content = content
        .push(text("Full List of Pokémon:").size(20))
        .push(scrollable(listed.spacing(2)).height(Length::Fill))
        .push(status_bar(screen));

    container(content.padding(16))
        .width(Fill)
        .height(Fill)
        .into()
}

fn detail_panel<'a>(app: &'a App, detail: &'a DetailView) -> Element<'a, Message> {
    let picture: Element<'a, Message> = match &app.sprite {
        Some((url, handle)) if detail.image_url.as_deref() == Some(url.as_str()) => {
            image(handle.clone())
                .width(Length::Fixed(SPRITE_SIZE))
                .height(Length::Fixed(SPRITE_SIZE))
                .into()
        }
        _ if detail.image_url.is_some() => text(format!("[{}]", detail.alt_text))
            .size(13)
            .color(Color::from_rgb8(145, 150, 160))
            .into(),
        _ => text("").into(),
    };

    let mut types = column![text("Types:").size(18)].spacing(4);
    for entry in &detail.types {
        types = types.push(text(format!("• {}", entry.label)).size(15));
    }

    container(
        row![
            column![
                text(&detail.title).size(24),
                text(&detail.number).size(24),
                picture
            ]
            .spacing(6)
            .align_x(Alignment::Center)
            .width(Length::FillPortion(1)),
            types.width(Length::FillPortion(1)),
        ]
        .spacing(16)
        .padding(12),
    )
    .width(Fill)
    .style(container::rounded_box)
    .into()
}

fn status_bar(screen: &Screen) -> Element<'_, Message> {
    let state = if screen.index_loading || screen.detail_loading {
        ("loading", Color::from_rgb8(255, 184, 76))
    } else {
        ("idle", Color::from_rgb8(117, 227, 140))
    };

    row![
        container(text(format!("ENTRIES: {}", screen.index.len())).size(13))
            .width(Length::FillPortion(1))
            .align_x(Horizontal::Left),
        container(
            row![text("STATE: ").size(13), text(state.0).size(13).color(state.1)]
                .align_y(Alignment::Center)
        )
        .width(Length::FillPortion(1))
        .align_x(Horizontal::Right),
    ]
    .align_y(Alignment::Center)
    .into()
}

pub(crate) fn theme(app: &App) -> Theme {
    app.theme.clone()
}

pub(crate) fn subscription(_app: &App) -> Subscription<Message> {
    iced::time::every(POLL_INTERVAL).map(|_| Message::PollService)
}
