use iced::widget::image;
use iced::Task;

use crate::sprite::{fetch_sprite, next_sprite_request, wanted_sprite_url};
use crate::{App, Message};

pub(crate) fn update(app: &mut App, message: Message) -> Task<Message> {
    match message {
        Message::InputChanged(input) => {
            app.raw_input = input.clone();
            if let Some(service) = &app.service {
                if !service.send_input(input) {
                    tracing::warn!("lookup service stopped; input dropped");
                    app.service = None;
                    app.startup_error = Some("lookup service stopped".to_string());
                }
            }
        }
        Message::PollService => {
            let Some(service) = app.service.as_mut() else {
                return Task::none();
            };
            let Some(snapshot) = service.poll_changed() else {
                return Task::none();
            };
            app.snapshot = snapshot;

            if wanted_sprite_url(&app.snapshot) != app.shown_sprite_url() {
                app.sprite = None;
            }

            if let Some(url) = next_sprite_request(
                &app.snapshot,
                app.shown_sprite_url(),
                app.sprite_pending.as_deref(),
            ) {
                app.sprite_pending = Some(url.clone());
                return Task::perform(fetch_sprite(url.clone()), move |result| {
                    Message::SpriteLoaded {
                        url: url.clone(),
                        result,
                    }
                });
            }
        }
        Message::SpriteLoaded { url, result } => {
            if app.sprite_pending.as_deref() == Some(url.as_str()) {
                app.sprite_pending = None;
            }
            if wanted_sprite_url(&app.snapshot) != Some(url.as_str()) {
                return Task::none();
            }

            match result {
                Ok(bytes) => app.sprite = Some((url, image::Handle::from_bytes(bytes))),
                Err(err) => tracing::warn!(%url, error = %err, "sprite download failed"),
            }
        }
    }

    Task::none()
}
