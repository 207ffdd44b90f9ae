use dexd::ViewState;

pub(crate) async fn fetch_sprite(url: String) -> Result<Vec<u8>, String> {
    let response = reqwest::get(&url).await.map_err(|err| err.to_string())?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!("HTTP {status} for {url}"));
    }

    let bytes = response.bytes().await.map_err(|err| err.to_string())?;
    Ok(bytes.to_vec())
}

/// Image URL of the record currently on screen.
pub(crate) fn wanted_sprite_url(view: &ViewState) -> Option<&str> {
    match view {
        ViewState::Ready(screen) => screen
            .detail
            .as_ref()
            .and_then(|detail| detail.image_url.as_deref()),
        ViewState::Fatal { .. } => None,
    }
}

/// URL to start downloading, if the wanted image is neither shown nor
/// already requested.
pub(crate) fn next_sprite_request(
    view: &ViewState,
    shown: Option<&str>,
    pending: Option<&str>,
) -> Option<String> {
    let wanted = wanted_sprite_url(view)?;
    if shown == Some(wanted) || pending == Some(wanted) {
        return None;
    }
    Some(wanted.to_string())
}
