use regex::Regex;
use url::Url;

use crate::domain::AppError;

/// A decoded thumbnail ready to be handed to the image widget.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Make a video title safe to use in derived filenames.
///
/// Only spaces and path separators are replaced; every other character
/// (including `:`) is kept verbatim so output names stay close to the title.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            _ => c,
        })
        .collect()
}

/// Extract the 11-character video ID from user input.
///
/// Accepts watch URLs, `youtu.be` short links, `/shorts/` and `/embed/`
/// paths, and bare IDs. Returns `None` for anything else.
pub fn extract_video_id(input: &str) -> Option<String> {
    let id_re = Regex::new(r"^[A-Za-z0-9_-]{11}$").ok()?;

    let trimmed = input.trim();
    if id_re.is_match(trimmed) {
        return Some(trimmed.to_string());
    }

    let parsed = Url::parse(trimmed).ok()?;
    let host = parsed.host_str()?;

    let candidate = if host == "youtu.be" || host.ends_with(".youtu.be") {
        parsed.path_segments()?.next().map(str::to_string)
    } else if host == "youtube.com" || host.ends_with(".youtube.com") {
        match parsed.path_segments()?.next()? {
            "watch" => parsed
                .query_pairs()
                .find(|(key, _)| key.as_ref() == "v")
                .map(|(_, value)| value.into_owned()),
            "shorts" | "embed" => parsed.path_segments()?.nth(1).map(str::to_string),
            _ => None,
        }
    } else {
        None
    };

    candidate.filter(|id| id_re.is_match(id))
}

/// Decode raw thumbnail bytes into RGBA pixels.
///
/// Decoding up front (instead of handing the bytes straight to the widget)
/// lets a corrupt image surface as a status message rather than a blank pane.
pub fn decode_thumbnail(bytes: &[u8]) -> Result<DecodedImage, AppError> {
    let img = image::load_from_memory(bytes).map_err(|_| AppError::ThumbnailDecode)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedImage {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}
