//! Names for files the user saves.

use chrono::{DateTime, Utc};

pub const HTML_MIME: &str = "text/html";

pub fn image_file_name(now: DateTime<Utc>) -> String {
    format!("image-{}.png", now.timestamp_millis())
}

pub fn video_file_name(now: DateTime<Utc>) -> String {
    format!("video-{}.mp4", now.timestamp_millis())
}

/// `concept-YYYY-MM-DD.html`, UTC date.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("concept-{}.html", now.format("%Y-%m-%d"))
}
