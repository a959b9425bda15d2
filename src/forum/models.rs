use chrono::{DateTime, Local};

/// One message of a forum thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Post {
    /// Forum post identifier, zero when the page did not carry a parsable one.
    pub id: i64,
    /// When the message was posted, if the header date could be parsed.
    pub created: Option<DateTime<Local>>,
    /// When the message was last edited; `None` means never edited.
    pub updated: Option<DateTime<Local>>,
    /// Sanitized inner markup of the message body.
    pub html: String,
    /// Short plain-text excerpt built from the body's direct text.
    pub text: String,
    /// Absolute permalink, empty if the header had no anchor.
    pub link: String,
}

/// The most recent messages of a thread, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadWindow {
    pub title: String,
    pub posts: Vec<Post>,
}
