use std::borrow::Cow;

use chrono::{DateTime, Utc};
use log::debug;

use crate::{
    conversations::{Block, Content, ListItem, Message, Piece, Segment, TextStyle},
    directory::Directory,
    timestamp,
};

/// Longest flat text the destination accepts, in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

pub const SKIPPED_NOTICE: &str = "message skipped due to being too long.";

pub const UNKNOWN_PIECE_PLACEHOLDER: &str = " !fixme: unhandled rich text element! ";

pub const AUTHOR_NOT_FOUND: &str = "user not found in users.json";

/// Escapes Slack applies to message text. `%7c` also matches `%7C`.
const ESCAPES: [(&str, &str); 4] = [("&amp;", "&"), ("&gt;", ">"), ("&lt;", "<"), ("%7c", "|")];

/// One message, ready for the destination.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRecord {
    pub body: String,
    pub author_label: String,
    pub avatar_url: Option<String>,
    pub reaction_summary: String,
    pub files_summary: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Record(OutboundRecord),

    /// The message is over [`MAX_MESSAGE_CHARS`]; send [`SKIPPED_NOTICE`] instead
    Skipped,
}

pub fn render(message: &Message, directory: &Directory) -> Rendered {
    if is_too_long(&message.text) {
        debug!("skipping oversized message {}", message.ts);
        return Rendered::Skipped;
    }

    Rendered::Record(OutboundRecord {
        body: render_body(message, directory),
        author_label: author_label(message, directory),
        avatar_url: message
            .user
            .as_deref()
            .and_then(|user_id| directory.avatar_url(user_id))
            .map(str::to_string),
        reaction_summary: reaction_summary(message),
        files_summary: files_summary(message, directory),
        timestamp: timestamp::parse(&message.ts),
    })
}

pub fn is_too_long(text: &str) -> bool {
    text.chars().count() > MAX_MESSAGE_CHARS
}

/// The message's rich text as markup, or its flat text untouched when it has no
/// blocks.
pub fn render_body(message: &Message, directory: &Directory) -> String {
    match message.content() {
        Content::Text(text) => text.to_string(),
        Content::Blocks(blocks) => blocks
            .iter()
            .map(|block| render_block(block, directory))
            .collect(),
    }
}

fn render_block(block: &Block, directory: &Directory) -> String {
    match block {
        Block::RichText { elements } => elements
            .iter()
            .map(|segment| render_segment(segment, directory))
            .collect(),
        Block::Image {
            image_url,
            alt_text,
            title,
        } => {
            let title = title.as_ref().map_or("", |title| title.text.as_str());
            format!("\n[{title} ~ alt: {alt_text}]({image_url})")
        }
        Block::Unknown => String::new(),
    }
}

fn render_segment(segment: &Segment, directory: &Directory) -> String {
    match segment {
        Segment::RichTextSection { elements } => render_pieces(elements, directory),
        // Style, indent and border don't change the output yet
        Segment::RichTextList { elements, .. } => elements
            .iter()
            .map(|item: &ListItem| format!("- {}\n", render_pieces(&item.elements, directory)))
            .collect(),
        Segment::Unknown => String::new(),
    }
}

fn render_pieces(pieces: &[Piece], directory: &Directory) -> String {
    pieces
        .iter()
        .map(|piece| render_piece(piece, directory))
        .collect()
}

pub fn render_piece(piece: &Piece, directory: &Directory) -> String {
    match piece {
        Piece::Text { text, style } => {
            let wrapper = style_wrapper(style.as_ref());
            format!("{wrapper}{}{wrapper}", unescape(text))
        }
        Piece::Emoji { name } => format!(":{name}:"),
        Piece::User { user_id } => {
            let (name, real_name) = directory.user_names(user_id);
            format!("`@{name} ({real_name})`")
        }
        Piece::Link { url, text } => match text.as_deref().filter(|text| !text.is_empty()) {
            Some(text) => format!("[{text}]({url})"),
            None => format!("[{url}]({url})"),
        },
        Piece::Channel { channel_id } => format!("`#{}`", directory.channel_name(channel_id)),
        Piece::Usergroup { usergroup_id } => {
            format!("`@group:{}`", directory.group_name(usergroup_id))
        }
        Piece::Color { value } => value.clone(),
        Piece::Unknown => UNKNOWN_PIECE_PLACEHOLDER.to_string(),
    }
}

/// Only one wrapper is ever applied: bold, then italic, then strike, then code.
fn style_wrapper(style: Option<&TextStyle>) -> &'static str {
    match style {
        Some(style) if style.bold => "**",
        Some(style) if style.italic => "*",
        Some(style) if style.strike => "~~",
        Some(style) if style.code => "`",
        _ => "",
    }
}

pub fn author_label(message: &Message, directory: &Directory) -> String {
    match message
        .user
        .as_deref()
        .and_then(|user_id| directory.user(user_id))
        .filter(|user| !user.name.is_empty())
    {
        Some(user) => format!("@{} ({})", user.name, user.real_name),
        None => AUTHOR_NOT_FOUND.to_string(),
    }
}

pub fn reaction_summary(message: &Message) -> String {
    if message.reactions.is_empty() {
        return String::new();
    }

    let reactions: String = message
        .reactions
        .iter()
        .map(|reaction| format!("[{} | {}]", reaction.name, reaction.count))
        .collect();

    format!("*reactions: {reactions}*")
}

pub fn files_summary(message: &Message, directory: &Directory) -> String {
    message
        .files
        .iter()
        .map(|file| {
            let (name, real_name) = directory.user_names(file.user.as_deref().unwrap_or_default());
            format!("file: {} uploaded by {name} ({real_name} )\n", file.name)
        })
        .collect()
}

/// Decodes Slack's escape sequences in one left-to-right pass. Decoded output is
/// not scanned again, so `&amp;lt;` becomes `&lt;`.
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '%']) {
        return Cow::Borrowed(text);
    }

    let mut decoded = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        if let Some((escape, literal)) = ESCAPES
            .iter()
            .find(|(escape, _)| starts_with_escape(rest, escape))
        {
            decoded.push_str(literal);
            rest = &rest[escape.len()..];
        } else {
            decoded.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }

    Cow::Owned(decoded)
}

fn starts_with_escape(text: &str, escape: &str) -> bool {
    text.get(..escape.len()).is_some_and(|prefix| {
        if escape.starts_with('%') {
            prefix.eq_ignore_ascii_case(escape)
        } else {
            prefix == escape
        }
    })
}
