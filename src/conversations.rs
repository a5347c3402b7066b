use serde::{Deserialize, Deserializer, Serialize};

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Message {
    /// Might not exist for bots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Timestamp, doubles as the message id
    pub ts: String,

    #[serde(default)]
    pub text: String,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub blocks: Vec<Block>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub reactions: Vec<Reaction>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub files: Vec<File>,
}

/// The form a message's content takes. Only one is ever used for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Content<'a> {
    Blocks(&'a [Block]),
    Text(&'a str),
}

impl Message {
    pub fn content(&self) -> Content<'_> {
        if self.blocks.is_empty() {
            Content::Text(&self.text)
        } else {
            Content::Blocks(&self.blocks)
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    RichText {
        #[serde(default, deserialize_with = "null_as_default")]
        elements: Vec<Segment>,
    },
    Image {
        #[serde(default)]
        image_url: String,
        #[serde(default)]
        alt_text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<TextObject>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct TextObject {
    #[serde(default)]
    pub text: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    RichTextSection {
        #[serde(default, deserialize_with = "null_as_default")]
        elements: Vec<Piece>,
    },
    RichTextList {
        #[serde(default)]
        style: ListStyle,
        #[serde(default)]
        indent: u32,
        #[serde(default)]
        border: u32,
        /// Each item is a `rich_text_section`
        #[serde(default, deserialize_with = "null_as_default")]
        elements: Vec<ListItem>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ListStyle {
    Ordered,
    #[default]
    Bullet,
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct ListItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub elements: Vec<Piece>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Piece {
    Text {
        #[serde(default)]
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<TextStyle>,
    },
    Emoji {
        #[serde(default)]
        name: String,
    },
    User {
        #[serde(default)]
        user_id: String,
    },
    Link {
        #[serde(default)]
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    Channel {
        #[serde(default)]
        channel_id: String,
    },
    Usergroup {
        #[serde(default)]
        usergroup_id: String,
    },
    Color {
        #[serde(default)]
        value: String,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub strike: bool,
    #[serde(default)]
    pub code: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Reaction {
    pub name: String,
    #[serde(default)]
    pub count: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct File {
    #[serde(default)]
    pub name: String,

    /// Uploader
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ResponseMetadata {
    #[serde(default)]
    pub next_cursor: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct HistoryResponse {
    pub ok: bool,
    pub error: Option<String>,
    pub messages: Option<Vec<Message>>,
    pub has_more: Option<bool>,
    pub response_metadata: Option<ResponseMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const HISTORY: &str = r##"{
        "ok": true,
        "messages": [
            {
                "type": "message",
                "user": "U1",
                "text": "hello *world*",
                "ts": "1700000002.000200",
                "blocks": [
                    {
                        "type": "rich_text",
                        "block_id": "abc",
                        "elements": [
                            {
                                "type": "rich_text_section",
                                "elements": [
                                    {"type": "text", "text": "hello "},
                                    {"type": "text", "text": "world", "style": {"bold": true}},
                                    {"type": "emoji", "name": "wave", "unicode": "1f44b"},
                                    {"type": "broadcast", "range": "here"}
                                ]
                            },
                            {
                                "type": "rich_text_list",
                                "style": "ordered",
                                "indent": 1,
                                "elements": [
                                    {"type": "rich_text_section", "elements": [{"type": "text", "text": "a"}]}
                                ]
                            },
                            {"type": "rich_text_quote", "elements": []}
                        ]
                    },
                    {
                        "type": "image",
                        "image_url": "https://example.com/cat.png",
                        "alt_text": "a cat",
                        "title": {"type": "plain_text", "text": "Cat"}
                    },
                    {"type": "divider"}
                ],
                "reactions": [{"name": "+1", "users": ["U2"], "count": 2}],
                "files": [{"id": "F1", "name": "report.pdf", "user": "U1"}]
            },
            {"type": "message", "subtype": "bot_message", "text": "beep", "ts": "1700000001.000100"}
        ],
        "has_more": false,
        "response_metadata": {"next_cursor": ""}
    }"##;

    #[test]
    fn parses_history_with_unknown_kinds() {
        let response: HistoryResponse = serde_json::from_str(HISTORY).unwrap();
        let messages = response.messages.unwrap();
        assert_eq!(messages.len(), 2);

        let first = &messages[0];
        assert_eq!(first.user.as_deref(), Some("U1"));
        assert_eq!(first.reactions[0].count, 2);
        assert_eq!(first.files[0].name, "report.pdf");
        assert_eq!(first.blocks.len(), 3);
        assert_eq!(first.blocks[2], Block::Unknown);

        let Block::RichText { elements } = &first.blocks[0] else {
            panic!("expected rich_text block");
        };
        assert_eq!(elements[2], Segment::Unknown);

        let Segment::RichTextSection { elements: pieces } = &elements[0] else {
            panic!("expected section");
        };
        assert_eq!(pieces[3], Piece::Unknown);
        assert_eq!(
            pieces[1],
            Piece::Text {
                text: "world".to_string(),
                style: Some(TextStyle {
                    bold: true,
                    ..TextStyle::default()
                }),
            }
        );

        let Segment::RichTextList { style, indent, .. } = &elements[1] else {
            panic!("expected list");
        };
        assert_eq!(*style, ListStyle::Ordered);
        assert_eq!(*indent, 1);

        let bot = &messages[1];
        assert!(bot.user.is_none());
        assert_eq!(bot.content(), Content::Text("beep"));
    }

    #[test]
    fn null_lists_read_as_empty() {
        let message: Message = serde_json::from_str(
            r#"{"user": "U1", "text": "hi", "ts": "1.0", "blocks": null, "reactions": null, "files": null}"#,
        )
        .unwrap();
        assert!(message.blocks.is_empty());
        assert!(message.reactions.is_empty());
        assert!(message.files.is_empty());
        assert_eq!(message.content(), Content::Text("hi"));

        let block: Block =
            serde_json::from_str(r#"{"type": "rich_text", "elements": null}"#).unwrap();
        assert_eq!(block, Block::RichText { elements: Vec::new() });

        let segment: Segment = serde_json::from_str(
            r#"{"type": "rich_text_list", "elements": [{"type": "rich_text_section", "elements": null}]}"#,
        )
        .unwrap();
        let Segment::RichTextList { elements, .. } = segment else {
            panic!("expected list");
        };
        assert_eq!(elements, vec![ListItem::default()]);
    }

    #[test]
    fn unknown_kinds_survive_a_snapshot_round_trip() {
        let response: HistoryResponse = serde_json::from_str(HISTORY).unwrap();
        let messages = response.messages.unwrap();

        let stored = serde_json::to_string(&messages).unwrap();
        let restored: Vec<Message> = serde_json::from_str(&stored).unwrap();

        assert_eq!(restored, messages);
    }
}
