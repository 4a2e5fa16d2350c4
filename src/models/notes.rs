use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::ordering::Ordered;

/// An image attached to a topic or sub-topic.
///
/// The `url` is an opaque reference into asset storage; uploads are
/// resolved to URLs before parsing, so the tree never carries raw bytes.
/// Images are owned exclusively by the node holding them, never shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub alt_text: String,
}

impl Image {
    /// The image produced by a `![Image](url)` markup line.
    pub fn from_markup(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            caption: String::new(),
            alt_text: "Image".to_string(),
        }
    }
}

/// Second-level node of the revision-notes hierarchy.
///
/// Owned exclusively by its parent topic; it has no independent lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTopic {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub order: i32,
    /// At most one image per sub-topic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
}

impl SubTopic {
    pub fn new(order: i32, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: String::new(),
            order,
            image: None,
        }
    }

    /// Append a line of free content, newline-joined.
    pub fn push_content(&mut self, line: &str) {
        push_line(&mut self.content, line);
    }

    /// Attach an image, replacing any existing one.
    pub fn set_image(&mut self, image: Image) {
        self.image = Some(image);
    }
}

/// Top-level node of the revision-notes hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    /// Assigned by the server on first persistence; absent within a parse
    /// batch, where identity is positional.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub order: i32,
    /// Modeled as a list, but the import and editing paths keep at most
    /// one image per node.
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub sub_topics: Vec<SubTopic>,
}

impl Topic {
    pub fn new(order: i32, title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: String::new(),
            order,
            images: Vec::new(),
            sub_topics: Vec::new(),
        }
    }

    /// Append a line of free content, newline-joined.
    pub fn push_content(&mut self, line: &str) {
        push_line(&mut self.content, line);
    }

    pub fn add_image(&mut self, image: Image) {
        self.images.push(image);
    }
}

impl Ordered for Topic {
    fn order(&self) -> i32 {
        self.order
    }
}

impl Ordered for SubTopic {
    fn order(&self) -> i32 {
        self.order
    }
}

fn push_line(buf: &mut String, line: &str) {
    if !buf.is_empty() {
        buf.push('\n');
    }
    buf.push_str(line);
}
