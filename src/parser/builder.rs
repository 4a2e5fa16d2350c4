use crate::models::notes::{Image, SubTopic, Topic};
use crate::ordering::sort_by_order;
use crate::parser::tokens::{tokenize, LineToken};

/// Accumulator threaded through the token fold.
///
/// Holds the finished topics plus the currently open topic/sub-topic
/// context that free content and images attach to.
#[derive(Debug, Default)]
struct BuilderState {
    finished: Vec<Topic>,
    open_topic: Option<Topic>,
    open_sub: Option<SubTopic>,
}

impl BuilderState {
    /// Finalize the open sub-topic into its parent topic.
    fn close_sub(&mut self) {
        if let Some(sub) = self.open_sub.take() {
            if let Some(topic) = self.open_topic.as_mut() {
                topic.sub_topics.push(sub);
            }
        }
    }

    /// Finalize the open sub-topic, then the open topic.
    fn close_topic(&mut self) {
        self.close_sub();
        if let Some(topic) = self.open_topic.take() {
            self.finished.push(topic);
        }
    }

    fn step(mut self, token: LineToken) -> Self {
        match token {
            LineToken::MainHeader { order, title } => {
                self.close_topic();
                self.open_topic = Some(Topic::new(order, title));
            }
            LineToken::SubHeader { order, title } => {
                // A sub-topic needs an open topic; otherwise the header is dropped.
                if self.open_topic.is_some() {
                    self.close_sub();
                    self.open_sub = Some(SubTopic::new(order, title));
                }
            }
            LineToken::ImageRef { url } => {
                let image = Image::from_markup(url);
                if let Some(sub) = self.open_sub.as_mut() {
                    sub.set_image(image);
                } else if let Some(topic) = self.open_topic.as_mut() {
                    topic.add_image(image);
                }
                // No open context: the image reference is dropped.
            }
            LineToken::Content(text) => {
                if let Some(sub) = self.open_sub.as_mut() {
                    sub.push_content(&text);
                } else if let Some(topic) = self.open_topic.as_mut() {
                    topic.push_content(&text);
                }
                // No open context: the line is dropped.
            }
        }
        self
    }
}

/// Parse a bulk markup blob into an ordered list of topics.
///
/// Pure and deterministic: the same text always yields the same tree, and
/// malformed markup never fails — worst case is mis-attributed content.
/// Topics come back sorted ascending by `order`, as do the sub-topics
/// within each topic; ties keep their input order.
pub fn parse_bulk_text(text: &str) -> Vec<Topic> {
    let mut state = tokenize(text)
        .into_iter()
        .fold(BuilderState::default(), BuilderState::step);
    state.close_topic();

    let mut topics = state.finished;
    sort_by_order(&mut topics);
    for topic in &mut topics {
        sort_by_order(&mut topic.sub_topics);
    }
    topics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics_sorted_by_order() {
        let topics = parse_bulk_text("## [2] B\ncontent B\n## [1] A\ncontent A");
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].title, "A");
        assert_eq!(topics[0].order, 1);
        assert_eq!(topics[0].content, "content A");
        assert_eq!(topics[1].title, "B");
        assert_eq!(topics[1].order, 2);
        assert_eq!(topics[1].content, "content B");
    }

    #[test]
    fn test_sub_topics_carry_their_own_content() {
        let topics = parse_bulk_text("## [1] A\n### [1] Sub1\nfoo\n### [2] Sub2\nbar");
        assert_eq!(topics.len(), 1);
        let topic = &topics[0];
        assert_eq!(topic.title, "A");
        assert!(topic.content.is_empty());
        assert_eq!(topic.sub_topics.len(), 2);
        assert_eq!(topic.sub_topics[0].title, "Sub1");
        assert_eq!(topic.sub_topics[0].content, "foo");
        assert_eq!(topic.sub_topics[1].title, "Sub2");
        assert_eq!(topic.sub_topics[1].content, "bar");
    }

    #[test]
    fn test_sub_topics_sorted_within_parent() {
        let topics = parse_bulk_text("## [1] A\n### [9] Last\n### [2] First");
        let subs: Vec<_> = topics[0].sub_topics.iter().map(|s| s.order).collect();
        assert_eq!(subs, vec![2, 9]);
    }

    #[test]
    fn test_content_before_any_header_is_discarded() {
        let topics = parse_bulk_text("orphan line\n![Image](/a.png)\n## [1] A\nkept");
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].content, "kept");
        assert!(topics[0].images.is_empty());
    }

    #[test]
    fn test_sub_header_without_topic_is_discarded() {
        let topics = parse_bulk_text("### [1] Floating sub\n## [1] A");
        assert_eq!(topics.len(), 1);
        assert!(topics[0].sub_topics.is_empty());
    }

    #[test]
    fn test_image_attaches_to_topic_then_sub_topic() {
        let text = "## [1] A\n![Image](/topic.png)\n### [1] S\n![Image](/sub.png)";
        let topics = parse_bulk_text(text);
        assert_eq!(topics[0].images.len(), 1);
        assert_eq!(topics[0].images[0].url, "/topic.png");
        let sub = &topics[0].sub_topics[0];
        assert_eq!(sub.image.as_ref().unwrap().url, "/sub.png");
    }

    #[test]
    fn test_second_sub_topic_image_replaces_first() {
        let text = "## [1] A\n### [1] S\n![Image](/one.png)\n![Image](/two.png)";
        let topics = parse_bulk_text(text);
        let sub = &topics[0].sub_topics[0];
        assert_eq!(sub.image.as_ref().unwrap().url, "/two.png");
    }

    #[test]
    fn test_content_after_sub_topic_stays_with_sub_topic() {
        let text = "## [1] A\ntopic line\n### [1] S\nsub line one\nsub line two";
        let topics = parse_bulk_text(text);
        assert_eq!(topics[0].content, "topic line");
        assert_eq!(topics[0].sub_topics[0].content, "sub line one\nsub line two");
    }

    #[test]
    fn test_separators_never_become_content() {
        let text = "## [1] A\nbefore\n---\nafter";
        let topics = parse_bulk_text(text);
        assert_eq!(topics[0].content, "before\nafter");
    }

    #[test]
    fn test_malformed_header_becomes_topic_content() {
        let text = "## [1] A\n## [x] Not a header";
        let topics = parse_bulk_text(text);
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].content, "## [x] Not a header");
    }

    #[test]
    fn test_parse_is_deterministic() {
        let text = "## [2] B\n### [1] S\nx\n## [1] A\n![Image](/a.png)";
        assert_eq!(parse_bulk_text(text), parse_bulk_text(text));
    }

    #[test]
    fn test_duplicate_orders_keep_input_order() {
        let topics = parse_bulk_text("## [1] First\n## [1] Second\n## [1] Third");
        let titles: Vec<_> = topics.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_empty_input_yields_no_topics() {
        assert!(parse_bulk_text("").is_empty());
        assert!(parse_bulk_text("\n\n---\n").is_empty());
    }

    #[test]
    fn test_trailing_open_contexts_are_finalized() {
        let text = "## [1] A\n### [1] S\ndangling";
        let topics = parse_bulk_text(text);
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].sub_topics.len(), 1);
        assert_eq!(topics[0].sub_topics[0].content, "dangling");
    }
}
