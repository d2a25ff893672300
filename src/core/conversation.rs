//! # Conversation Store
//!
//! The ordered thread plus the single "awaiting response" flag. Append-only:
//! messages are never reordered, deduplicated, edited or evicted.

use crate::core::attachment::Attachment;
use crate::core::message::{Message, Role};

#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    is_loading: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message to the end of the thread.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// The image of the newest model reply that carried one.
    pub fn last_model_image(&self) -> Option<&Attachment> {
        self.messages
            .iter()
            .rev()
            .filter(|m| m.role() == Role::Model)
            .find_map(Message::attachment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty_and_idle() {
        let conv = Conversation::new();
        assert!(conv.is_empty());
        assert_eq!(conv.len(), 0);
        assert!(!conv.is_loading());
    }

    #[test]
    fn test_append_preserves_order_and_duplicates() {
        let mut conv = Conversation::new();
        let first = Message::user("same", None);
        conv.append(first.clone());
        conv.append(Message::model("reply".into(), None));
        conv.append(first.clone());

        let texts: Vec<_> = conv.messages().iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec![Some("same"), Some("reply"), Some("same")]);
        assert_eq!(conv.messages()[0].id(), conv.messages()[2].id());
    }

    #[test]
    fn test_set_loading_toggles() {
        let mut conv = Conversation::new();
        conv.set_loading(true);
        assert!(conv.is_loading());
        conv.set_loading(false);
        assert!(!conv.is_loading());
    }

    #[test]
    fn test_last_model_image_skips_user_images() {
        let mut conv = Conversation::new();
        conv.append(Message::user("", Some(Attachment::from_bytes(vec![1], "image/png"))));
        assert!(conv.last_model_image().is_none());

        conv.append(Message::model("ok".into(), Some(Attachment::from_bytes(vec![2], "image/png"))));
        conv.append(Message::model("text only".into(), None));

        let image = conv.last_model_image().unwrap();
        assert_eq!(image.load_bytes().unwrap(), vec![2]);
    }
}
