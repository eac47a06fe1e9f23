use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the session transcript. Append-only, no ids, no
/// timestamps; the whole log is discarded when the process exits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

pub struct ConversationState {
    turns: Vec<Turn>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    pub fn add_user_message(&mut self, message: &str) {
        self.turns.push(Turn {
            role: Role::User,
            content: message.to_string(),
        });
    }

    pub fn add_assistant_message(&mut self, message: &str) {
        self.turns.push(Turn {
            role: Role::Assistant,
            content: message.to_string(),
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last_assistant_message(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|turn| turn.role == Role::Assistant)
            .map(|turn| turn.content.as_str())
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_append_in_order() {
        let mut state = ConversationState::new();
        state.add_user_message("How much for a WhatsApp bot?");
        state.add_assistant_message("It starts at 100k NGN.");

        assert_eq!(state.len(), 2);
        assert_eq!(state.turns()[0].role, Role::User);
        assert_eq!(state.turns()[1].role, Role::Assistant);
        assert_eq!(state.turns()[1].content, "It starts at 100k NGN.");
    }

    #[test]
    fn last_assistant_message_picks_most_recent() {
        let mut state = ConversationState::new();
        assert_eq!(state.last_assistant_message(), None);

        state.add_user_message("first question");
        state.add_assistant_message("first answer");
        state.add_user_message("second question");
        assert_eq!(state.last_assistant_message(), Some("first answer"));

        state.add_assistant_message("second answer");
        assert_eq!(state.last_assistant_message(), Some("second answer"));
    }

    #[test]
    fn alternation_is_not_enforced() {
        // A failed generation leaves a trailing user turn; the next submit
        // then appends another user turn directly after it.
        let mut state = ConversationState::new();
        state.add_user_message("first");
        state.add_user_message("second");

        assert_eq!(state.len(), 2);
        assert_eq!(state.last_assistant_message(), None);
    }

    #[test]
    fn turns_serialize_with_lowercase_roles() {
        let turn = Turn {
            role: Role::Assistant,
            content: "It starts at 100k NGN.".to_string(),
        };

        assert_eq!(
            serde_json::to_string(&turn).expect("turn serializes"),
            r#"{"role":"assistant","content":"It starts at 100k NGN."}"#
        );
    }
}
