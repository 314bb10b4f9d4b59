//! Completion request assembly.
//!
//! Layout: system = instruction + retrieved context, then every prior turn
//! of the session in arrival order, then the new query as the last user
//! message.

use braite_types::chat::Turn;
use braite_types::llm::{CompletionRequest, Message};
use braite_types::prompt::PromptTemplate;

use super::pipeline::PipelineSettings;

/// Build a [`CompletionRequest`] for one query.
pub fn build_completion_request(
    template: &PromptTemplate,
    context: &str,
    history: &[Turn],
    query: &str,
    settings: &PipelineSettings,
) -> CompletionRequest {
    let mut messages: Vec<Message> = history.iter().map(Message::from).collect();
    messages.push(Message::user(query));

    CompletionRequest {
        model: settings.model.clone(),
        messages,
        system: Some(template.render(context)),
        max_tokens: settings.max_tokens,
        temperature: Some(settings.temperature),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use braite_types::llm::MessageRole;

    #[test]
    fn test_request_without_history() {
        let template = PromptTemplate::new("Instruksi. {context}").unwrap();
        let req = build_completion_request(
            &template,
            "",
            &[],
            "Apa itu JKN?",
            &PipelineSettings::default(),
        );

        assert_eq!(req.system.as_deref(), Some("Instruksi. "));
        assert_eq!(req.messages, vec![Message::user("Apa itu JKN?")]);
    }

    #[test]
    fn test_request_places_history_before_query() {
        let template = PromptTemplate::fallback();
        let history = vec![
            Turn::user("q1"),
            Turn::assistant("a1"),
            Turn::user("q2"),
            Turn::assistant("a2"),
        ];
        let req = build_completion_request(
            &template,
            "chunk A\n\nchunk B",
            &history,
            "q3",
            &PipelineSettings::default(),
        );

        let roles: Vec<_> = req.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User,
            ]
        );
        let contents: Vec<_> = req.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["q1", "a1", "q2", "a2", "q3"]);
        assert!(req.system.unwrap().ends_with("chunk A\n\nchunk B"));
    }

    #[test]
    fn test_request_carries_model_settings() {
        let settings = PipelineSettings {
            model: "gemini-2.0-flash".to_string(),
            max_tokens: 512,
            temperature: 0.1,
            ..PipelineSettings::default()
        };
        let req = build_completion_request(&PromptTemplate::fallback(), "", &[], "q", &settings);
        assert_eq!(req.model, "gemini-2.0-flash");
        assert_eq!(req.max_tokens, 512);
        assert_eq!(req.temperature, Some(0.1));
    }
}
