use braite_types::error::DeliveryError;

/// Outbound messaging to the chat platform.
///
/// Implementations apply their own bounded timeout; callers treat every
/// failure as loggable, never fatal.
pub trait MessageTransport: Send + Sync + 'static {
    /// Deliver `text` to conversation `chat_id`.
    fn deliver(
        &self,
        chat_id: &str,
        text: &str,
    ) -> impl std::future::Future<Output = Result<(), DeliveryError>> + Send;

    /// Show a "working on it" indicator in the conversation.
    fn send_typing(
        &self,
        chat_id: &str,
    ) -> impl std::future::Future<Output = Result<(), DeliveryError>> + Send;
}
