//! Application command handlers.

pub mod end_conversation;
pub mod get_conversation;
pub mod send_message;
pub mod start_conversation;

pub use end_conversation::{EndConversationError, EndConversationHandler};
pub use get_conversation::{GetConversationError, GetConversationHandler};
pub use send_message::{
    SendMessageCommand, SendMessageError, SendMessageHandler, SendMessageResult,
};
pub use start_conversation::{
    StartConversationError, StartConversationHandler, StartConversationResult, GREETING,
};
