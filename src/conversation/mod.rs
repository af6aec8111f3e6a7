//! Conversation data: turns, history and session identity.

pub mod history;
pub mod ids;
pub mod turn;

pub use history::ConversationHistory;
pub use ids::SessionId;
pub use turn::{Role, RoleParseError, Turn};
