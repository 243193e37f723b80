pub mod chatbot;
pub mod session;
