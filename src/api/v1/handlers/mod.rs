pub mod chatbot;
pub mod health;
pub mod session;
