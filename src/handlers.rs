pub mod chatbot;
pub mod explain;
pub mod failures;
pub mod health;
pub mod histogram;
pub mod portfolio;
pub mod recommendations;
