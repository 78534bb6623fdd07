pub mod bot;
pub mod commands;
pub mod handlers;
pub mod knowledge_base;
pub mod llm;
pub mod matcher;
pub mod model;
pub mod models;
pub mod queries;
pub mod seed;
pub mod similarity;
pub mod text;
