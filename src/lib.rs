pub mod accounts;
pub mod auctions;
pub mod auth;
pub mod chatbot;
pub mod config;
pub mod database;
pub mod error;
pub mod media;
pub mod messaging;
pub mod notifications;
pub mod pagination;
pub mod payments;
pub mod routes;
pub mod scheduler;
pub mod signals;
pub mod state;
