pub mod commands;
pub mod gateway;
pub mod handlers;
pub mod model;
pub mod queries;
pub mod webhook;
