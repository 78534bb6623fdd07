pub mod commands;
pub mod handlers;
pub mod model;
pub mod queries;
pub mod service;
