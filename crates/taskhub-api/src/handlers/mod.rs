//! Route handlers organized by domain.

pub mod admin;
pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod event;
pub mod health;
pub mod notification;
pub mod project;
pub mod task;
pub mod user;
pub mod ws;
