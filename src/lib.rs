#![deny(warnings)]

pub mod adapters;
pub mod admin_session;
pub mod app_config;
pub mod commands;
pub mod entities;
pub mod handlers;
pub mod ports;
