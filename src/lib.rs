//! Newsdesk - news portal backend
//!
//! Categories, articles with breaking-news flags, reader comments and a
//! trending ranking that scores articles 0-100 from views, comments and
//! recency.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod trending;
