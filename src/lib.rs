//! Forum thread RSS.
//!
//! A service that crawls the latest pages of a 4pda forum thread and serves
//! its most recent messages as an RSS feed.

pub mod config;
pub mod constants;
pub mod forum;
pub mod rss;
pub mod web;
