//! A small client for the Mattermost REST API (v4), covering only what's
//! needed to find a destination and post to it.
//!
//! See [api::MattermostClient].

pub mod api;
pub mod auth;
pub mod channel;
pub mod error;
pub mod file;
pub mod post;
pub mod team;
pub mod user;
