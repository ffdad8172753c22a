use crate::{
    highlight::EmptyContent,
    mattermost::{channel::ChannelName, error::ApiError, user::Username},
};
use std::{io, path::PathBuf};
use thiserror::Error;

/// Sum type representing every way an invocation can fail. All of them are
/// fatal: they're reported once and the process exits with status 1.
#[derive(Debug, Error)]
pub enum Failure {
    #[error("Failed to read config file {}: {}", .0.display(), .1)]
    ConfigFile(PathBuf, ini::Error),
    #[error("Invalid value {value:?} for `{key}` in instance [{instance}]")]
    ConfigValue {
        instance: String,
        key: &'static str,
        value: String,
    },
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Either --channel or --user is required")]
    NoTarget,
    #[error("Cannot specify both --channel and --user")]
    ConflictingTargets,
    #[error("No channel found named {0}")]
    UnknownChannel(ChannelName),
    #[error("No user found named {0}")]
    UnknownUser(Username),
    #[error("Failed to read {0}: {1}")]
    Read(String, io::Error),
    #[error(transparent)]
    EmptyContent(#[from] EmptyContent),
}
