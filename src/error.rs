// SPDX-FileCopyrightText: 2022 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{io, result};

use thiserror::Error;

pub(crate) type Result<T, E = Error> = result::Result<T, E>;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("IO operation failed: {0}")]
    Io(#[from] io::Error),
    #[error("JSON format error: {0}")]
    Json(serde_json::Error),
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("password retrieval error: {0}")]
    Password(#[from] Password),
    #[error("command execution failed")]
    Command,
    #[error("operation cancelled")]
    Cancelled,
}

impl From<pinentry::Error> for Error {
    fn from(value: pinentry::Error) -> Self {
        // LINT: Deliberate fall-through that should catch future cases added to
        // the enum.
        #[allow(
            clippy::wildcard_enum_match_arm,
            clippy::match_wildcard_for_single_variants
        )]
        match value {
            pinentry::Error::Cancelled | pinentry::Error::Timeout => Self::Cancelled,
            pinentry::Error::Io(e) => Self::Io(e),
            _ => Self::Password(Password::Pinentry(value)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        // LINT: Deliberate fall-through that should catch future cases added to
        // the enum.
        #[allow(clippy::wildcard_enum_match_arm)]
        match value.classify() {
            serde_json::error::Category::Io => Self::Io(value.into()),
            _ => Self::Json(value),
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Io(value.into())
    }
}

#[derive(Error, Debug)]
pub(crate) enum Password {
    #[error("no password prompt available")]
    NoPrompt,
    #[error("no password was given on standard input")]
    Empty,
    #[error("Pinentry implementation error: {0}")]
    Pinentry(pinentry::Error),
}

/// The outcome of a course operation that did not succeed. The display form of
/// each variant is the message shown to the user.
#[derive(Error, Debug)]
pub(crate) enum Failure {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Failed to connect to server")]
    Connect(#[source] Error),
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("You do not have permission to {0}")]
    PermissionDenied(&'static str),
    #[error("Already enrolled in this course")]
    AlreadyEnrolled,
    #[error("User with this email already exists")]
    EmailTaken,
    #[error("User not found")]
    UserNotFound,
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Rejected(&'static str),
    #[error("Unexpected response from server")]
    Malformed(#[source] Error),
    #[error("Could not update the stored session")]
    Session(#[source] Error),
}
