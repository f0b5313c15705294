// SPDX-FileCopyrightText: 2022 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::time::Instant;

use async_trait::async_trait;
use log::warn;
use secrecy::SecretString;

use crate::{
    api::{self, Navigator},
    error::{self, Error, Result},
    metadata,
    operations::OperationResult,
    password::{self, Prompt},
    render::{NoticeKind, Notices},
    session,
    storage::Storage,
};

pub(crate) mod courses;
pub(crate) mod enrollments;
pub(crate) mod login;

#[async_trait]
pub(crate) trait Command {
    async fn execute<S: Storage<session::Data>>(self, ctx: &mut Context<S>) -> Result<()>;
}

/// Tells the user to sign in again.
pub(crate) struct LoginHint;

impl Navigator for LoginHint {
    fn redirect_to_login(&self) {
        warn!(
            "You are not signed in. Run `{} login` to start a new session.",
            *metadata::CLIENT_TYPE_ID
        );
    }
}

/// Everything a command needs: the API client, the notice slot and a way to
/// ask for a password.
pub(crate) struct Context<S> {
    client: api::Client<S>,
    notices: Notices,
    prompt: Box<dyn Prompt>,
}

impl<S: Storage<session::Data>> Context<S> {
    pub(crate) fn new(client: api::Client<S>, prompt: Box<dyn Prompt>) -> Self {
        Self {
            client,
            notices: Notices::default(),
            prompt,
        }
    }

    pub(crate) const fn client(&self) -> &api::Client<S> {
        &self.client
    }

    #[cfg(test)]
    pub(crate) const fn notices(&self) -> &Notices {
        &self.notices
    }

    /// Asks for the password of `email`, from standard input if `stdin` is
    /// set and from the interactive prompts otherwise.
    pub(crate) async fn password(&self, email: &str, stdin: bool) -> Result<SecretString> {
        if stdin {
            password::ask(&password::StdinPrompt, email, error::Password::Empty).await
        } else {
            password::ask(&self.prompt, email, error::Password::NoPrompt).await
        }
    }

    pub(crate) fn success<M: Into<String>>(&mut self, message: M) {
        self.notices.show_success(message, Instant::now());
    }

    /// Passes a successful outcome through. A failure becomes the error notice
    /// and fails the command.
    pub(crate) fn report<T>(&mut self, result: OperationResult<T>) -> Result<T> {
        result.map_err(|failure| {
            self.notices.show_error(failure.to_string(), Instant::now());
            Error::Command
        })
    }

    /// Fails the command unless there is a session to use.
    pub(crate) async fn require_auth(&self) -> Result<()> {
        if self.client.require_auth().await {
            Ok(())
        } else {
            Err(Error::Command)
        }
    }

    /// Prints the notice that is still visible, if any.
    pub(crate) fn flush(&mut self) {
        if let Some(notice) = self.notices.take(Instant::now()) {
            match notice.kind() {
                NoticeKind::Success => println!("{}", notice.message()),
                NoticeKind::Error => eprintln!("{}", notice.message()),
            }
        }
    }
}
