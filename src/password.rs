// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    ffi::OsString,
    io::{self, BufRead},
    path::Path,
};

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::task;

use crate::{
    error::{self, Error, Result},
    metadata,
};

/// What the user is asked for: the password of one account.
#[derive(Debug, Clone)]
pub(crate) struct Request {
    email: String,
}

impl Request {
    pub(crate) fn for_account(email: &str) -> Self {
        Self {
            email: email.to_owned(),
        }
    }
}

#[async_trait]
pub(crate) trait Prompt: Send + Sync {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>>;
}

#[async_trait]
impl<T: Prompt + ?Sized> Prompt for Box<T> {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>> {
        (**self).prompt(req).await
    }
}

#[async_trait]
impl<T: Prompt> Prompt for Vec<T> {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>> {
        for candidate in self {
            if let r @ (Ok(Some(_)) | Err(_)) = candidate.prompt(req.clone()).await {
                return r;
            }
        }

        Ok(None)
    }
}

/// Asks `prompt` for the password of `email`. No answer is the error
/// `missing`.
pub(crate) async fn ask<P: Prompt + ?Sized>(
    prompt: &P,
    email: &str,
    missing: error::Password,
) -> Result<SecretString> {
    prompt
        .prompt(Request::for_account(email))
        .await?
        .ok_or(Error::Password(missing))
}

pub(crate) struct PinentryPrompt {
    executable: Option<OsString>,
}

impl PinentryPrompt {
    pub(crate) const fn new() -> Self {
        Self { executable: None }
    }

    pub(crate) fn new_with_executable<P: AsRef<Path>>(executable: P) -> Self {
        Self {
            executable: Some(executable.as_ref().as_os_str().into()),
        }
    }
}

#[async_trait]
impl Prompt for PinentryPrompt {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>> {
        fn interact<'input>(
            mut input: pinentry::PassphraseInput<'input>,
            title: &'input str,
            description: &'input str,
        ) -> Result<SecretString> {
            _ = input.required("A password is required to sign in.");
            _ = input.with_title(title);
            _ = input.with_description(description);
            _ = input.with_prompt("Password");

            Ok(input.interact()?)
        }

        let title = format!("Sign in - {}", *metadata::CLIENT_DISPLAY_NAME);
        let description = format!("Enter the password for {}", req.email);

        let input = self
            .executable
            .as_ref()
            .and_then(pinentry::PassphraseInput::with_binary)
            .or_else(pinentry::PassphraseInput::with_default_binary)
            .map(|input| task::spawn_blocking(move || interact(input, &title, &description)));

        Ok(match input {
            Some(fut) => Some(fut.await??),
            None => None,
        })
    }
}

pub(crate) struct RpasswordPrompt;

#[async_trait]
impl Prompt for RpasswordPrompt {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>> {
        let label = format!("Password for {}: ", req.email);
        Ok(Some(
            task::spawn_blocking(move || rpassword::prompt_password(label).map(SecretString::new))
                .await??,
        ))
    }
}

/// Reads the password as the first line of standard input, for scripted use.
pub(crate) struct StdinPrompt;

#[async_trait]
impl Prompt for StdinPrompt {
    async fn prompt(&self, _: Request) -> Result<Option<SecretString>> {
        Ok(task::spawn_blocking(|| first_line(io::stdin().lock())).await??)
    }
}

/// The first line of `reader` without its line ending. An empty line or no
/// input at all is no password.
fn first_line<R: BufRead>(mut reader: R) -> io::Result<Option<SecretString>> {
    let mut line = String::new();
    let _ = reader.read_line(&mut line)?;

    let password = line.trim_end_matches(['\r', '\n']);
    Ok((!password.is_empty()).then(|| SecretString::new(password.to_owned())))
}
