// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use log::info;

use super::Context;
use crate::{
    error::Result,
    model::Registration,
    operations, session,
    storage::Storage,
};

/// Sign in and keep the session for later commands.
#[derive(Debug, Parser)]
pub(crate) struct Login {
    /// The account to sign in as.
    #[arg(long, env = "ROSTER_EMAIL")]
    email: String,

    /// Read the password from the first line of standard input instead of
    /// prompting for it.
    #[arg(long)]
    password_stdin: bool,
}

#[async_trait]
impl super::Command for Login {
    async fn execute<S: Storage<session::Data>>(self, ctx: &mut Context<S>) -> Result<()> {
        let password = ctx.password(&self.email, self.password_stdin).await?;

        let result = operations::login(ctx.client(), &self.email, &password).await;
        let profile = ctx.report(result)?;

        if !ctx.client().store().is_persistent().await {
            info!("The session is kept in memory and ends with this process");
        }
        ctx.success(format!("Signed in as {} ({})", profile.email(), profile.role()));
        Ok(())
    }
}

/// Create an account. Sign in with `login` afterwards.
#[derive(Debug, Parser)]
pub(crate) struct Register {
    /// The name shown for the new account.
    #[arg(long)]
    name: String,

    #[arg(long, env = "ROSTER_EMAIL")]
    email: String,

    /// Read the password from the first line of standard input instead of
    /// prompting for it.
    #[arg(long)]
    password_stdin: bool,
}

#[async_trait]
impl super::Command for Register {
    async fn execute<S: Storage<session::Data>>(self, ctx: &mut Context<S>) -> Result<()> {
        let password = ctx.password(&self.email, self.password_stdin).await?;
        let registration = Registration {
            name: &self.name,
            email: &self.email,
            password: &password,
        };

        let result = operations::register(ctx.client(), &registration).await;
        ctx.report(result)?;
        ctx.success(format!("Registered {}. You can now log in.", self.email));
        Ok(())
    }
}

/// End the current session.
#[derive(Debug, Parser)]
pub(crate) struct Logout {}

#[async_trait]
impl super::Command for Logout {
    async fn execute<S: Storage<session::Data>>(self, ctx: &mut Context<S>) -> Result<()> {
        ctx.client().store().clear_session().await?;
        ctx.success("Signed out");
        Ok(())
    }
}

/// Show who the current session belongs to.
#[derive(Debug, Parser)]
pub(crate) struct Whoami {}

#[async_trait]
impl super::Command for Whoami {
    async fn execute<S: Storage<session::Data>>(self, ctx: &mut Context<S>) -> Result<()> {
        ctx.require_auth().await?;
        if let Some(data) = ctx.client().store().session().await {
            println!("{} ({})", data.email(), data.role());
        }
        Ok(())
    }
}
