// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![deny(elided_lifetimes_in_paths)]
#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused,
    unused_lifetimes,
    unused_qualifications,
    unused_results,
    anonymous_parameters,
    deprecated_in_future,
    elided_lifetimes_in_paths,
    explicit_outlives_requirements,
    keyword_idents,
    macro_use_extern_crate,
    missing_doc_code_examples,
    private_doc_tests,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::unseparated_literal_suffix,
    clippy::decimal_literal_representation,
    clippy::single_char_lifetime_names,
    clippy::fallible_impl_from,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::wildcard_enum_match_arm,
    clippy::deref_by_slicing,
    clippy::default_numeric_fallback,
    clippy::shadow_reuse,
    clippy::clone_on_ref_ptr,
    clippy::todo,
    clippy::string_add,
    clippy::use_debug,
    clippy::future_not_send
)]
#![cfg_attr(not(test), warn(clippy::panic_in_result_fn))]

mod api;
mod command;
mod error;
mod metadata;
mod model;
mod operations;
mod password;
mod render;
mod session;
mod storage;
#[cfg(test)]
mod test_support;

use std::{path::PathBuf, process, sync::Arc};

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use error::Result;
use log::{error, warn};
use url::Url;

#[derive(Debug, Subcommand)]
enum Command {
    Login(command::login::Login),
    Register(command::login::Register),
    Logout(command::login::Logout),
    Whoami(command::login::Whoami),
    Courses(command::courses::Courses),
    Show(command::courses::Show),
    Add(command::courses::Add),
    Update(command::courses::Update),
    Delete(command::courses::Delete),
    Enroll(command::enrollments::Enroll),
    Enrollments(command::enrollments::Enrollments),
}

#[async_trait]
impl command::Command for Command {
    async fn execute<S: storage::Storage<session::Data>>(
        self,
        ctx: &mut command::Context<S>,
    ) -> Result<()> {
        match self {
            Self::Login(cmd) => command::Command::execute(cmd, ctx).await,
            Self::Register(cmd) => command::Command::execute(cmd, ctx).await,
            Self::Logout(cmd) => command::Command::execute(cmd, ctx).await,
            Self::Whoami(cmd) => command::Command::execute(cmd, ctx).await,
            Self::Courses(cmd) => command::Command::execute(cmd, ctx).await,
            Self::Show(cmd) => command::Command::execute(cmd, ctx).await,
            Self::Add(cmd) => command::Command::execute(cmd, ctx).await,
            Self::Update(cmd) => command::Command::execute(cmd, ctx).await,
            Self::Delete(cmd) => command::Command::execute(cmd, ctx).await,
            Self::Enroll(cmd) => command::Command::execute(cmd, ctx).await,
            Self::Enrollments(cmd) => command::Command::execute(cmd, ctx).await,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// The base URL of the course service API.
    #[arg(long, env = "ROSTER_URL", default_value = metadata::DEFAULT_URL, value_parser = Url::parse)]
    url: Url,

    /// Keep the session in memory only, so it ends with this process.
    #[arg(long)]
    memory_session: bool,

    /// The path to the Pinentry program to use when asking for the login
    /// password.
    #[arg(long, value_hint = clap::ValueHint::ExecutablePath)]
    pinentry_program: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

fn get_session_storage(args: &Args) -> Box<dyn storage::Storage<session::Data>> {
    if !args.memory_session {
        if let Some(file_storage) = storage::File::new("session.json") {
            return Box::new(file_storage);
        }
        warn!("We could not find a data directory, so the session will not outlive this process");
    }

    Box::new(storage::Memory::<session::Data>::new())
}

async fn run(args: Args) -> Result<()> {
    let prompt: Vec<Box<dyn password::Prompt>> = vec![
        Box::new(args.pinentry_program.clone().map_or_else(
            password::PinentryPrompt::new,
            password::PinentryPrompt::new_with_executable,
        )),
        Box::new(password::RpasswordPrompt),
    ];

    let store = session::Store::new(get_session_storage(&args));
    let client = api::Client::new(args.url, store, Arc::new(command::LoginHint))?;
    let mut ctx = command::Context::new(client, Box::new(prompt));

    let result = command::Command::execute(args.command, &mut ctx).await;
    ctx.flush();

    result
}

#[tokio::main]
async fn main() {
    let logger_env = env_logger::Env::new()
        .filter_or("ROSTER_LOG", "warn")
        .write_style("ROSTER_LOG_STYLE");
    env_logger::Builder::from_env(logger_env).init();

    if let Err(e) = run(Args::parse()).await {
        error!("We encountered an error: {}", e);
        process::exit(1);
    };
}
