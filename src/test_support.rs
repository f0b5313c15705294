// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! Shared fixtures for the unit tests.

use std::{
    net::TcpListener,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use secrecy::SecretString;
use url::Url;

use crate::{
    api::{self, Navigator},
    error::Result,
    password::{Prompt, Request},
    session::{self, Role, Token},
    storage::Memory,
};

pub(crate) type TestClient = api::Client<Memory<session::Data>>;

/// Counts how often the user was sent back to log in.
#[derive(Default)]
pub(crate) struct Redirects(AtomicUsize);

impl Redirects {
    pub(crate) fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl Navigator for Redirects {
    fn redirect_to_login(&self) {
        let _ = self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) fn client(url: &str) -> Result<(TestClient, Arc<Redirects>)> {
    let redirects = Arc::new(Redirects::default());
    let navigator: Arc<dyn Navigator> = Arc::<Redirects>::clone(&redirects);
    let client = api::Client::new(Url::parse(url)?, session::Store::new(Memory::new()), navigator)?;
    Ok((client, redirects))
}

pub(crate) async fn signed_in(
    url: &str,
    token: &str,
    role: Role,
) -> Result<(TestClient, Arc<Redirects>)> {
    let (client, redirects) = client(url)?;
    client
        .store()
        .set_session(Token::new(token), "ada@example.com".to_owned(), role)
        .await?;
    Ok((client, redirects))
}

/// A local address nothing is listening on.
pub(crate) fn unreachable_url() -> String {
    let port = TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .map(|addr| addr.port())
        .unwrap_or(9);
    format!("http://127.0.0.1:{port}/")
}

pub(crate) fn course_json(id: u64, title: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "description": format!("All about {title}"),
        "instructorName": "Grace Hopper"
    })
}

/// Answers every password prompt the same way; `None` means no prompt is
/// available.
pub(crate) struct FixedPassword(pub(crate) Option<&'static str>);

#[async_trait]
impl Prompt for FixedPassword {
    async fn prompt(&self, _: Request) -> Result<Option<SecretString>> {
        Ok(self.0.map(|p| SecretString::new(p.to_owned())))
    }
}
