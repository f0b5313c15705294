// SPDX-FileCopyrightText: 2022 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{fmt, sync::Arc};

use futures_util::lock::Mutex;
use log::warn;
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use subtle::ConstantTimeEq as _;

use crate::{
    error::Result,
    model::UserId,
    storage::Storage,
};

/// An opaque bearer credential issued by the server at login.
#[derive(Clone)]
pub(crate) struct Token(SecretString);

impl Token {
    pub(crate) fn new<S: Into<String>>(value: S) -> Self {
        Self(SecretString::new(value.into()))
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.expose().as_bytes().ct_eq(other.expose().as_bytes()).into()
    }
}

impl Eq for Token {}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token([REDACTED])")
    }
}

impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// The role the server granted at login. Roles this client has no special
/// handling for are kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Role {
    Student,
    Admin,
    Other(String),
}

impl Role {
    pub(crate) fn as_str(&self) -> &str {
        match self {
            Self::Student => "STUDENT",
            Self::Admin => "ADMIN",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        match name.as_str() {
            "STUDENT" => Self::Student,
            "ADMIN" => Self::Admin,
            _ => Self::Other(name),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// The signed-in identity. The three fields are persisted as one record so a
/// reader never sees some of them without the others.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Data {
    token: Token,
    email: String,
    role: Role,
}

impl Data {
    pub(crate) const fn new(token: Token, email: String, role: Role) -> Self {
        Self { token, email, role }
    }

    pub(crate) fn email(&self) -> &str {
        &self.email
    }

    pub(crate) const fn role(&self) -> &Role {
        &self.role
    }
}

/// Session context shared by everything that talks to the server: the stored
/// identity plus the user identifier resolved for it.
pub(crate) struct Store<S> {
    storage: Arc<Mutex<S>>,
    user_id: Arc<Mutex<Option<(String, UserId)>>>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            user_id: Arc::clone(&self.user_id),
        }
    }
}

impl<S: Storage<Data>> Store<S> {
    pub(crate) fn new(storage: S) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
            user_id: Arc::new(Mutex::new(None)),
        }
    }

    pub(crate) async fn is_persistent(&self) -> bool {
        self.storage.lock().await.is_persistent()
    }

    pub(crate) async fn set_session(&self, token: Token, email: String, role: Role) -> Result<()> {
        let mut storage = self.storage.lock().await;
        storage.save(&Data::new(token, email, role)).await?;
        *self.user_id.lock().await = None;
        Ok(())
    }

    /// The stored session, if any. An unreadable store counts as signed out.
    pub(crate) async fn session(&self) -> Option<Data> {
        match self.storage.lock().await.load().await {
            Ok(data) => data,
            Err(e) => {
                warn!("Ignoring stored session that could not be read: {}", e);
                None
            }
        }
    }

    pub(crate) async fn token(&self) -> Option<Token> {
        self.session().await.map(|data| data.token)
    }

    pub(crate) async fn email(&self) -> Option<String> {
        self.session().await.map(|data| data.email)
    }

    pub(crate) async fn role(&self) -> Option<Role> {
        self.session().await.map(|data| data.role)
    }

    pub(crate) async fn is_authenticated(&self) -> bool {
        self.token().await.is_some()
    }

    pub(crate) async fn clear_session(&self) -> Result<()> {
        let mut storage = self.storage.lock().await;
        storage.clear().await?;
        *self.user_id.lock().await = None;
        Ok(())
    }

    pub(crate) async fn cached_user_id(&self, email: &str) -> Option<UserId> {
        match &*self.user_id.lock().await {
            Some((cached_email, id)) if cached_email == email => Some(*id),
            _ => None,
        }
    }

    pub(crate) async fn remember_user_id(&self, email: String, id: UserId) {
        *self.user_id.lock().await = Some((email, id));
    }
}
