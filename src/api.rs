// SPDX-FileCopyrightText: 2022 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use log::{debug, info};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    error::Result,
    metadata,
    model::{CourseId, Payload, UserId},
    session::{self, Token},
    storage::Storage,
};

pub(crate) mod endpoint {
    use super::{CourseId, UserId};

    pub(crate) const LOGIN: &str = "auth/login";
    pub(crate) const REGISTER: &str = "users/register";
    pub(crate) const COURSES: &str = "courses/all";
    pub(crate) const ADD_COURSE: &str = "courses/add";
    pub(crate) const USERS: &str = "users/all";
    pub(crate) const ENROLL: &str = "enrollments/enroll";

    pub(crate) fn course(id: CourseId) -> String {
        format!("courses/{id}")
    }

    pub(crate) fn user_enrollments(id: UserId) -> String {
        format!("enrollments/user/{id}")
    }
}

/// Where the user is sent when their session can no longer be used.
pub(crate) trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

/// How a request is protected on the server, which decides what a rejection
/// status means.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Gate {
    /// Any signed-in user may call it; 401 and 403 both mean the token was
    /// refused.
    Authenticated,
    /// Only some roles may call it; 401 means the token was refused and 403
    /// means the role is insufficient.
    Role,
}

impl Gate {
    pub(crate) fn rejects_token(self, status: StatusCode) -> bool {
        match self {
            Self::Authenticated => {
                status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
            }
            Self::Role => status == StatusCode::UNAUTHORIZED,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Response {
    status: StatusCode,
    body: Vec<u8>,
    credential: Option<Token>,
}

impl Response {
    pub(crate) const fn status(&self) -> StatusCode {
        self.status
    }

    pub(crate) fn body(&self) -> &[u8] {
        &self.body
    }

    /// The token that was attached when the request was sent.
    pub(crate) const fn credential(&self) -> Option<&Token> {
        self.credential.as_ref()
    }

    pub(crate) fn json<T: for<'de> Deserialize<'de>>(&self) -> Result<T> {
        Ok(serde_json::from_slice::<Payload<T>>(self.body())?.into_inner())
    }
}

pub(crate) struct Client<S> {
    http: reqwest::Client,
    base_url: Url,
    store: session::Store<S>,
    navigator: Arc<dyn Navigator>,
}

impl<S: Storage<session::Data>> Client<S> {
    pub(crate) fn new(
        base_url: Url,
        store: session::Store<S>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(metadata::USER_AGENT.as_str())
            .build()?;

        Ok(Self {
            http,
            base_url: with_trailing_slash(base_url),
            store,
            navigator,
        })
    }

    pub(crate) const fn store(&self) -> &session::Store<S> {
        &self.store
    }

    pub(crate) fn url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    /// Sends a request with the stored token, if there is one, as a bearer
    /// credential. Non-success statuses are returned, not raised.
    pub(crate) async fn send<B: Serialize + Sync + ?Sized>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&B>,
    ) -> Result<Response> {
        let credential = self.store.token().await;
        self.dispatch(endpoint, method, body, credential).await
    }

    pub(crate) async fn send_anonymous<B: Serialize + Sync + ?Sized>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&B>,
    ) -> Result<Response> {
        self.dispatch(endpoint, method, body, None).await
    }

    pub(crate) async fn get(&self, endpoint: &str) -> Result<Response> {
        self.send::<()>(endpoint, Method::GET, None).await
    }

    async fn dispatch<B: Serialize + Sync + ?Sized>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&B>,
        credential: Option<Token>,
    ) -> Result<Response> {
        let url = self.url(endpoint)?;
        debug!(
            "{} {} ({})",
            method,
            url,
            if credential.is_some() {
                "with credential"
            } else {
                "anonymous"
            }
        );

        let mut req = self.http.request(method, url);
        if let Some(body) = body {
            req = req.json(body);
        }
        if let Some(token) = &credential {
            req = req.bearer_auth(token.expose());
        }

        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?.to_vec();
        debug!("Server answered {}", status);

        Ok(Response {
            status,
            body,
            credential,
        })
    }

    /// Classifies a status on an ordinary signed-in request. On 401 or 403
    /// the session is cleared and the user is sent back to log in.
    pub(crate) async fn handle_auth_error(&self, status: StatusCode) -> Result<bool> {
        if !Gate::Authenticated.rejects_token(status) {
            return Ok(false);
        }

        info!("Server refused the stored credential ({})", status);
        self.store.clear_session().await?;
        self.navigator.redirect_to_login();
        Ok(true)
    }

    /// Classifies the response to a request under `gate`. A refused
    /// credential that is still the stored one goes through
    /// [`Self::handle_auth_error`]; if the session changed while the request
    /// was in flight, the newer session is left alone.
    pub(crate) async fn check_auth(&self, resp: &Response, gate: Gate) -> Result<bool> {
        if !gate.rejects_token(resp.status()) {
            return Ok(false);
        }

        let current = self.store.token().await;
        if current.as_ref() != resp.credential() {
            info!(
                "Server refused a credential that is no longer in use ({})",
                resp.status()
            );
            if current.is_none() {
                self.navigator.redirect_to_login();
            }
            return Ok(true);
        }

        self.handle_auth_error(resp.status()).await
    }

    /// Returns whether a session exists, sending the user to log in if not.
    pub(crate) async fn require_auth(&self) -> bool {
        let authenticated = self.store.is_authenticated().await;
        if !authenticated {
            self.navigator.redirect_to_login();
        }
        authenticated
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
