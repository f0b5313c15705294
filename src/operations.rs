// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! Course operations. Each one issues its requests through [`api::Client`] in
//! order and folds the outcome into an [`OperationResult`]; nothing here
//! prints.

use log::{error, info, warn};
use reqwest::{Method, StatusCode};
use secrecy::SecretString;

use crate::{
    api::{self, endpoint, Gate},
    error::Failure,
    model::{
        Course, CourseId, EnrollmentRequest, LoginRequest, LoginResponse, NewCourse, Registration,
        User, UserId,
    },
    session,
    storage::Storage,
};

pub(crate) type OperationResult<T = ()> = Result<T, Failure>;

type Client<S> = api::Client<S>;

async fn send<S: Storage<session::Data>, B: serde::Serialize + Sync + ?Sized>(
    client: &Client<S>,
    endpoint: &str,
    method: Method,
    body: Option<&B>,
) -> OperationResult<api::Response> {
    client
        .send(endpoint, method, body)
        .await
        .map_err(|e| {
            error!("Request to {} failed: {}", endpoint, e);
            Failure::Connect(e)
        })
}

async fn refused<S: Storage<session::Data>>(
    client: &Client<S>,
    resp: &api::Response,
    gate: Gate,
) -> OperationResult<bool> {
    client.check_auth(resp, gate).await.map_err(Failure::Session)
}

pub(crate) async fn login<S: Storage<session::Data>>(
    client: &Client<S>,
    email: &str,
    password: &SecretString,
) -> OperationResult<session::Data> {
    let resp = client
        .send_anonymous(
            endpoint::LOGIN,
            Method::POST,
            Some(&LoginRequest { email, password }),
        )
        .await
        .map_err(|e| {
            error!("Login request failed: {}", e);
            Failure::Connect(e)
        })?;

    if !resp.status().is_success() {
        info!("Login for {} refused ({})", email, resp.status());
        return Err(Failure::InvalidCredentials);
    }

    let profile: LoginResponse = resp.json().map_err(Failure::Malformed)?;
    client
        .store()
        .set_session(
            profile.token.clone(),
            profile.email.clone(),
            profile.role.clone(),
        )
        .await
        .map_err(Failure::Session)?;
    info!("Signed in as {} ({})", profile.email, profile.role);
    Ok(session::Data::new(profile.token, profile.email, profile.role))
}

/// Creates an account. The new user still has to log in.
pub(crate) async fn register<S: Storage<session::Data>>(
    client: &Client<S>,
    registration: &Registration<'_>,
) -> OperationResult {
    let resp = client
        .send_anonymous(endpoint::REGISTER, Method::POST, Some(registration))
        .await
        .map_err(|e| {
            error!("Registration request failed: {}", e);
            Failure::Connect(e)
        })?;

    let status = resp.status();
    if status.is_success() {
        info!("Registered {}", registration.email);
        Ok(())
    } else if status == StatusCode::CONFLICT {
        Err(Failure::EmailTaken)
    } else {
        Err(Failure::Rejected("Registration failed"))
    }
}

/// Lists every course. `Ok(None)` means the credential was refused and the
/// user has been sent back to log in; it is not an empty catalogue.
pub(crate) async fn list_courses<S: Storage<session::Data>>(
    client: &Client<S>,
) -> OperationResult<Option<Vec<Course>>> {
    let resp = send::<_, ()>(client, endpoint::COURSES, Method::GET, None).await?;

    if resp.status().is_success() {
        return resp.json().map(Some).map_err(Failure::Malformed);
    }
    if refused(client, &resp, Gate::Authenticated).await? {
        return Ok(None);
    }
    Err(Failure::Rejected("Failed to load courses"))
}

pub(crate) async fn show_course<S: Storage<session::Data>>(
    client: &Client<S>,
    id: CourseId,
) -> OperationResult<Course> {
    let resp = send::<_, ()>(client, &endpoint::course(id), Method::GET, None).await?;

    let status = resp.status();
    if status.is_success() {
        resp.json().map_err(Failure::Malformed)
    } else if status == StatusCode::NOT_FOUND {
        Err(Failure::NotFound(format!("Course {id}")))
    } else if refused(client, &resp, Gate::Authenticated).await? {
        Err(Failure::AuthenticationFailed)
    } else {
        Err(Failure::Rejected("Failed to load course"))
    }
}

/// Finds the identifier of the signed-in user by scanning the user list for
/// the session email. The answer is remembered for as long as the session
/// email stays the same.
pub(crate) async fn resolve_user_id<S: Storage<session::Data>>(
    client: &Client<S>,
) -> Option<UserId> {
    let email = client.store().email().await?;
    if let Some(id) = client.store().cached_user_id(&email).await {
        return Some(id);
    }

    let resp = match client.get(endpoint::USERS).await {
        Ok(resp) => resp,
        Err(e) => {
            warn!("Could not fetch the user list: {}", e);
            return None;
        }
    };

    if !resp.status().is_success() {
        if let Err(e) = client.check_auth(&resp, Gate::Authenticated).await {
            warn!("Could not clear the refused session: {}", e);
        }
        return None;
    }

    let users: Vec<User> = match resp.json() {
        Ok(users) => users,
        Err(e) => {
            warn!("Could not read the user list: {}", e);
            return None;
        }
    };

    let id = users.into_iter().find(|user| user.email == email)?.id;
    client.store().remember_user_id(email, id).await;
    Some(id)
}

pub(crate) async fn enroll<S: Storage<session::Data>>(
    client: &Client<S>,
    course_id: CourseId,
) -> OperationResult {
    let Some(user_id) = resolve_user_id(client).await else {
        return Err(Failure::UserNotFound);
    };

    let resp = send(
        client,
        endpoint::ENROLL,
        Method::POST,
        Some(&EnrollmentRequest { user_id, course_id }),
    )
    .await?;

    let status = resp.status();
    if status.is_success() {
        info!("User {} enrolled in course {}", user_id, course_id);
        Ok(())
    } else if status == StatusCode::CONFLICT {
        Err(Failure::AlreadyEnrolled)
    } else if refused(client, &resp, Gate::Authenticated).await? {
        Err(Failure::AuthenticationFailed)
    } else {
        Err(Failure::Rejected("Failed to enroll"))
    }
}

/// Lists the courses the signed-in user is enrolled in. `Ok(None)` has the
/// same meaning as in [`list_courses`].
pub(crate) async fn list_enrollments<S: Storage<session::Data>>(
    client: &Client<S>,
) -> OperationResult<Option<Vec<Course>>> {
    let Some(user_id) = resolve_user_id(client).await else {
        return if client.store().is_authenticated().await {
            Err(Failure::UserNotFound)
        } else {
            Ok(None)
        };
    };

    let resp = send::<_, ()>(
        client,
        &endpoint::user_enrollments(user_id),
        Method::GET,
        None,
    )
    .await?;

    if resp.status().is_success() {
        return resp.json().map(Some).map_err(Failure::Malformed);
    }
    if refused(client, &resp, Gate::Authenticated).await? {
        return Ok(None);
    }
    Err(Failure::Rejected("Failed to load enrollments"))
}

/// Creates a course. Whether the user may do so is left to the server.
pub(crate) async fn add_course<S: Storage<session::Data>>(
    client: &Client<S>,
    course: &NewCourse,
) -> OperationResult<Course> {
    let resp = send(client, endpoint::ADD_COURSE, Method::POST, Some(course)).await?;

    let status = resp.status();
    if status.is_success() {
        resp.json().map_err(Failure::Malformed)
    } else if refused(client, &resp, Gate::Role).await? {
        Err(Failure::AuthenticationFailed)
    } else if status == StatusCode::FORBIDDEN {
        Err(Failure::PermissionDenied("add courses"))
    } else {
        Err(Failure::Rejected("Failed to add course"))
    }
}

/// Replaces the title, description and instructor of a course.
pub(crate) async fn update_course<S: Storage<session::Data>>(
    client: &Client<S>,
    id: CourseId,
    course: &NewCourse,
) -> OperationResult<Course> {
    let resp = send(client, &endpoint::course(id), Method::PUT, Some(course)).await?;

    let status = resp.status();
    if status.is_success() {
        resp.json().map_err(Failure::Malformed)
    } else if refused(client, &resp, Gate::Role).await? {
        Err(Failure::AuthenticationFailed)
    } else if status == StatusCode::FORBIDDEN {
        Err(Failure::PermissionDenied("update courses"))
    } else if status == StatusCode::NOT_FOUND {
        Err(Failure::NotFound(format!("Course {id}")))
    } else {
        Err(Failure::Rejected("Failed to update course"))
    }
}

pub(crate) async fn delete_course<S: Storage<session::Data>>(
    client: &Client<S>,
    id: CourseId,
) -> OperationResult {
    let resp = send::<_, ()>(client, &endpoint::course(id), Method::DELETE, None).await?;

    let status = resp.status();
    if status.is_success() {
        info!("Deleted course {}", id);
        Ok(())
    } else if refused(client, &resp, Gate::Role).await? {
        Err(Failure::AuthenticationFailed)
    } else if status == StatusCode::FORBIDDEN {
        Err(Failure::PermissionDenied("delete courses"))
    } else if status == StatusCode::NOT_FOUND {
        Err(Failure::NotFound(format!("Course {id}")))
    } else {
        Err(Failure::Rejected("Failed to delete course"))
    }
}
