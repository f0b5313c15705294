// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use log::{info, warn};

use super::Context;
use crate::{
    error::{Error, Result},
    model::{CourseId, NewCourse},
    operations, render, session,
    storage::Storage,
};

/// Prints the catalogue. A refused session fails the command without a
/// notice, since the user has already been told to sign in again.
async fn print_catalogue<S: Storage<session::Data>>(ctx: &mut Context<S>) -> Result<()> {
    let result = operations::list_courses(ctx.client()).await;
    let Some(courses) = ctx.report(result)? else {
        return Err(Error::Command);
    };

    let role = ctx.client().store().role().await;
    println!("{}", render::courses(&courses, role.as_ref()));
    Ok(())
}

/// Prints the catalogue after a change the server has already accepted. A
/// failed reload is logged and leaves the success notice in place.
async fn reload_catalogue<S: Storage<session::Data>>(ctx: &Context<S>) {
    match operations::list_courses(ctx.client()).await {
        Ok(Some(courses)) => {
            let role = ctx.client().store().role().await;
            println!("{}", render::courses(&courses, role.as_ref()));
        }
        Ok(None) => warn!("Could not reload the course list: the session was refused"),
        Err(e) => warn!("Could not reload the course list: {}", e),
    }
}

/// List every course.
#[derive(Debug, Parser)]
pub(crate) struct Courses {}

#[async_trait]
impl super::Command for Courses {
    async fn execute<S: Storage<session::Data>>(self, ctx: &mut Context<S>) -> Result<()> {
        ctx.require_auth().await?;
        print_catalogue(ctx).await
    }
}

/// Show one course.
#[derive(Debug, Parser)]
pub(crate) struct Show {
    /// The course to show.
    #[clap()]
    id: CourseId,
}

#[async_trait]
impl super::Command for Show {
    async fn execute<S: Storage<session::Data>>(self, ctx: &mut Context<S>) -> Result<()> {
        ctx.require_auth().await?;
        let result = operations::show_course(ctx.client(), self.id).await;
        let course = ctx.report(result)?;

        let role = ctx.client().store().role().await;
        println!("{}", render::courses(&[course], role.as_ref()));
        Ok(())
    }
}

/// Add a course to the catalogue.
#[derive(Debug, Parser)]
pub(crate) struct Add {
    #[arg(long)]
    title: String,

    #[arg(long, default_value = "")]
    description: String,

    /// The name of the person teaching the course.
    #[arg(long)]
    instructor: String,
}

#[async_trait]
impl super::Command for Add {
    async fn execute<S: Storage<session::Data>>(self, ctx: &mut Context<S>) -> Result<()> {
        ctx.require_auth().await?;
        let course = NewCourse {
            title: self.title,
            description: self.description,
            instructor_name: self.instructor,
        };

        let result = operations::add_course(ctx.client(), &course).await;
        let added = ctx.report(result)?;
        ctx.success("Course added successfully!");
        info!("Added course {} ({})", added.id, added.title);

        reload_catalogue(ctx).await;
        Ok(())
    }
}

/// Change the title, description and instructor of a course.
#[derive(Debug, Parser)]
pub(crate) struct Update {
    /// The course to change.
    #[clap()]
    id: CourseId,

    #[arg(long)]
    title: String,

    #[arg(long, default_value = "")]
    description: String,

    /// The name of the person teaching the course.
    #[arg(long)]
    instructor: String,
}

#[async_trait]
impl super::Command for Update {
    async fn execute<S: Storage<session::Data>>(self, ctx: &mut Context<S>) -> Result<()> {
        ctx.require_auth().await?;
        let changes = NewCourse {
            title: self.title,
            description: self.description,
            instructor_name: self.instructor,
        };

        let result = operations::update_course(ctx.client(), self.id, &changes).await;
        let updated = ctx.report(result)?;
        ctx.success("Course updated successfully!");
        info!("Updated course {} ({})", updated.id, updated.title);

        reload_catalogue(ctx).await;
        Ok(())
    }
}

/// Remove a course from the catalogue.
#[derive(Debug, Parser)]
pub(crate) struct Delete {
    /// The course to remove.
    #[clap()]
    id: CourseId,
}

#[async_trait]
impl super::Command for Delete {
    async fn execute<S: Storage<session::Data>>(self, ctx: &mut Context<S>) -> Result<()> {
        ctx.require_auth().await?;
        let result = operations::delete_course(ctx.client(), self.id).await;
        ctx.report(result)?;
        ctx.success(format!("Course {} deleted", self.id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use serde_json::json;

    use super::*;
    use crate::{
        command::Command as _,
        render::NoticeKind,
        session::Role,
        test_support::{self, course_json, FixedPassword},
    };

    type Result<T = (), E = Box<dyn std::error::Error>> = std::result::Result<T, E>;

    fn compilers() -> Add {
        Add {
            title: "Compilers".to_owned(),
            description: "Parsing".to_owned(),
            instructor: "Grace Hopper".to_owned(),
        }
    }

    #[tokio::test]
    async fn forbidden_add_shows_permission_notice_without_reload() -> Result {
        let mut server = mockito::Server::new_async().await;
        let _add = server
            .mock("POST", "/courses/add")
            .with_status(403)
            .create_async()
            .await;
        let reload = server
            .mock("GET", "/courses/all")
            .expect(0)
            .create_async()
            .await;

        let (client, redirects) =
            test_support::signed_in(&server.url(), "abc", Role::Student).await?;
        let mut ctx = Context::new(client, Box::new(FixedPassword(None)));

        assert!(matches!(compilers().execute(&mut ctx).await, Err(Error::Command)));

        let notice = ctx.notices().visible(Instant::now());
        assert_eq!(notice.map(|n| n.kind()), Some(NoticeKind::Error));
        assert_eq!(
            notice.map(|n| n.message()),
            Some("You do not have permission to add courses")
        );
        assert!(ctx.client().store().is_authenticated().await);
        assert_eq!(redirects.count(), 0);
        reload.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn successful_add_reloads_catalogue() -> Result {
        let mut server = mockito::Server::new_async().await;
        let _add = server
            .mock("POST", "/courses/add")
            .with_status(201)
            .with_body(
                json!({"status": "success", "data": course_json(9, "Compilers")}).to_string(),
            )
            .create_async()
            .await;
        let reload = server
            .mock("GET", "/courses/all")
            .with_status(200)
            .with_body(json!([course_json(9, "Compilers")]).to_string())
            .expect(1)
            .create_async()
            .await;

        let (client, _) = test_support::signed_in(&server.url(), "abc", Role::Admin).await?;
        let mut ctx = Context::new(client, Box::new(FixedPassword(None)));
        compilers().execute(&mut ctx).await?;

        let notice = ctx.notices().visible(Instant::now());
        assert_eq!(notice.map(|n| n.kind()), Some(NoticeKind::Success));
        reload.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_reload_keeps_successful_add() -> Result {
        let mut server = mockito::Server::new_async().await;
        let add = server
            .mock("POST", "/courses/add")
            .with_status(201)
            .with_body(course_json(9, "Compilers").to_string())
            .expect(1)
            .create_async()
            .await;
        let _reload = server
            .mock("GET", "/courses/all")
            .with_status(500)
            .create_async()
            .await;

        let (client, _) = test_support::signed_in(&server.url(), "abc", Role::Admin).await?;
        let mut ctx = Context::new(client, Box::new(FixedPassword(None)));
        compilers().execute(&mut ctx).await?;

        let notice = ctx.notices().visible(Instant::now());
        assert_eq!(notice.map(|n| n.kind()), Some(NoticeKind::Success));
        assert_eq!(notice.map(|n| n.message()), Some("Course added successfully!"));
        add.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn forbidden_update_keeps_session() -> Result {
        let mut server = mockito::Server::new_async().await;
        let _update = server
            .mock("PUT", "/courses/4")
            .with_status(403)
            .create_async()
            .await;
        let reload = server
            .mock("GET", "/courses/all")
            .expect(0)
            .create_async()
            .await;

        let (client, _) = test_support::signed_in(&server.url(), "abc", Role::Student).await?;
        let mut ctx = Context::new(client, Box::new(FixedPassword(None)));
        let result = Update {
            id: 4,
            title: "Compilers".to_owned(),
            description: String::new(),
            instructor: "Grace Hopper".to_owned(),
        }
        .execute(&mut ctx)
        .await;

        assert!(matches!(result, Err(Error::Command)));
        let notice = ctx.notices().visible(Instant::now());
        assert_eq!(
            notice.map(|n| n.message()),
            Some("You do not have permission to update courses")
        );
        assert!(ctx.client().store().is_authenticated().await);
        reload.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn courses_without_session_makes_no_request() -> Result {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/courses/all")
            .expect(0)
            .create_async()
            .await;

        let (client, redirects) = test_support::client(&server.url())?;
        let mut ctx = Context::new(client, Box::new(FixedPassword(None)));

        assert!(matches!(Courses {}.execute(&mut ctx).await, Err(Error::Command)));
        assert_eq!(redirects.count(), 1);
        mock.assert_async().await;
        Ok(())
    }
}
