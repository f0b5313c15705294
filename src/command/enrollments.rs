// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use log::warn;

use super::Context;
use crate::{
    error::{Error, Result},
    model::CourseId,
    operations, render, session,
    storage::Storage,
};

async fn print_enrollments<S: Storage<session::Data>>(ctx: &mut Context<S>) -> Result<()> {
    let result = operations::list_enrollments(ctx.client()).await;
    let Some(courses) = ctx.report(result)? else {
        return Err(Error::Command);
    };

    println!("{}", render::enrollments(&courses));
    Ok(())
}

/// Prints enrollments after an enrollment the server has already accepted. A
/// failed reload is logged and leaves the success notice in place.
async fn reload_enrollments<S: Storage<session::Data>>(ctx: &Context<S>) {
    match operations::list_enrollments(ctx.client()).await {
        Ok(Some(courses)) => println!("{}", render::enrollments(&courses)),
        Ok(None) => warn!("Could not reload your enrollments: the session was refused"),
        Err(e) => warn!("Could not reload your enrollments: {}", e),
    }
}

/// Enroll the signed-in user in a course.
#[derive(Debug, Parser)]
pub(crate) struct Enroll {
    /// The course to enroll in.
    #[clap()]
    course_id: CourseId,
}

#[async_trait]
impl super::Command for Enroll {
    async fn execute<S: Storage<session::Data>>(self, ctx: &mut Context<S>) -> Result<()> {
        ctx.require_auth().await?;
        let result = operations::enroll(ctx.client(), self.course_id).await;
        ctx.report(result)?;
        ctx.success("Successfully enrolled in course!");

        reload_enrollments(ctx).await;
        Ok(())
    }
}

/// List the courses the signed-in user is enrolled in.
#[derive(Debug, Parser)]
pub(crate) struct Enrollments {}

#[async_trait]
impl super::Command for Enrollments {
    async fn execute<S: Storage<session::Data>>(self, ctx: &mut Context<S>) -> Result<()> {
        ctx.require_auth().await?;
        print_enrollments(ctx).await
    }
}
