// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::time::{Duration, Instant};

use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::{metadata, model::Course, session::Role};

#[derive(Tabled)]
struct EnrollableCourse {
    #[tabled(inline)]
    course: Course,
    #[tabled(rename = "Enroll")]
    command: String,
}

fn table<T: Tabled>(rows: impl IntoIterator<Item = T>) -> String {
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::left()))
        .to_string()
}

/// The course catalogue. Students also get the command that enrolls them in
/// each course.
pub(crate) fn courses(courses: &[Course], role: Option<&Role>) -> String {
    if courses.is_empty() {
        return "No courses available".to_owned();
    }

    match role {
        Some(Role::Student) => table(courses.iter().map(|course| EnrollableCourse {
            course: course.clone(),
            command: format!("{} enroll {}", *metadata::CLIENT_TYPE_ID, course.id),
        })),
        _ => table(courses),
    }
}

pub(crate) fn enrollments(courses: &[Course]) -> String {
    if courses.is_empty() {
        return "You are not enrolled in any courses yet".to_owned();
    }
    table(courses)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum NoticeKind {
    Success,
    Error,
}

impl NoticeKind {
    pub(crate) const fn lifetime(self) -> Duration {
        match self {
            Self::Success => Duration::from_secs(3),
            Self::Error => Duration::from_secs(5),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Notice {
    kind: NoticeKind,
    message: String,
    shown_at: Instant,
}

impl Notice {
    pub(crate) const fn kind(&self) -> NoticeKind {
        self.kind
    }

    pub(crate) fn message(&self) -> &str {
        &self.message
    }

    fn expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.kind.lifetime()
    }
}

/// Feedback messages. At most one is visible: showing a success hides any
/// error and vice versa, and each disappears once its lifetime has passed.
#[derive(Debug, Default)]
pub(crate) struct Notices {
    current: Option<Notice>,
}

impl Notices {
    pub(crate) fn show_success<M: Into<String>>(&mut self, message: M, now: Instant) {
        self.show(NoticeKind::Success, message.into(), now);
    }

    pub(crate) fn show_error<M: Into<String>>(&mut self, message: M, now: Instant) {
        self.show(NoticeKind::Error, message.into(), now);
    }

    fn show(&mut self, kind: NoticeKind, message: String, now: Instant) {
        self.current = Some(Notice {
            kind,
            message,
            shown_at: now,
        });
    }

    pub(crate) fn visible(&self, now: Instant) -> Option<&Notice> {
        self.current.as_ref().filter(|notice| !notice.expired(now))
    }

    /// Takes the visible notice, leaving nothing behind.
    pub(crate) fn take(&mut self, now: Instant) -> Option<Notice> {
        let notice = self.visible(now).cloned();
        self.current = None;
        notice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: u64, title: &str) -> Course {
        Course {
            id,
            title: title.to_owned(),
            description: format!("All about {title}"),
            instructor_name: "Grace Hopper".to_owned(),
            photo_url: None,
        }
    }

    #[test]
    fn empty_lists_have_their_own_messages() {
        assert_eq!(courses(&[], Some(&Role::Student)), "No courses available");
        assert_eq!(enrollments(&[]), "You are not enrolled in any courses yet");
    }

    #[test]
    fn students_see_enroll_commands() {
        let list = [course(5, "Compilers")];
        let rendered = courses(&list, Some(&Role::Student));

        assert!(rendered.contains("Compilers"));
        assert!(rendered.contains("Grace Hopper"));
        assert!(rendered.contains("Enroll"));
        assert!(rendered.contains("enroll 5"));
    }

    #[test]
    fn admins_see_plain_catalogue() {
        let list = [course(5, "Compilers")];
        let rendered = courses(&list, Some(&Role::Admin));

        assert!(rendered.contains("Compilers"));
        assert!(!rendered.contains("enroll 5"));
    }

    #[test]
    fn success_expires_after_three_seconds() {
        let start = Instant::now();
        let mut notices = Notices::default();
        notices.show_success("Course added successfully!", start);

        let shown = notices.visible(start + Duration::from_millis(2999));
        assert_eq!(shown.map(Notice::kind), Some(NoticeKind::Success));
        assert!(notices.visible(start + Duration::from_secs(3)).is_none());
    }

    #[test]
    fn error_expires_after_five_seconds() {
        let start = Instant::now();
        let mut notices = Notices::default();
        notices.show_error("Failed to enroll", start);

        assert!(notices.visible(start + Duration::from_secs(4)).is_some());
        assert!(notices.visible(start + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn notices_are_mutually_exclusive() {
        let start = Instant::now();
        let mut notices = Notices::default();
        notices.show_error("Failed to enroll", start);
        notices.show_success("Successfully enrolled in course!", start + Duration::from_secs(1));

        let shown = notices.visible(start + Duration::from_secs(2));
        assert_eq!(shown.map(Notice::message), Some("Successfully enrolled in course!"));
        assert_eq!(shown.map(Notice::kind), Some(NoticeKind::Success));

        notices.show_error("Permission denied", start + Duration::from_secs(2));
        assert_eq!(
            notices.visible(start + Duration::from_secs(3)).map(Notice::kind),
            Some(NoticeKind::Error)
        );
    }

    #[test]
    fn new_notice_restarts_the_clock() {
        let start = Instant::now();
        let mut notices = Notices::default();
        notices.show_success("first", start);
        notices.show_success("second", start + Duration::from_secs(2));

        let shown = notices.visible(start + Duration::from_secs(4));
        assert_eq!(shown.map(Notice::message), Some("second"));
    }

    #[test]
    fn take_empties_the_slot() {
        let start = Instant::now();
        let mut notices = Notices::default();
        notices.show_error("Failed to load courses", start);

        assert!(notices.take(start).is_some());
        assert!(notices.visible(start).is_none());
    }
}
