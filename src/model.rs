// SPDX-FileCopyrightText: 2022 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use tabled::Tabled;

use crate::session::{Role, Token};

pub(crate) type CourseId = u64;
pub(crate) type UserId = u64;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Course {
    #[tabled(rename = "ID")]
    pub(crate) id: CourseId,
    #[tabled(rename = "Title")]
    pub(crate) title: String,
    #[tabled(rename = "Description")]
    #[serde(default)]
    pub(crate) description: String,
    #[tabled(rename = "Instructor")]
    #[serde(default)]
    pub(crate) instructor_name: String,
    #[tabled(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) photo_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewCourse {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) instructor_name: String,
}

/// The parts of a user record the client relies on.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct User {
    pub(crate) id: UserId,
    pub(crate) email: String,
}

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnrollmentRequest {
    pub(crate) user_id: UserId,
    pub(crate) course_id: CourseId,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub(crate) email: &'a str,
    #[serde(serialize_with = "expose")]
    pub(crate) password: &'a SecretString,
}

fn expose<S: Serializer>(secret: &&SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[derive(Debug, Serialize)]
pub(crate) struct Registration<'a> {
    pub(crate) name: &'a str,
    pub(crate) email: &'a str,
    #[serde(serialize_with = "expose")]
    pub(crate) password: &'a SecretString,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub(crate) token: Token,
    pub(crate) email: String,
    pub(crate) role: Role,
}

/// Response bodies arrive either bare or wrapped in the server's
/// `{status, message, data}` envelope.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum Payload<T> {
    Bare(T),
    Enveloped { data: T },
}

impl<T> Payload<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Self::Bare(data) | Self::Enveloped { data } => data,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use serde_test::{assert_ser_tokens, Token};

    use super::*;

    fn decode<T: for<'de> Deserialize<'de>>(value: serde_json::Value) -> serde_json::Result<T> {
        serde_json::from_value::<Payload<T>>(value).map(Payload::into_inner)
    }

    #[test]
    fn courses_decode_bare_or_enveloped() -> serde_json::Result<()> {
        let course = json!({
            "id": 5,
            "title": "Compilers",
            "description": "Parsing and code generation",
            "instructorName": "Grace Hopper"
        });

        let bare: Vec<Course> = decode(json!([course.clone()]))?;
        let wrapped: Vec<Course> = decode(json!({
            "status": "success",
            "message": "Courses retrieved successfully",
            "data": [course],
            "timestamp": "2024-01-01T00:00:00"
        }))?;

        assert_eq!(bare, wrapped);
        assert_eq!(bare[0].id, 5);
        assert_eq!(bare[0].instructor_name, "Grace Hopper");
        assert_eq!(bare[0].photo_url, None);
        Ok(())
    }

    #[test]
    fn login_response_reads_envelope_data() -> serde_json::Result<()> {
        let resp: LoginResponse = decode(json!({
            "status": "success",
            "message": "Login successful",
            "data": {"token": "abc", "email": "ada@example.com", "role": "STUDENT"}
        }))?;

        assert_eq!(resp.token.expose(), "abc");
        assert_eq!(resp.email, "ada@example.com");
        assert_eq!(resp.role, Role::Student);
        Ok(())
    }

    #[test]
    fn enrollment_request_wire_shape() {
        assert_ser_tokens(
            &EnrollmentRequest {
                user_id: 3,
                course_id: 5,
            },
            &[
                Token::Struct {
                    name: "EnrollmentRequest",
                    len: 2,
                },
                Token::Str("userId"),
                Token::U64(3),
                Token::Str("courseId"),
                Token::U64(5),
                Token::StructEnd,
            ],
        );
    }

    #[test]
    fn login_request_sends_password() -> serde_json::Result<()> {
        let password = SecretString::new("hunter2".to_owned());
        let req = LoginRequest {
            email: "ada@example.com",
            password: &password,
        };

        assert_eq!(
            serde_json::to_value(&req)?,
            json!({"email": "ada@example.com", "password": "hunter2"})
        );
        Ok(())
    }
}
