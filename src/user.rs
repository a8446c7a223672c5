//! Users, follow connections and the status flags the backend attaches to them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::util;

/// A status value as the backend sends it.
///
/// The same flag shows up as `"0"` on one endpoint and `0` on another, so both
/// encodings of a digit are treated alike. Text must be the exact digits:
/// `"01"`, `"+1"` or `" 1 "` carry no code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Status {
    Number(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Integer(i64),
            Float(f64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Integer(n) => Status::Number(n),
            Raw::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Status::Number(f as i64),
            Raw::Float(f) => Status::Text(f.to_string()),
            Raw::Text(s) => Status::Text(s),
        })
    }
}

impl Status {
    pub fn code(&self) -> Option<i64> {
        match self {
            Status::Number(n) => Some(*n),
            Status::Text(s) => s.parse().ok().filter(|n: &i64| n.to_string() == *s),
        }
    }

    /// `"0"` / `0`: removed or deactivated.
    pub fn is_inactive(&self) -> bool {
        self.code() == Some(0)
    }

    /// `"1"` / `1`: published and visible.
    pub fn is_visible(&self) -> bool {
        self.code() == Some(1)
    }
}

impl From<&str> for Status {
    fn from(value: &str) -> Self {
        Status::Text(value.to_string())
    }
}

impl From<i64> for Status {
    fn from(value: i64) -> Self {
        Status::Number(value)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Number(n) => write!(f, "{n}"),
            Status::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A user record from the directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, deserialize_with = "util::string_or_number")]
    id: String,
    #[serde(default, deserialize_with = "util::null_as_default")]
    username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<Status>,
}

impl User {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            ..Default::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn profile_picture(&self) -> Option<&str> {
        self.profile_picture.as_deref()
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Users without a status flag count as active.
    pub fn is_active(&self) -> bool {
        !self.status.as_ref().is_some_and(Status::is_inactive)
    }

    pub fn set_profile_picture(&mut self, profile_picture: Option<String>) {
        self.profile_picture = profile_picture;
    }

    pub fn set_status(&mut self, status: Option<Status>) {
        self.status = status;
    }

    pub fn set_username(&mut self, username: String) {
        self.username = username;
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.username, self.id)?;
        if let Some(status) = &self.status {
            write!(f, " [status {status}]")?;
        }
        Ok(())
    }
}

/// A followed user as listed by `GET /followers/{id}/followed`.
///
/// The wire shape is the followed user's summary record; its status is the
/// status of the follow relationship.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Connection {
    user: User,
}

impl Connection {
    pub fn id(&self) -> &str {
        self.user.id()
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn status(&self) -> Option<&Status> {
        self.user.status()
    }

    pub fn is_active(&self) -> bool {
        self.user.is_active()
    }

    pub fn into_user(self) -> User {
        self.user
    }
}

impl From<User> for Connection {
    fn from(user: User) -> Self {
        Connection { user }
    }
}
