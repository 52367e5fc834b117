use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(ResourceId);
id_newtype!(StudentId);

/// A generic named record with server-managed timestamps.
///
/// Timestamps are kept as the raw RFC 3339 strings the backend sends; they are
/// only interpreted when rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDraft {
    pub name: String,
}

impl ResourceDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Student record. The student backend serialises field names capitalised
/// (`Id`, `Name`, ...); both casings are accepted here so nothing past the
/// client has to care.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    #[serde(alias = "Id")]
    pub id: StudentId,
    #[serde(alias = "Name", default)]
    pub name: String,
    #[serde(alias = "Age", default)]
    pub age: i64,
    #[serde(alias = "Score", default)]
    pub score: i64,
}

/// Body of a student create/replace request.
///
/// `None` numbers stand for unparseable form input and go over the wire as
/// `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDraft {
    pub name: String,
    pub age: Option<i64>,
    pub score: Option<i64>,
}

impl From<&Student> for StudentDraft {
    fn from(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            age: Some(student.age),
            score: Some(student.score),
        }
    }
}
