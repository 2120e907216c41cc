use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use std::fmt;
use uuid::Uuid;

// Row identifiers are UUID v7, stored as their hyphenated string so that
// SQLite text ordering matches `Ord` on the Rust side.
macro_rules! identity_key {
    ($name:ident) => {
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            pub uuid: Uuid,
        }

        impl $name {
            pub fn generate() -> Self {
                Self {
                    uuid: Uuid::now_v7(),
                }
            }

            pub fn parse(value: &str) -> Result<Self, uuid::Error> {
                Uuid::parse_str(value.trim()).map(|uuid| Self { uuid })
            }
        }

        impl From<[u8; 16]> for $name {
            fn from(bytes: [u8; 16]) -> $name {
                Self {
                    uuid: Uuid::from_bytes(bytes),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.uuid.hyphenated())
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.uuid.hyphenated().to_string()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let uuid_str = value.as_str()?;
                Uuid::parse_str(uuid_str)
                    .map(|uuid| $name { uuid })
                    .map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

identity_key!(UserId);
identity_key!(PlantId);

/// Orders an unordered pair the way the `relationships` table stores it.
pub fn canonical_pair<'a>(a: &'a UserId, b: &'a UserId) -> (&'a UserId, &'a UserId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationshipStatus {
    Pending,
    Accepted,
}

impl RelationshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipStatus::Pending => "pending",
            RelationshipStatus::Accepted => "accepted",
        }
    }
}

impl fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromSql for RelationshipStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "pending" => Ok(RelationshipStatus::Pending),
            "accepted" => Ok(RelationshipStatus::Accepted),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

impl ToSql for RelationshipStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}
