use std::{ops::Deref, str::FromStr};

use base64::{display::Base64Display, engine::GeneralPurpose, Engine};
use diesel::{
    deserialize::FromSql,
    serialize::{IsNull, Output, ToSql},
    sql_types::Text,
    sqlite::Sqlite,
};
use thiserror::Error;
use uuid::Uuid;

use crate::new_uuid;

#[derive(Debug, Error)]
pub enum ObjectIdError {
    #[error("Invalid ID prefix, expected {0}")]
    InvalidPrefix(&'static str),

    #[error("Failed to decode object ID")]
    DecodeFailure,
}

/// A UUID-backed id that renders as a short prefixed string, so ids for
/// different entities can't be mixed up. Stored in SQLite as the plain
/// UUID text.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub struct ObjectId<const PREFIX: usize>(pub Uuid);

pub type TeamId = ObjectId<0>;
pub type JoinId = ObjectId<1>;
pub type AdminId = ObjectId<2>;

impl<const PREFIX: usize> ObjectId<PREFIX> {
    /// Once const generics supports strings, this can go away, but for now we
    /// do it this way.
    #[inline(always)]
    fn prefix() -> &'static str {
        match PREFIX {
            0 => "tem",
            1 => "joi",
            2 => "adm",
            _ => "",
        }
    }

    pub fn new() -> Self {
        Self(new_uuid())
    }

    pub fn from_uuid(u: Uuid) -> Self {
        Self(u)
    }

    pub fn into_inner(self) -> Uuid {
        self.0
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    pub fn display_without_prefix(&self) -> Base64Display<GeneralPurpose> {
        base64::display::Base64Display::new(
            self.0.as_bytes(),
            &base64::engine::general_purpose::URL_SAFE_NO_PAD,
        )
    }
}

impl<const PREFIX: usize> Default for ObjectId<PREFIX> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const PREFIX: usize> Deref for ObjectId<PREFIX> {
    type Target = Uuid;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const PREFIX: usize> From<Uuid> for ObjectId<PREFIX> {
    fn from(u: Uuid) -> Self {
        Self(u)
    }
}

impl<const PREFIX: usize> From<ObjectId<PREFIX>> for Uuid {
    fn from(data: ObjectId<PREFIX>) -> Self {
        data.0
    }
}

impl<const PREFIX: usize> std::fmt::Debug for ObjectId<PREFIX> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ObjectId")
            .field(&self.to_string())
            .field(&self.0)
            .finish()
    }
}

impl<const PREFIX: usize> std::fmt::Display for ObjectId<PREFIX> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(Self::prefix())?;
        self.display_without_prefix().fmt(f)
    }
}

pub fn decode_suffix(s: &str) -> Result<Uuid, ObjectIdError> {
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|_| ObjectIdError::DecodeFailure)?;
    Uuid::from_slice(&bytes).map_err(|_| ObjectIdError::DecodeFailure)
}

impl<const PREFIX: usize> FromStr for ObjectId<PREFIX> {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expected_prefix = Self::prefix();
        if !s.starts_with(expected_prefix) {
            return Err(ObjectIdError::InvalidPrefix(expected_prefix));
        }

        decode_suffix(&s[expected_prefix.len()..]).map(Self)
    }
}

/// Serialize into string form with the prefix
impl<const PREFIX: usize> serde::Serialize for ObjectId<PREFIX> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let s = self.to_string();
        serializer.serialize_str(&s)
    }
}

struct ObjectIdVisitor<const PREFIX: usize>;

impl<'de, const PREFIX: usize> serde::de::Visitor<'de> for ObjectIdVisitor<PREFIX> {
    type Value = ObjectId<PREFIX>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("an object ID starting with ")?;
        formatter.write_str(Self::Value::prefix())
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Self::Value::from_str(v)
            .map_err(|_| E::invalid_value(serde::de::Unexpected::Str(v), &self))
    }
}

/// Deserialize from string form with the prefix.
impl<'de, const PREFIX: usize> serde::Deserialize<'de> for ObjectId<PREFIX> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(ObjectIdVisitor)
    }
}

impl<const PREFIX: usize> FromSql<Text, Sqlite> for ObjectId<PREFIX> {
    fn from_sql(value: diesel::backend::RawValue<'_, Sqlite>) -> diesel::deserialize::Result<Self> {
        let s = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        Uuid::parse_str(&s).map(Self).map_err(Into::into)
    }
}

impl<const PREFIX: usize> ToSql<Text, Sqlite> for ObjectId<PREFIX> {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> diesel::serialize::Result {
        out.set_value(self.0.to_string());
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_from_str() {
        let id = TeamId::new();

        let s = id.to_string();
        let id2 = TeamId::from_str(&s).unwrap();
        assert_eq!(id, id2, "ID converts to string and back");
    }

    #[test]
    fn serde() {
        let id = TeamId::new();
        let json_str = serde_json::to_string(&id).unwrap();
        let id2: TeamId = serde_json::from_str(&json_str).unwrap();
        assert_eq!(id, id2, "Value serializes and deserializes to itself");
    }

    #[test]
    fn rejects_wrong_prefix() {
        let id = TeamId::new().to_string();
        JoinId::from_str(&id).expect_err("team ID must not parse as a join ID");
    }

    #[test]
    fn rejects_garbage_suffix() {
        TeamId::from_str("tem!!!not-base64!!!").expect_err("junk suffix must not parse");
    }
}
