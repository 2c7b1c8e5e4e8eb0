use crate::model::user::User;
use crate::string::SmallString;
use crate::time::DateTime;
use serde::Serialize;
use serde_with::skip_serializing_none;
use std::str::FromStr;
use strum::{EnumString, EnumTable};
use utoipa::ToSchema;

#[derive(Clone, Copy, EnumString, EnumTable)]
#[strum(serialize_all = "camelCase")]
pub enum Field {
    Id,
    Name,
    Email,
    CreationTime,
}

impl Field {
    pub fn create_table(fields_str: Option<&str>) -> Result<FieldTable<bool>, <Self as FromStr>::Err> {
        let Some(fields_str) = fields_str else {
            return Ok(FieldTable::filled(true));
        };
        let mut table = FieldTable::filled(false);
        for field in fields_str.split(',') {
            table[Self::from_str(field)?] = true;
        }
        Ok(table)
    }
}

/// Whether private account details may be included. Only the account owner
/// sees their own email.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Full,
    PublicOnly,
}

/// The owner attribution embedded in post and comment resources.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MicroUser {
    #[schema(value_type = String)]
    pub name: SmallString,
}

impl MicroUser {
    pub fn new(name: SmallString) -> Self {
        Self { name }
    }
}

#[skip_serializing_none]
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: Option<i64>,
    #[schema(value_type = Option<String>)]
    pub name: Option<SmallString>,
    #[schema(value_type = Option<String>)]
    pub email: Option<SmallString>,
    #[schema(value_type = Option<String>)]
    pub creation_time: Option<DateTime>,
}

impl UserInfo {
    pub fn new(user: User, fields: &FieldTable<bool>, visibility: Visibility) -> Self {
        Self {
            id: fields[Field::Id].then_some(user.user_id),
            name: fields[Field::Name].then_some(user.username),
            email: (fields[Field::Email] && visibility == Visibility::Full).then_some(user.email),
            creation_time: fields[Field::CreationTime].then_some(user.created_at),
        }
    }
}
