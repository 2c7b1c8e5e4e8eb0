use diesel::deserialize::{self, FromSql};
use diesel::pg::Pg;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::SmallInt;
use diesel::{AsExpression, FromSqlRow};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, FromRepr, IntoStaticStr};
use thiserror::Error;
use utoipa::ToSchema;

/// Region discriminants double as the public numeric region codes used in
/// region-listing routes, so the values here must not be changed. New enum
/// variants should always be appended at the end.

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{extension} is not a supported file extension")]
pub struct ParseExtensionError {
    extension: String,
}

/// Geographic tag attached to every review.
#[derive(
    Debug,
    Display,
    Copy,
    Clone,
    PartialEq,
    Eq,
    EnumIter,
    EnumString,
    FromRepr,
    AsExpression,
    FromSqlRow,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[diesel(sql_type = SmallInt)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[repr(i16)]
pub enum Region {
    North = 1,
    East = 2,
    South = 3,
    West = 4,
    Central = 5,
    Isaan = 6,
}

impl Region {
    /// Resolves a numeric region code from a region-listing route. Unknown
    /// codes resolve to None, which callers render as an "Unknown Region"
    /// feed with no results rather than an error.
    pub fn from_code(code: i16) -> Option<Self> {
        Self::from_repr(code)
    }

    /// Human-facing label, e.g. "North".
    pub fn label(self) -> &'static str {
        match self {
            Self::North => "North",
            Self::East => "East",
            Self::South => "South",
            Self::West => "West",
            Self::Central => "Central",
            Self::Isaan => "Isaan",
        }
    }

    /// Isaan is reachable through regional browsing only, never through the
    /// review form.
    pub fn creatable(self) -> bool {
        self != Self::Isaan
    }
}

impl ToSql<SmallInt, Pg> for Region
where
    i16: ToSql<SmallInt, Pg>,
{
    fn to_sql(&self, out: &mut Output<Pg>) -> serialize::Result {
        let value = *self as i16;
        <i16 as ToSql<SmallInt, Pg>>::to_sql(&value, &mut out.reborrow())
    }
}

impl FromSql<SmallInt, Pg> for Region
where
    i16: FromSql<SmallInt, Pg>,
{
    fn from_sql(bytes: <Pg as diesel::backend::Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let database_value = i16::from_sql(bytes)?;
        Region::from_repr(database_value).ok_or(DeserializeRegionError.into())
    }
}

/// A like or dislike toggle request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
    Like,
    Dislike,
}

#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, IntoStaticStr, Serialize, Deserialize, ToSchema)]
pub enum MimeType {
    #[serde(rename = "image/gif")]
    #[strum(serialize = "image/gif")]
    Gif,
    #[serde(rename = "image/jpeg")]
    #[strum(serialize = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    #[strum(serialize = "image/png")]
    Png,
    #[serde(rename = "image/webp")]
    #[strum(serialize = "image/webp")]
    Webp,
}

impl MimeType {
    pub fn from_extension(extension: &str) -> Result<Self, ParseExtensionError> {
        match extension {
            "gif" | "GIF" => Ok(Self::Gif),
            "jpg" | "jpeg" | "JPG" | "JPEG" => Ok(Self::Jpeg),
            "png" | "PNG" => Ok(Self::Png),
            "webp" | "WEBP" => Ok(Self::Webp),
            _ => Err(ParseExtensionError {
                extension: String::from(extension),
            }),
        }
    }

    pub fn from_content_type(content_type: &str) -> Result<Self, ParseExtensionError> {
        match content_type {
            "image/gif" => Ok(Self::Gif),
            "image/jpeg" => Ok(Self::Jpeg),
            "image/png" => Ok(Self::Png),
            "image/webp" => Ok(Self::Webp),
            _ => Err(ParseExtensionError {
                extension: String::from(content_type),
            }),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Gif => "gif",
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    pub fn to_image_format(self) -> ImageFormat {
        match self {
            Self::Gif => ImageFormat::Gif,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Webp => ImageFormat::WebP,
        }
    }
}

#[derive(Debug, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ResourceType {
    Post,
    User,
}

#[derive(Debug, Display)]
pub enum ResourceProperty {
    #[strum(serialize = "Username")]
    Username,
    #[strum(serialize = "Email")]
    UserEmail,
}

#[derive(Debug, Error)]
#[error("Failed to deserialize region")]
struct DeserializeRegionError;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn region_codes() {
        assert_eq!(Region::from_code(1), Some(Region::North));
        assert_eq!(Region::from_code(5), Some(Region::Central));
        assert_eq!(Region::from_code(6), Some(Region::Isaan));
        assert_eq!(Region::from_code(0), None);
        assert_eq!(Region::from_code(7), None);
        assert_eq!(Region::from_code(-1), None);
    }

    #[test]
    fn region_creatability() {
        assert!(Region::North.creatable());
        assert!(Region::Central.creatable());
        assert!(!Region::Isaan.creatable());
    }

    #[test]
    fn mime_type_from_extension() {
        assert_eq!(MimeType::from_extension("jpeg"), Ok(MimeType::Jpeg));
        assert_eq!(MimeType::from_extension("JPG"), Ok(MimeType::Jpeg));
        assert!(MimeType::from_extension("mp4").is_err());
    }
}
