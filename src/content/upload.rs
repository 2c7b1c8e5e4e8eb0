use crate::api::{ApiError, ApiResult};
use crate::config::Config;
use crate::content::FileContents;
use crate::model::enums::MimeType;
use crate::string::SmallString;
use axum::extract::multipart::{Field, Multipart};
use std::ffi::OsStr;
use std::path::Path;
use strum::IntoStaticStr;

#[derive(Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum PartName {
    Image,
    Metadata,
}

/// A parsed review submission form: the JSON "metadata" part plus the
/// uploaded "image" parts in form order.
pub struct Body {
    pub images: Vec<FileContents>,
    pub metadata: Option<Vec<u8>>,
}

/// Extracts the "image" parts and the JSON "metadata" part from `form_data`.
/// Enforces the per-file size cap and the file count cap before anything
/// touches the bucket; a violation fails the entire submission.
pub async fn extract(mut form_data: Multipart, config: &Config) -> ApiResult<Body> {
    let image_part: &str = PartName::Image.into();
    let metadata_part: &str = PartName::Metadata.into();

    let mut images = Vec::new();
    let mut metadata = None;
    while let Some(field) = form_data.next_field().await? {
        if field.name() == Some(image_part) {
            let mime_type = get_mime_type(&field)?;
            let data = field.bytes().await?.to_vec();
            if data.len() > config.max_image_size {
                return Err(ApiError::FileTooLarge {
                    limit: config.max_image_size,
                });
            }
            if images.len() == config.max_images_per_post {
                return Err(ApiError::TooManyImages {
                    limit: config.max_images_per_post,
                });
            }
            images.push(FileContents { data, mime_type });
        } else if field.name() == Some(metadata_part) {
            if field.content_type() != Some("application/json") {
                return Err(ApiError::MissingContentType);
            }
            metadata = Some(field.bytes().await?.to_vec());
        }
    }
    Ok(Body { images, metadata })
}

/// Returns the MIME type of the given part.
/// It either gets this from the filename extension or the content type if no extension exists.
/// If both exist but their content types are different, an error is returned.
fn get_mime_type(field: &Field) -> ApiResult<MimeType> {
    let extension = field
        .file_name()
        .map(Path::new)
        .and_then(Path::extension)
        .and_then(OsStr::to_str);
    let content_type = field.content_type().map(str::trim);

    match (extension, content_type) {
        (Some(ext), None | Some("application/octet-stream")) => MimeType::from_extension(ext).map_err(ApiError::from),
        (Some(ext), Some(content_type)) => {
            let mime_type = MimeType::from_extension(ext)?;
            if MimeType::from_content_type(content_type) != Ok(mime_type) {
                return Err(ApiError::ContentTypeMismatch(mime_type, SmallString::new(content_type)));
            }
            Ok(mime_type)
        }
        (None, Some(content_type)) => MimeType::from_content_type(content_type).map_err(ApiError::from),
        (None, None) => Err(ApiError::MissingContentType),
    }
}
