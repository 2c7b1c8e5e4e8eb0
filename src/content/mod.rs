pub mod upload;

use crate::api::ApiResult;
use crate::model::enums::MimeType;

/// Stores file contents and mime type of an uploaded image.
pub struct FileContents {
    pub data: Vec<u8>,
    pub mime_type: MimeType,
}

impl FileContents {
    /// Checks that the bytes actually decode as the format the upload
    /// claimed to be. Runs before anything is written to the bucket.
    pub fn verify_decodable(&self) -> ApiResult<()> {
        image::load_from_memory_with_format(&self.data, self.mime_type.to_image_format())
            .map(|_| ())
            .map_err(Into::into)
    }
}
