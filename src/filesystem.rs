use crate::config::Config;
use crate::model::enums::MimeType;
use crate::time::DateTime;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use url::Url;
use uuid::Uuid;

/// Generates an object key for an uploaded image: submission timestamp in
/// unix milliseconds, a random suffix, the image's position within the
/// submission, and the format's canonical extension. The random suffix keeps
/// keys from colliding when multiple clients submit in the same millisecond.
pub fn object_key(uploaded_at: DateTime, index: usize, mime_type: MimeType) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}.{}",
        uploaded_at.unix_millis(),
        &suffix[..8],
        index,
        mime_type.extension()
    )
}

pub fn object_path(config: &Config, key: &str) -> PathBuf {
    config.bucket_path().join(key)
}

/// Writes an uploaded image into the bucket. Rejects overwriting an
/// existing key.
pub async fn save_bucket_object(config: &Config, key: &str, data: &[u8]) -> std::io::Result<()> {
    let path = object_path(config, key);
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await?;
    file.write_all(data).await
}

/// The URL clients use to fetch an object in the bucket.
pub fn public_url(config: &Config, key: &str) -> Result<Url, url::ParseError> {
    let base = config.public_data_url.as_str().trim_end_matches('/');
    Url::parse(&format!("{base}/{key}"))
}

/// Creates the data directories the server writes into.
pub fn create_data_directories(config: &Config) -> std::io::Result<()> {
    std::fs::create_dir_all(config.bucket_path())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config;
    use crate::test::temp_data_dir;

    #[test]
    fn object_keys_have_the_documented_shape() {
        let now = DateTime::now();
        let key = object_key(now, 2, MimeType::Jpeg);

        let mut parts = key.rsplitn(2, '.');
        assert_eq!(parts.next(), Some("jpg"));
        let stem = parts.next().unwrap();
        let segments: Vec<&str> = stem.split('-').collect();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], now.unix_millis().to_string());
        assert_eq!(segments[1].len(), 8);
        assert_eq!(segments[2], "2");
    }

    #[test]
    fn object_keys_are_unique_per_call() {
        let now = DateTime::now();
        assert_ne!(object_key(now, 0, MimeType::Png), object_key(now, 0, MimeType::Png));
    }

    #[tokio::test]
    async fn bucket_objects_are_never_overwritten() {
        let config = config::test_config(Some(temp_data_dir()));
        create_data_directories(&config).unwrap();

        save_bucket_object(&config, "1-abcd1234-0.png", b"first").await.unwrap();
        let second = save_bucket_object(&config, "1-abcd1234-0.png", b"second").await;
        assert_eq!(second.unwrap_err().kind(), std::io::ErrorKind::AlreadyExists);

        let contents = std::fs::read(object_path(&config, "1-abcd1234-0.png")).unwrap();
        assert_eq!(contents, b"first");
    }

    #[test]
    fn public_urls_join_cleanly() {
        let config = config::test_config(None);
        let url = public_url(&config, "1-abcd1234-0.png").unwrap();
        assert!(url.as_str().ends_with("/images/1-abcd1234-0.png"));
        assert_eq!(url.as_str().matches("//").count(), 1);
    }
}
