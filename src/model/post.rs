use crate::model::enums::Region;
use crate::model::user::User;
use crate::schema::post;
use crate::time::DateTime;
use diesel::pg::Pg;
use diesel::prelude::*;
use serde_json::Value;

#[derive(Insertable)]
#[diesel(table_name = post)]
#[diesel(check_for_backend(Pg))]
pub struct NewPost<'a> {
    pub user_id: i64,
    pub post_title: &'a str,
    pub post_detail: &'a str,
    pub post_region: Region,
    pub post_image: Option<String>,
}

#[derive(Associations, Identifiable, Queryable, Selectable)]
#[diesel(belongs_to(User))]
#[diesel(table_name = post)]
#[diesel(primary_key(post_id))]
#[diesel(check_for_backend(Pg))]
pub struct Post {
    pub post_id: i64,
    pub user_id: i64,
    pub post_title: String,
    pub post_detail: String,
    pub post_region: Region,
    pub post_like: i32,
    pub post_dislike: i32,
    pub comment_count: i32,
    pub post_image: Option<String>,
    pub post_image_2: Option<String>,
    pub post_image_3: Option<String>,
    pub created_at: DateTime,
}

impl Post {
    /// Display-ready image URLs for this post, in order. Never fails.
    ///
    /// The image column went through three storage formats over time and all
    /// of them are still present in stored rows: a JSON-array-encoded string
    /// in `post_image` (current), a bare URL in `post_image` (older), and up
    /// to two additional URLs in the `post_image_2`/`post_image_3` scalar
    /// columns (oldest). Resolution order:
    ///
    /// 1. If `post_image` looks like a JSON array and parses as one, each
    ///    non-empty string element is emitted in array order and the scalar
    ///    columns are not consulted, even when the array is empty.
    /// 2. If `post_image` is non-empty but isn't a parsable array, it is
    ///    emitted as a single URL. A bracketed string with broken JSON inside
    ///    degrades to this case, garbled as it may be.
    /// 3. Otherwise `post_image_2` and `post_image_3` are emitted if present
    ///    and non-empty.
    pub fn image_urls(&self) -> Vec<String> {
        let mut urls = Vec::new();
        let mut structured = false;

        if let Some(image) = self.post_image.as_deref() {
            if image.starts_with('[') && image.ends_with(']') {
                match serde_json::from_str(image) {
                    Ok(Value::Array(entries)) => {
                        let parsed = entries
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::trim)
                            .filter(|url| !url.is_empty())
                            .map(String::from);
                        urls.extend(parsed);
                        structured = true;
                    }
                    Ok(_) | Err(_) => push_if_nonempty(&mut urls, image),
                }
            } else {
                push_if_nonempty(&mut urls, image);
            }
        }
        if !structured {
            for legacy in [&self.post_image_2, &self.post_image_3] {
                if let Some(url) = legacy.as_deref() {
                    push_if_nonempty(&mut urls, url);
                }
            }
        }
        urls
    }
}

fn push_if_nonempty(urls: &mut Vec<String>, url: &str) {
    let trimmed = url.trim();
    if !trimmed.is_empty() {
        urls.push(trimmed.to_owned());
    }
}

/// Encodes freshly uploaded image URLs the way new rows store them.
pub fn encode_image_urls(urls: &[String]) -> Option<String> {
    if urls.is_empty() {
        None
    } else {
        Some(serde_json::json!(urls).to_string())
    }
}

#[cfg(test)]
mod test {
    use crate::test::post_fixture;

    fn images(primary: Option<&str>, second: Option<&str>, third: Option<&str>) -> Vec<String> {
        let mut post = post_fixture(1, "Title", "Detail", 0, 0);
        post.post_image = primary.map(String::from);
        post.post_image_2 = second.map(String::from);
        post.post_image_3 = third.map(String::from);
        post.image_urls()
    }

    #[test]
    fn json_array_emits_nonempty_elements_in_order() {
        assert_eq!(images(Some(r#"["a","","b"]"#), None, None), ["a", "b"]);
        assert_eq!(images(Some(r#"[" a ","b"]"#), None, None), ["a", "b"]);
    }

    #[test]
    fn json_array_shadows_legacy_columns() {
        assert_eq!(images(Some(r#"["a"]"#), Some("x"), Some("y")), ["a"]);
        // An empty array still counts as the structured format
        assert_eq!(images(Some("[]"), Some("x"), None), Vec::<String>::new());
    }

    #[test]
    fn bare_url_is_a_single_image() {
        assert_eq!(images(Some("http://img/1.png"), None, None), ["http://img/1.png"]);
    }

    #[test]
    fn bare_url_does_not_shadow_legacy_columns() {
        assert_eq!(images(Some("a"), Some("x"), Some("y")), ["a", "x", "y"]);
    }

    #[test]
    fn legacy_columns_only() {
        assert_eq!(images(None, Some("x"), None), ["x"]);
        assert_eq!(images(None, Some("x"), Some("y")), ["x", "y"]);
        assert_eq!(images(None, None, Some("y")), ["y"]);
    }

    #[test]
    fn malformed_json_degrades_to_single_url() {
        // Swallowed silently; the whole bracketed string becomes one "URL"
        assert_eq!(images(Some("[not json"), None, None), ["[not json"]);
        assert_eq!(images(Some("[broken]"), None, None), ["[broken]"]);
    }

    #[test]
    fn non_string_array_elements_are_skipped() {
        assert_eq!(images(Some(r#"[1,"a",null]"#), None, None), ["a"]);
    }

    #[test]
    fn empty_everything_yields_no_urls() {
        assert_eq!(images(None, None, None), Vec::<String>::new());
        assert_eq!(images(Some(""), Some(""), Some("  ")), Vec::<String>::new());
    }

    #[test]
    fn never_more_urls_than_the_richer_format_holds() {
        let from_array = images(Some(r#"["a","b","c","d"]"#), Some("x"), Some("y"));
        assert!(from_array.len() <= 4);
        let from_legacy = images(None, Some("x"), Some("y"));
        assert!(from_legacy.len() <= 2);
    }
}
