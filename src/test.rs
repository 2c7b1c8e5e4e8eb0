use crate::app::AppState;
use crate::config;
use crate::model::enums::Region;
use crate::model::post::Post;
use crate::time::DateTime;
use crate::vote::VoteLedger;
use axum_test::TestServer;
use diesel::r2d2::{ConnectionManager, Pool};
use std::path::PathBuf;
use uuid::Uuid;

/// A fresh directory under the system temp dir, so tests never share
/// ledger or bucket state.
pub fn temp_data_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cafehub-test-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap_or_else(|err| panic!("{err}"));
    dir
}

pub fn post_fixture(post_id: i64, title: &str, detail: &str, likes: i32, dislikes: i32) -> Post {
    Post {
        post_id,
        user_id: 1,
        post_title: title.to_owned(),
        post_detail: detail.to_owned(),
        post_region: Region::Central,
        post_like: likes,
        post_dislike: dislikes,
        comment_count: 0,
        post_image: None,
        post_image_2: None,
        post_image_3: None,
        created_at: DateTime::now(),
    }
}

/// App state over the dist config with an isolated data directory. The
/// connection pool is built without eagerly connecting, so endpoints that
/// never touch the database work without one running.
pub fn test_state() -> AppState {
    let config = config::test_config(Some(temp_data_dir()));
    let votes = VoteLedger::load(config.vote_ledger_path()).unwrap_or_else(|err| panic!("{err}"));
    let manager = ConnectionManager::new("postgres://postgres@localhost/cafehub_test");
    let pool = Pool::builder().max_size(1).min_idle(Some(0)).build_unchecked(manager);
    AppState::new(config, pool, votes)
}

pub fn test_server() -> TestServer {
    TestServer::new(crate::api::routes(test_state())).unwrap_or_else(|err| panic!("{err}"))
}
