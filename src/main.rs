#![warn(clippy::pedantic)]
// Gives warnings for every diesel::prelude::* import
#![allow(clippy::wildcard_imports)]
// Too subjective
#![allow(clippy::similar_names, clippy::too_many_lines)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::match_bool)]
#![allow(clippy::single_match_else)]
#![allow(clippy::doc_markdown)]

mod api;
mod app;
mod auth;
mod config;
mod content;
mod curate;
mod db;
mod error;
mod filesystem;
mod model;
mod resource;
mod schema;
mod string;
#[cfg(test)]
mod test;
mod time;
mod vote;

#[tokio::main]
async fn main() {
    app::enable_tracing();
    match app::initialize() {
        Ok(state) => app::run(state).await,
        Err(err) => {
            tracing::error!("An error occurred during initialization. Details:\n{err}");
            std::process::exit(1);
        }
    }
}
