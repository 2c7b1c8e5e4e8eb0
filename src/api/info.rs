use crate::api::doc::INFO_TAG;
use crate::api::extract::Json;
use crate::app::AppState;
use crate::model::enums::Region;
use axum::extract::State;
use serde::Serialize;
use strum::IntoEnumIterator;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(get_info))
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct RegionInfo {
    code: i16,
    name: &'static str,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct Info {
    name: &'static str,
    version: &'static str,
    max_images_per_post: usize,
    max_image_size: usize,
    regions: Vec<RegionInfo>,
}

/// Retrieves server configuration relevant to clients: upload limits and
/// the recognized regions with their numeric codes.
#[utoipa::path(
    get,
    path = "/info",
    tag = INFO_TAG,
    responses(
        (status = 200, description = "Server info", body = Info),
    ),
)]
async fn get_info(State(state): State<AppState>) -> Json<Info> {
    let regions = Region::iter()
        .map(|region| RegionInfo {
            code: region as i16,
            name: region.label(),
        })
        .collect();
    Json(Info {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        max_images_per_post: state.config.max_images_per_post,
        max_image_size: state.config.max_image_size,
        regions,
    })
}

#[cfg(test)]
mod test {
    use crate::test::test_server;

    #[tokio::test]
    async fn info_reports_limits_and_regions() {
        let server = test_server();
        let response = server.get("/info").await;
        response.assert_status_ok();

        let info: serde_json::Value = response.json();
        assert_eq!(info["name"], "cafehub_server");
        assert_eq!(info["maxImagesPerPost"], 5);
        assert_eq!(info["regions"].as_array().unwrap().len(), 6);
        assert_eq!(info["regions"][0]["name"], "North");
        assert_eq!(info["regions"][5]["code"], 6);
    }
}
