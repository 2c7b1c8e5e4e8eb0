use crate::api::{ApiError, ApiResult};
use crate::app::AppState;
use crate::auth::{Client, header};
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

pub const DEVICE_ID_HEADER: &str = "x-device-id";

/// The caller's self-assigned device identity, parsed from the X-Device-Id
/// header. Vote state is scoped to it; anyone presenting the same id shares
/// vote state, just like visitors sharing a browser did.
#[derive(Debug, Clone, Copy)]
pub struct Device(pub Option<Uuid>);

impl Device {
    pub fn require(self) -> ApiResult<Uuid> {
        self.0.ok_or(ApiError::DeviceRequired)
    }
}

/// Authorizes the client by username/password and parses its device
/// identity. Both are attached to the request as extensions.
pub async fn auth(State(state): State<AppState>, mut request: Request, next: Next) -> ApiResult<Response> {
    let client = match request.headers().get(AUTHORIZATION) {
        Some(value) => header::authenticate_user(&state, value.to_str()?)?,
        None => Client::anonymous(),
    };
    let device = request
        .headers()
        .get(DEVICE_ID_HEADER)
        .map(|value| value.to_str())
        .transpose()?
        .map(Uuid::parse_str)
        .transpose()?;

    request.extensions_mut().insert(client);
    request.extensions_mut().insert(Device(device));
    Ok(next.run(request).await)
}
