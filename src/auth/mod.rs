pub mod header;
pub mod password;

/// The authenticated identity of the request, inserted by the auth
/// middleware. Anonymous clients can browse; everything that writes
/// requires a logged-in id.
#[derive(Debug, Clone, Copy)]
pub struct Client {
    pub id: Option<i64>,
}

impl Client {
    pub const fn new(id: Option<i64>) -> Self {
        Self { id }
    }

    pub const fn anonymous() -> Self {
        Self { id: None }
    }
}
