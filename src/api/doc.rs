use utoipa::OpenApi;

pub const COMMENT_TAG: &str = "Comment";
pub const INFO_TAG: &str = "Info";
pub const POST_TAG: &str = "Post";
pub const USER_TAG: &str = "User";

#[derive(OpenApi)]
#[openapi(
    tags(
        (name = COMMENT_TAG, description = "Comment API endpoints"),
        (name = INFO_TAG, description = "Info API endpoints"),
        (name = POST_TAG, description = "Post API endpoints"),
        (name = USER_TAG, description = "User API endpoints"),
        (name = "Authentication", description = AUTHENTICATION_DESCRIPTION),
        (name = "Device-Identity", description = DEVICE_IDENTITY_DESCRIPTION),
        (name = "Field-Selection", description = FIELD_SELECTION_DESCRIPTION),
        (name = "Errors", description = ERROR_DESCRIPTION),
    )
)]
pub struct ApiDoc;

const AUTHENTICATION_DESCRIPTION: &str = r#"
Authentication is achieved by means of [basic HTTP
auth](https://en.wikipedia.org/wiki/Basic_access_authentication). For this
reason, it is recommended to connect through HTTPS. There are no sessions, so
every privileged request must be authenticated. The login view is backed by
`GET /users/me`, which validates the presented credentials and returns the
account.
"#;

const DEVICE_IDENTITY_DESCRIPTION: &str = r#"
Like/dislike state is tracked per device, not per account. Clients generate a
UUID once, store it locally, and send it with every request as an
`X-Device-Id` header. Requests carrying the header get their own vote state
(`ownVote`) included in post resources; the vote endpoint requires it. Vote
state is not synchronized across devices, and callers that share a device id
share vote state.
"#;

const FIELD_SELECTION_DESCRIPTION: &str = r#"
Sometimes the client might want to choose the fields the server sends to it
in order to improve the query speed. To choose the fields, the client should
pass a `?fields=field1,field2,...` suffix to the query.

For example, to list posts while getting only their IDs and titles, the
client should send a `GET` query like this:

```
GET /posts/?fields=id,title
```
"#;

const ERROR_DESCRIPTION: &str = r#"
All errors (except for unhandled fatal server errors) send relevant HTTP
status code together with JSON of following structure:

```json5
{
    "name": "Name of the error, e.g. 'DuplicateContent'",
    "title": "Generic title of error message, e.g. 'Duplicate Content'",
    "description": "Detailed description of what went wrong"
}
```
"#;
