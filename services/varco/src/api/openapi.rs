//! OpenAPI document for the gateway's routes.

use super::handlers::{health, login, logout, profile, register, root};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        root::root,
        health::health,
        login::login,
        register::register,
        logout::logout,
        profile::show,
        profile::update,
    ),
    components(schemas(
        login::LoginForm,
        register::RegisterForm,
        health::Health,
        root::RootInfo,
    )),
    tags(
        (name = "auth", description = "Session actions executed against the identity API"),
        (name = "profile", description = "Authenticated profile routes"),
        (name = "health", description = "Service health"),
        (name = "root", description = "Service banner"),
    )
)]
pub struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
