//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::handlers::user_handler::{CreateUserRequest, UpdateUserRequest};
use domain::User;

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::user_handler::search_users,
        crate::handlers::user_handler::create_user,
        crate::handlers::user_handler::get_user,
        crate::handlers::user_handler::update_user,
        crate::handlers::user_handler::delete_user,
    ),
    components(
        schemas(
            User,
            CreateUserRequest,
            UpdateUserRequest,
        )
    ),
    tags(
        (name = "Users", description = "User directory endpoints"),
    )
)]
pub struct ApiDoc;
