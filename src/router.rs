use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::middleware::permission::{PermissionMap, enforce_permission_map, require_any_role};
use crate::modules::assignments::router::{
    init_assignments_router, init_my_homework_router, init_my_submissions_router,
    init_submissions_router,
};
use crate::modules::auth::router::init_auth_router;
use crate::modules::exams::router::{
    init_blueprints_router, init_exam_instances_router, init_exam_results_router,
    init_my_exams_router, init_question_groups_router, init_questions_router,
};
use crate::modules::roles::router::{init_roles_router, init_user_role_router};
use crate::modules::users::router::init_users_router;
use crate::permissions;
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

// Method-to-permission tables, one per route group. A method absent
// from its table only requires authentication.

const ASSIGNMENT_PERMISSIONS: PermissionMap = PermissionMap(&[
    (Method::GET, permissions::VIEW_ASSIGNMENTS),
    (Method::POST, permissions::MANAGE_ASSIGNMENTS),
    (Method::PUT, permissions::MANAGE_ASSIGNMENTS),
    (Method::DELETE, permissions::MANAGE_ASSIGNMENTS),
]);

const SUBMISSION_PERMISSIONS: PermissionMap = PermissionMap(&[
    (Method::GET, permissions::VIEW_SUBMISSIONS),
    (Method::PATCH, permissions::GRADE_SUBMISSIONS),
    (Method::POST, permissions::GRADE_SUBMISSIONS),
]);

const MY_HOMEWORK_PERMISSIONS: PermissionMap = PermissionMap(&[
    (Method::GET, permissions::VIEW_ASSIGNMENTS),
    (Method::POST, permissions::SUBMIT_ASSIGNMENTS),
]);

const MY_SUBMISSION_PERMISSIONS: PermissionMap = PermissionMap(&[
    (Method::GET, permissions::VIEW_SUBMISSIONS),
    (Method::POST, permissions::SUBMIT_ASSIGNMENTS),
]);

const EXAM_ADMIN_PERMISSIONS: PermissionMap = PermissionMap(&[
    (Method::GET, permissions::MANAGE_EXAMS),
    (Method::POST, permissions::MANAGE_EXAMS),
    (Method::PUT, permissions::MANAGE_EXAMS),
    (Method::PATCH, permissions::MANAGE_EXAMS),
    (Method::DELETE, permissions::MANAGE_EXAMS),
]);

const EXAM_RESULT_PERMISSIONS: PermissionMap = PermissionMap(&[
    (Method::GET, permissions::VIEW_EXAMS),
    (Method::PATCH, permissions::MANAGE_EXAMS),
]);

const MY_EXAM_PERMISSIONS: PermissionMap = PermissionMap(&[
    (Method::GET, permissions::VIEW_EXAMS),
    (Method::POST, permissions::TAKE_EXAMS),
]);

const USER_ADMIN_PERMISSIONS: PermissionMap = PermissionMap(&[
    (Method::GET, permissions::VIEW_ALL_USERS),
    (Method::POST, permissions::EDIT_ALL_USERS),
    (Method::PATCH, permissions::EDIT_ALL_USERS),
]);

const ROLE_ADMIN_PERMISSIONS: PermissionMap = PermissionMap(&[
    (Method::GET, permissions::MANAGE_ROLES),
    (Method::POST, permissions::MANAGE_ROLES),
    (Method::DELETE, permissions::MANAGE_ROLES),
]);

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest(
            "/api",
            Router::new()
                .nest("/auth", init_auth_router())
                .nest(
                    "/users",
                    init_users_router()
                        .route_layer(middleware::from_fn_with_state(
                            state.clone(),
                            |s, req, next| {
                                enforce_permission_map(USER_ADMIN_PERMISSIONS, s, req, next)
                            },
                        ))
                        .route_layer(middleware::from_fn_with_state(
                            state.clone(),
                            |s, req, next| require_any_role(&["admin", "manager"], s, req, next),
                        )),
                )
                .nest(
                    "/users",
                    init_user_role_router()
                        .route_layer(middleware::from_fn_with_state(
                            state.clone(),
                            |s, req, next| {
                                enforce_permission_map(ROLE_ADMIN_PERMISSIONS, s, req, next)
                            },
                        ))
                        .route_layer(middleware::from_fn_with_state(
                            state.clone(),
                            |s, req, next| require_any_role(&["admin"], s, req, next),
                        )),
                )
                .nest(
                    "/roles",
                    init_roles_router()
                        .route_layer(middleware::from_fn_with_state(
                            state.clone(),
                            |s, req, next| {
                                enforce_permission_map(ROLE_ADMIN_PERMISSIONS, s, req, next)
                            },
                        ))
                        .route_layer(middleware::from_fn_with_state(
                            state.clone(),
                            |s, req, next| require_any_role(&["admin"], s, req, next),
                        )),
                )
                .nest(
                    "/assignments",
                    init_assignments_router().route_layer(middleware::from_fn_with_state(
                        state.clone(),
                        |s, req, next| {
                            enforce_permission_map(ASSIGNMENT_PERMISSIONS, s, req, next)
                        },
                    )),
                )
                .nest(
                    "/submissions",
                    init_submissions_router().route_layer(middleware::from_fn_with_state(
                        state.clone(),
                        |s, req, next| {
                            enforce_permission_map(SUBMISSION_PERMISSIONS, s, req, next)
                        },
                    )),
                )
                .nest(
                    "/my-homework",
                    init_my_homework_router().route_layer(middleware::from_fn_with_state(
                        state.clone(),
                        |s, req, next| {
                            enforce_permission_map(MY_HOMEWORK_PERMISSIONS, s, req, next)
                        },
                    )),
                )
                .nest(
                    "/my-submissions",
                    init_my_submissions_router().route_layer(middleware::from_fn_with_state(
                        state.clone(),
                        |s, req, next| {
                            enforce_permission_map(MY_SUBMISSION_PERMISSIONS, s, req, next)
                        },
                    )),
                )
                .nest(
                    "/question-groups",
                    init_question_groups_router().route_layer(middleware::from_fn_with_state(
                        state.clone(),
                        |s, req, next| {
                            enforce_permission_map(EXAM_ADMIN_PERMISSIONS, s, req, next)
                        },
                    )),
                )
                .nest(
                    "/questions",
                    init_questions_router().route_layer(middleware::from_fn_with_state(
                        state.clone(),
                        |s, req, next| {
                            enforce_permission_map(EXAM_ADMIN_PERMISSIONS, s, req, next)
                        },
                    )),
                )
                .nest(
                    "/exam-blueprints",
                    init_blueprints_router().route_layer(middleware::from_fn_with_state(
                        state.clone(),
                        |s, req, next| {
                            enforce_permission_map(EXAM_ADMIN_PERMISSIONS, s, req, next)
                        },
                    )),
                )
                .nest(
                    "/exam-instances",
                    init_exam_instances_router().route_layer(middleware::from_fn_with_state(
                        state.clone(),
                        |s, req, next| {
                            enforce_permission_map(EXAM_ADMIN_PERMISSIONS, s, req, next)
                        },
                    )),
                )
                .nest(
                    "/exam-results",
                    init_exam_results_router().route_layer(middleware::from_fn_with_state(
                        state.clone(),
                        |s, req, next| {
                            enforce_permission_map(EXAM_RESULT_PERMISSIONS, s, req, next)
                        },
                    )),
                )
                .nest(
                    "/my-exams",
                    init_my_exams_router().route_layer(middleware::from_fn_with_state(
                        state.clone(),
                        |s, req, next| enforce_permission_map(MY_EXAM_PERMISSIONS, s, req, next),
                    )),
                ),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(logging_middleware))
}
