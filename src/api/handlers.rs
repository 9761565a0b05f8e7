use crate::{
    api::models::*,
    auth::jwt::Claims,
    core::{
        errors::BillSplitError,
        models::{audit::AppLog, expense::Expense, group::Group, user::UserProfile},
        settlement::SettlementReport,
    },
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post, put},
};
use http::header;
use std::sync::Arc;

use super::AppService;

/// Validates the bearer token and exposes its claims to handlers.
async fn auth_middleware(
    State(service): State<Arc<AppService>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| BillSplitError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| BillSplitError::Unauthorized("Invalid Authorization header".to_string()))?;

    let claims = service.validate_token(token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

pub fn api_routes(service: Arc<AppService>) -> Router {
    let protected_routes = Router::new()
        .route("/users/search", get(search_users))
        .route("/groups", post(create_group).get(get_my_groups))
        .route("/groups/{id}", get(get_group).delete(delete_group))
        .route("/groups/{id}/add-member", put(add_member))
        .route("/groups/{id}/remove-member", put(remove_member))
        .route("/groups/{id}/activity", get(get_group_activity))
        .route("/expenses", post(add_expense))
        .route("/expenses/group/{group_id}", get(get_group_expenses))
        .route("/expenses/group/{group_id}/bill-split", get(get_bill_split))
        .route("/expenses/{id}", axum::routing::delete(delete_expense))
        .route("/logs", get(get_my_activity))
        .route_layer(middleware::from_fn_with_state(service.clone(), auth_middleware));

    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .merge(protected_routes)
        .with_state(service)
}

#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 409, description = "Email or username already in use", body = ErrorResponse)
    )
)]
pub(crate) async fn register(
    State(service): State<Arc<AppService>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let (user, token) = service.register(req.username, req.email, req.password).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub(crate) async fn login(
    State(service): State<Arc<AppService>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (user, token) = service.authenticate(&req.email, &req.password).await?;
    Ok(Json(AuthResponse { user, token }))
}

#[utoipa::path(
    get,
    path = "/api/users/search",
    params(SearchUsersQuery),
    responses(
        (status = 200, description = "Matching users", body = Vec<UserProfile>),
        (status = 400, description = "Empty query", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn search_users(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<SearchUsersQuery>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    Ok(Json(service.search_users(&query.q, &claims.sub).await?))
}

#[utoipa::path(
    post,
    path = "/api/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = Group),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn create_group(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    let group = service.create_group(req.name, req.members, &claims.sub).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[utoipa::path(
    get,
    path = "/api/groups",
    responses((status = 200, description = "Groups the caller belongs to", body = Vec<Group>)),
    security(("Bearer" = []))
)]
pub(crate) async fn get_my_groups(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Group>>, ApiError> {
    Ok(Json(service.get_my_groups(&claims.sub).await?))
}

#[utoipa::path(
    get,
    path = "/api/groups/{id}",
    params(("id" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Group", body = Group),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn get_group(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Group>, ApiError> {
    Ok(Json(service.get_group(&id, &claims.sub).await?))
}

#[utoipa::path(
    put,
    path = "/api/groups/{id}/add-member",
    params(("id" = String, Path, description = "Group id")),
    request_body = MemberRequest,
    responses(
        (status = 200, description = "Member added", body = GroupMessageResponse),
        (status = 400, description = "Already a member", body = ErrorResponse),
        (status = 403, description = "Not the group creator", body = ErrorResponse),
        (status = 404, description = "Group or user not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn add_member(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<MemberRequest>,
) -> Result<Json<GroupMessageResponse>, ApiError> {
    let group = service.add_member(&id, &req.member_id, &claims.sub).await?;
    Ok(Json(GroupMessageResponse {
        message: "Member added successfully".to_string(),
        group,
    }))
}

#[utoipa::path(
    put,
    path = "/api/groups/{id}/remove-member",
    params(("id" = String, Path, description = "Group id")),
    request_body = MemberRequest,
    responses(
        (status = 200, description = "Member removed", body = GroupMessageResponse),
        (status = 400, description = "Creator cannot be removed", body = ErrorResponse),
        (status = 403, description = "Not the group creator, or target not a member", body = ErrorResponse),
        (status = 409, description = "Member has recorded expenses", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn remove_member(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<MemberRequest>,
) -> Result<Json<GroupMessageResponse>, ApiError> {
    let group = service.remove_member(&id, &req.member_id, &claims.sub).await?;
    Ok(Json(GroupMessageResponse {
        message: "Member removed successfully".to_string(),
        group,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/groups/{id}",
    params(("id" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Group removed", body = MessageResponse),
        (status = 403, description = "Not the group creator", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn delete_group(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.delete_group(&id, &claims.sub).await?;
    Ok(Json(MessageResponse {
        message: "Group removed".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/expenses",
    request_body = AddExpenseRequest,
    responses(
        (status = 201, description = "Expense recorded", body = Expense),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn add_expense(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AddExpenseRequest>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    let expense = service
        .add_expense(&req.group_id, req.description, req.amount, req.category, &claims.sub)
        .await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

#[utoipa::path(
    get,
    path = "/api/expenses/group/{group_id}",
    params(("group_id" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Expenses, newest first", body = Vec<Expense>),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn get_group_expenses(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    Ok(Json(service.get_group_expenses(&group_id, &claims.sub).await?))
}

#[utoipa::path(
    delete,
    path = "/api/expenses/{id}",
    params(("id" = String, Path, description = "Expense id")),
    responses(
        (status = 200, description = "Expense removed", body = MessageResponse),
        (status = 403, description = "Not the payer", body = ErrorResponse),
        (status = 404, description = "Expense not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn delete_expense(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.delete_expense(&id, &claims.sub).await?;
    Ok(Json(MessageResponse {
        message: "Expense removed".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/expenses/group/{group_id}/bill-split",
    params(("group_id" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Balances and settlement transactions", body = SettlementReport),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn get_bill_split(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<String>,
) -> Result<Json<SettlementReport>, ApiError> {
    Ok(Json(service.get_bill_split(&group_id, &claims.sub).await?))
}

#[utoipa::path(
    get,
    path = "/api/groups/{id}/activity",
    params(("id" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Audit entries for the group, oldest first", body = Vec<AppLog>),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn get_group_activity(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AppLog>>, ApiError> {
    Ok(Json(service.get_group_activity(&id, &claims.sub).await?))
}

#[utoipa::path(
    get,
    path = "/api/logs",
    responses((status = 200, description = "Actions performed by the caller, oldest first", body = Vec<AppLog>)),
    security(("Bearer" = []))
)]
pub(crate) async fn get_my_activity(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<AppLog>>, ApiError> {
    Ok(Json(service.get_my_activity(&claims.sub).await?))
}
