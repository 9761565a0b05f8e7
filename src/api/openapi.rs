use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::{
    api::models::{
        AddExpenseRequest, AuthResponse, CreateGroupRequest, ErrorResponse, GroupMessageResponse, LoginRequest,
        MemberRequest, MessageResponse, RegisterRequest,
    },
    core::{
        models::{
            audit::AppLog,
            expense::{Category, Expense, SplitDetail},
            group::{Group, GroupMember, Role},
            user::UserProfile,
        },
        settlement::{SettlementPlan, SettlementReport, SettlementTransaction},
    },
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::register,
        super::handlers::login,
        super::handlers::search_users,
        super::handlers::create_group,
        super::handlers::get_my_groups,
        super::handlers::get_group,
        super::handlers::add_member,
        super::handlers::remove_member,
        super::handlers::delete_group,
        super::handlers::add_expense,
        super::handlers::get_group_expenses,
        super::handlers::delete_expense,
        super::handlers::get_bill_split,
        super::handlers::get_group_activity,
        super::handlers::get_my_activity
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        CreateGroupRequest,
        MemberRequest,
        GroupMessageResponse,
        AddExpenseRequest,
        MessageResponse,
        ErrorResponse,
        UserProfile,
        Group,
        GroupMember,
        Role,
        Expense,
        Category,
        SplitDetail,
        SettlementTransaction,
        SettlementPlan,
        SettlementReport,
        AppLog
    )),
    modifiers(&BearerAuth),
    info(
        title = "Bill Split API",
        description = "Record shared group expenses and work out who owes whom",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
