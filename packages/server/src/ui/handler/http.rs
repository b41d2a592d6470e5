//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    infrastructure::dto::http::{GroupSummaryDto, UserListDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Online handles, sorted
pub async fn get_users(State(state): State<Arc<AppState>>) -> Json<UserListDto> {
    let users = state.get_hub_state_usecase.online_users().await;
    Json(UserListDto {
        users: users.into_iter().map(|h| h.into_string()).collect(),
    })
}

/// Every live group with its message count
pub async fn get_groups(State(state): State<Arc<AppState>>) -> Json<Vec<GroupSummaryDto>> {
    let summaries = state.get_hub_state_usecase.groups().await;

    // Domain Model から DTO への変換
    let groups = summaries
        .into_iter()
        .map(|summary| GroupSummaryDto {
            id: summary.group.id().as_str().to_string(),
            name: summary.group.name().as_str().to_string(),
            admin: summary.group.admin().as_str().to_string(),
            members: summary
                .group
                .members()
                .iter()
                .map(|member| member.as_str().to_string())
                .collect(),
            message_count: summary.message_count,
        })
        .collect();

    Json(groups)
}
