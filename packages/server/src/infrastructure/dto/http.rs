//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// Online users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserListDto {
    pub users: Vec<String>,
}

/// Group summary for operator inspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummaryDto {
    pub id: String,
    pub name: String,
    pub admin: String,
    pub members: Vec<String>,
    pub message_count: usize,
}
