use crate::AppState;
use crate::cache::Published;
use crate::error::AppError;
use crate::validation;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_macros::debug_handler;
use chrono::{DateTime, Utc};
use rollcall_snapshot::{Permission, Platform, Snapshot};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusResponse {
    ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_time_utc: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WorldResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visits: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    favorites: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    occupants: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GroupResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    member_count: usize,
    members: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ServerResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    /// Member count as reported by Discord, linked or not.
    #[serde(skip_serializing_if = "Option::is_none")]
    member_count: Option<u32>,
    linked_member_count: usize,
    members: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RoleResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    is_admin: bool,
    is_moderator: bool,
    members: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserResponse {
    admin_anywhere: bool,
    moderator_anywhere: bool,
}

#[derive(Serialize)]
pub(crate) struct MembershipResponse {
    member: bool,
    admin: bool,
    moderator: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HasRoleResponse {
    has_role: bool,
}

/// The published snapshot, or `NotReady` before the first refresh lands.
fn active(state: &AppState) -> Result<Arc<Published>, AppError> {
    state.cache.current().ok_or(AppError::NotReady)
}

fn owned(names: Vec<&str>) -> Vec<String> {
    names.into_iter().map(str::to_owned).collect()
}

fn role_response(
    snapshot: &Snapshot,
    platform: Platform,
    id: &str,
    role_id: &str,
) -> Result<RoleResponse, AppError> {
    snapshot
        .role(platform, id, role_id)
        .ok_or(AppError::NotFound("role"))?;
    let members = snapshot
        .role_member_display_names(platform, id, role_id)
        .ok_or(AppError::NotFound("role"))?;

    Ok(RoleResponse {
        name: snapshot.role_name(platform, id, role_id).map(str::to_owned),
        is_admin: snapshot
            .role_flag(platform, id, role_id, Permission::Admin)
            .unwrap_or(false),
        is_moderator: snapshot
            .role_flag(platform, id, role_id, Permission::Moderator)
            .unwrap_or(false),
        members: owned(members),
    })
}

fn membership_response(
    snapshot: &Snapshot,
    platform: Platform,
    name: &str,
    id: &str,
) -> MembershipResponse {
    MembershipResponse {
        member: snapshot.is_member(platform, name, id),
        admin: snapshot.holds_permission(platform, Permission::Admin, name, id),
        moderator: snapshot.holds_permission(platform, Permission::Moderator, name, id),
    }
}

// =============================================================================
// Service
// =============================================================================

#[debug_handler]
pub(crate) async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = match state.cache.current() {
        Some(published) => StatusResponse {
            ready: true,
            file_time_utc: published.snapshot.file_time_utc(),
            updated_at: Some(published.updated_at),
            refreshed_at: Some(published.refreshed_at),
        },
        None => StatusResponse {
            ready: false,
            file_time_utc: None,
            updated_at: None,
            refreshed_at: None,
        },
    };
    Json(response)
}

#[debug_handler]
pub(crate) async fn refresh(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    tracing::info!("manual refresh requested over HTTP");
    state.refresh_requests.notify_one();
    StatusCode::ACCEPTED
}

// =============================================================================
// Worlds, groups and servers
// =============================================================================

#[debug_handler]
pub(crate) async fn world(
    State(state): State<Arc<AppState>>,
    Path(world_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_id(&world_id)?;

    let published = active(&state)?;
    let snapshot = &published.snapshot;
    snapshot
        .vrc_world(&world_id)
        .ok_or(AppError::NotFound("world"))?;

    Ok(Json(WorldResponse {
        name: snapshot.vrc_world_name(&world_id).map(str::to_owned),
        visits: snapshot.vrc_world_visits(&world_id),
        favorites: snapshot.vrc_world_favorites(&world_id),
        occupants: snapshot.vrc_world_occupants(&world_id),
    }))
}

#[debug_handler]
pub(crate) async fn group(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_id(&group_id)?;

    let published = active(&state)?;
    let snapshot = &published.snapshot;
    snapshot
        .vrc_group(&group_id)
        .ok_or(AppError::NotFound("group"))?;
    let members = snapshot
        .vrc_group_member_display_names(&group_id)
        .ok_or(AppError::NotFound("group"))?;

    Ok(Json(GroupResponse {
        name: snapshot.vrc_group_name(&group_id).map(str::to_owned),
        member_count: snapshot
            .vrc_group_member_count(&group_id)
            .unwrap_or(members.len()),
        members: owned(members),
    }))
}

#[debug_handler]
pub(crate) async fn group_role(
    State(state): State<Arc<AppState>>,
    Path((group_id, role_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_id(&group_id)?;
    validation::validate_id(&role_id)?;

    let published = active(&state)?;
    let response = role_response(&published.snapshot, Platform::VrcGroup, &group_id, &role_id)?;
    Ok(Json(response))
}

#[debug_handler]
pub(crate) async fn server(
    State(state): State<Arc<AppState>>,
    Path(guild_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_id(&guild_id)?;

    let published = active(&state)?;
    let snapshot = &published.snapshot;
    snapshot
        .discord_server(&guild_id)
        .ok_or(AppError::NotFound("server"))?;
    let members = snapshot
        .discord_member_display_names(&guild_id)
        .ok_or(AppError::NotFound("server"))?;

    Ok(Json(ServerResponse {
        name: snapshot.discord_server_name(&guild_id).map(str::to_owned),
        member_count: snapshot.discord_server_member_count(&guild_id),
        linked_member_count: snapshot
            .discord_vrc_linked_member_count(&guild_id)
            .unwrap_or(members.len()),
        members: owned(members),
    }))
}

#[debug_handler]
pub(crate) async fn server_role(
    State(state): State<Arc<AppState>>,
    Path((guild_id, role_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_id(&guild_id)?;
    validation::validate_id(&role_id)?;

    let published = active(&state)?;
    let response = role_response(
        &published.snapshot,
        Platform::DiscordServer,
        &guild_id,
        &role_id,
    )?;
    Ok(Json(response))
}

// =============================================================================
// Users
// =============================================================================

#[debug_handler]
pub(crate) async fn user(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_display_name(&name)?;

    let published = active(&state)?;
    let snapshot = &published.snapshot;
    Ok(Json(UserResponse {
        admin_anywhere: snapshot.is_admin_anywhere(&name),
        moderator_anywhere: snapshot.is_moderator_anywhere(&name),
    }))
}

#[debug_handler]
pub(crate) async fn user_group(
    State(state): State<Arc<AppState>>,
    Path((name, group_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_display_name(&name)?;
    validation::validate_id(&group_id)?;

    let published = active(&state)?;
    let response = membership_response(&published.snapshot, Platform::VrcGroup, &name, &group_id);
    Ok(Json(response))
}

#[debug_handler]
pub(crate) async fn user_group_role(
    State(state): State<Arc<AppState>>,
    Path((name, group_id, role_id)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_display_name(&name)?;
    validation::validate_id(&group_id)?;
    validation::validate_id(&role_id)?;

    let published = active(&state)?;
    Ok(Json(HasRoleResponse {
        has_role: published
            .snapshot
            .has_vrc_group_role(&name, &group_id, &role_id),
    }))
}

#[debug_handler]
pub(crate) async fn user_server(
    State(state): State<Arc<AppState>>,
    Path((name, guild_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_display_name(&name)?;
    validation::validate_id(&guild_id)?;

    let published = active(&state)?;
    let response = membership_response(
        &published.snapshot,
        Platform::DiscordServer,
        &name,
        &guild_id,
    );
    Ok(Json(response))
}

#[debug_handler]
pub(crate) async fn user_server_role(
    State(state): State<Arc<AppState>>,
    Path((name, guild_id, role_id)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_display_name(&name)?;
    validation::validate_id(&guild_id)?;
    validation::validate_id(&role_id)?;

    let published = active(&state)?;
    Ok(Json(HasRoleResponse {
        has_role: published
            .snapshot
            .has_discord_role(&name, &guild_id, &role_id),
    }))
}
