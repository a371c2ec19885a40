//! Guarded lookups into a [`Snapshot`].
//!
//! Each accessor resolves its path afresh on every call and returns `None` if
//! any step is absent or has the wrong kind. Nothing here defaults a missing
//! value; the query layer decides what absence means.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::Snapshot;
use crate::file_time::file_time_to_utc;
use crate::models::{
  DISCORD_SERVERS_BY_ID, FAVORITES, FILE_TIME_UTC, MEMBER_COUNT, NAME, OCCUPANTS, Permission,
  Platform, ROLES, VISITS, VRC_USER_DISPLAY_NAMES, VRC_USERS, VRC_WORLDS_BY_ID,
};
use crate::path::{Step, as_count, as_file_time};

impl Snapshot {
  fn object_at(&self, steps: &[Step<'_>]) -> Option<&Map<String, Value>> {
    self.lookup(steps).and_then(Value::as_object)
  }

  fn array_at(&self, steps: &[Step<'_>]) -> Option<&[Value]> {
    self.lookup(steps).and_then(Value::as_array).map(Vec::as_slice)
  }

  fn str_at(&self, steps: &[Step<'_>]) -> Option<&str> {
    self.lookup(steps).and_then(Value::as_str)
  }

  fn bool_at(&self, steps: &[Step<'_>]) -> Option<bool> {
    self.lookup(steps).and_then(Value::as_bool)
  }

  fn count_at(&self, steps: &[Step<'_>]) -> Option<u32> {
    self.lookup(steps).and_then(as_count)
  }

  // ==========================================================================
  // Metadata
  // ==========================================================================

  /// Time the document was produced, in 100 ns ticks since 1601-01-01 UTC.
  pub fn file_time_utc(&self) -> Option<i64> {
    self.lookup(&[Step::number(FILE_TIME_UTC)]).and_then(as_file_time)
  }

  /// [`Self::file_time_utc`] as a UTC timestamp.
  pub fn date_time(&self) -> Option<DateTime<Utc>> {
    self.file_time_utc().and_then(file_time_to_utc)
  }

  /// The index-to-name table. Every `vrcUsers` entry is a position in it.
  pub fn vrc_user_display_names(&self) -> Option<&[Value]> {
    self.array_at(&[Step::array(VRC_USER_DISPLAY_NAMES)])
  }

  // ==========================================================================
  // VRC Worlds
  // ==========================================================================

  pub fn vrc_worlds_by_id(&self) -> Option<&Map<String, Value>> {
    self.object_at(&[Step::object(VRC_WORLDS_BY_ID)])
  }

  pub fn vrc_world(&self, world_id: &str) -> Option<&Map<String, Value>> {
    self.object_at(&[Step::object(VRC_WORLDS_BY_ID), Step::object(world_id)])
  }

  pub fn vrc_world_name(&self, world_id: &str) -> Option<&str> {
    self.str_at(&[
      Step::object(VRC_WORLDS_BY_ID),
      Step::object(world_id),
      Step::string(NAME),
    ])
  }

  pub fn vrc_world_visits(&self, world_id: &str) -> Option<u32> {
    self.count_at(&[
      Step::object(VRC_WORLDS_BY_ID),
      Step::object(world_id),
      Step::number(VISITS),
    ])
  }

  pub fn vrc_world_favorites(&self, world_id: &str) -> Option<u32> {
    self.count_at(&[
      Step::object(VRC_WORLDS_BY_ID),
      Step::object(world_id),
      Step::number(FAVORITES),
    ])
  }

  /// Users in the world when the document was produced.
  pub fn vrc_world_occupants(&self, world_id: &str) -> Option<u32> {
    self.count_at(&[
      Step::object(VRC_WORLDS_BY_ID),
      Step::object(world_id),
      Step::number(OCCUPANTS),
    ])
  }

  // ==========================================================================
  // Groups and servers
  // ==========================================================================

  /// All entities of a platform, keyed by id.
  pub fn entities(&self, platform: Platform) -> Option<&Map<String, Value>> {
    self.object_at(&[Step::object(platform.collection())])
  }

  pub fn entity(&self, platform: Platform, id: &str) -> Option<&Map<String, Value>> {
    self.object_at(&[Step::object(platform.collection()), Step::object(id)])
  }

  pub fn entity_name(&self, platform: Platform, id: &str) -> Option<&str> {
    self.str_at(&[
      Step::object(platform.collection()),
      Step::object(id),
      Step::string(NAME),
    ])
  }

  /// Member indices of an entity. For servers this only lists members linked
  /// to a VRC user.
  pub fn entity_vrc_users(&self, platform: Platform, id: &str) -> Option<&[Value]> {
    self.array_at(&[
      Step::object(platform.collection()),
      Step::object(id),
      Step::array(VRC_USERS),
    ])
  }

  pub fn entity_roles(&self, platform: Platform, id: &str) -> Option<&Map<String, Value>> {
    self.object_at(&[
      Step::object(platform.collection()),
      Step::object(id),
      Step::object(ROLES),
    ])
  }

  pub fn role(&self, platform: Platform, id: &str, role_id: &str) -> Option<&Map<String, Value>> {
    self.object_at(&[
      Step::object(platform.collection()),
      Step::object(id),
      Step::object(ROLES),
      Step::object(role_id),
    ])
  }

  pub fn role_name(&self, platform: Platform, id: &str, role_id: &str) -> Option<&str> {
    self.str_at(&[
      Step::object(platform.collection()),
      Step::object(id),
      Step::object(ROLES),
      Step::object(role_id),
      Step::string(NAME),
    ])
  }

  /// Raw permission flag of a role. Absent is a failure here, not `false`.
  pub fn role_flag(
    &self,
    platform: Platform,
    id: &str,
    role_id: &str,
    permission: Permission,
  ) -> Option<bool> {
    self.bool_at(&[
      Step::object(platform.collection()),
      Step::object(id),
      Step::object(ROLES),
      Step::object(role_id),
      Step::boolean(permission.flag()),
    ])
  }

  pub fn role_vrc_users(&self, platform: Platform, id: &str, role_id: &str) -> Option<&[Value]> {
    self.array_at(&[
      Step::object(platform.collection()),
      Step::object(id),
      Step::object(ROLES),
      Step::object(role_id),
      Step::array(VRC_USERS),
    ])
  }

  // ==========================================================================
  // VRC Groups
  // ==========================================================================

  pub fn vrc_groups_by_id(&self) -> Option<&Map<String, Value>> {
    self.entities(Platform::VrcGroup)
  }

  pub fn vrc_group(&self, group_id: &str) -> Option<&Map<String, Value>> {
    self.entity(Platform::VrcGroup, group_id)
  }

  pub fn vrc_group_name(&self, group_id: &str) -> Option<&str> {
    self.entity_name(Platform::VrcGroup, group_id)
  }

  pub fn vrc_group_vrc_users(&self, group_id: &str) -> Option<&[Value]> {
    self.entity_vrc_users(Platform::VrcGroup, group_id)
  }

  pub fn vrc_group_roles(&self, group_id: &str) -> Option<&Map<String, Value>> {
    self.entity_roles(Platform::VrcGroup, group_id)
  }

  pub fn vrc_group_role(&self, group_id: &str, role_id: &str) -> Option<&Map<String, Value>> {
    self.role(Platform::VrcGroup, group_id, role_id)
  }

  pub fn vrc_group_role_name(&self, group_id: &str, role_id: &str) -> Option<&str> {
    self.role_name(Platform::VrcGroup, group_id, role_id)
  }

  pub fn vrc_group_role_is_admin(&self, group_id: &str, role_id: &str) -> Option<bool> {
    self.role_flag(Platform::VrcGroup, group_id, role_id, Permission::Admin)
  }

  pub fn vrc_group_role_is_moderator(&self, group_id: &str, role_id: &str) -> Option<bool> {
    self.role_flag(Platform::VrcGroup, group_id, role_id, Permission::Moderator)
  }

  pub fn vrc_group_role_vrc_users(&self, group_id: &str, role_id: &str) -> Option<&[Value]> {
    self.role_vrc_users(Platform::VrcGroup, group_id, role_id)
  }

  // ==========================================================================
  // Discord Servers
  // ==========================================================================

  pub fn discord_servers_by_id(&self) -> Option<&Map<String, Value>> {
    self.entities(Platform::DiscordServer)
  }

  pub fn discord_server(&self, guild_id: &str) -> Option<&Map<String, Value>> {
    self.entity(Platform::DiscordServer, guild_id)
  }

  pub fn discord_server_name(&self, guild_id: &str) -> Option<&str> {
    self.entity_name(Platform::DiscordServer, guild_id)
  }

  /// Every member of the server, linked to a VRC user or not.
  pub fn discord_server_member_count(&self, guild_id: &str) -> Option<u32> {
    self.count_at(&[
      Step::object(DISCORD_SERVERS_BY_ID),
      Step::object(guild_id),
      Step::number(MEMBER_COUNT),
    ])
  }

  pub fn discord_server_vrc_users(&self, guild_id: &str) -> Option<&[Value]> {
    self.entity_vrc_users(Platform::DiscordServer, guild_id)
  }

  pub fn discord_server_roles(&self, guild_id: &str) -> Option<&Map<String, Value>> {
    self.entity_roles(Platform::DiscordServer, guild_id)
  }

  pub fn discord_server_role(&self, guild_id: &str, role_id: &str) -> Option<&Map<String, Value>> {
    self.role(Platform::DiscordServer, guild_id, role_id)
  }

  pub fn discord_server_role_name(&self, guild_id: &str, role_id: &str) -> Option<&str> {
    self.role_name(Platform::DiscordServer, guild_id, role_id)
  }

  pub fn discord_server_role_is_admin(&self, guild_id: &str, role_id: &str) -> Option<bool> {
    self.role_flag(Platform::DiscordServer, guild_id, role_id, Permission::Admin)
  }

  pub fn discord_server_role_is_moderator(&self, guild_id: &str, role_id: &str) -> Option<bool> {
    self.role_flag(Platform::DiscordServer, guild_id, role_id, Permission::Moderator)
  }

  pub fn discord_server_role_vrc_users(&self, guild_id: &str, role_id: &str) -> Option<&[Value]> {
    self.role_vrc_users(Platform::DiscordServer, guild_id, role_id)
  }
}
