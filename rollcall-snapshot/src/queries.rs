//! Membership and permission queries built on the accessors.
//!
//! Users appear everywhere as positions in `vrcUserDisplayNames`. A query by
//! display name first finds that position, then looks for it in the relevant
//! `vrcUsers` list. An unknown name and a non-member give the same answer.

use serde_json::Value;
use tracing::trace;

use crate::Snapshot;
use crate::error::LookupError;
use crate::models::{Permission, Platform};
use crate::path::as_index;

fn contains_index(vrc_users: &[Value], index: usize) -> bool {
  vrc_users.iter().any(|node| as_index(node) == Some(index))
}

fn name_at(table: &[Value], index: usize) -> Result<&str, LookupError> {
  let slot = table.get(index).ok_or(LookupError::IndexOutOfRange {
    index,
    len: table.len(),
  })?;
  slot.as_str().ok_or(LookupError::NameNotAString(index))
}

impl Snapshot {
  // ==========================================================================
  // Identity
  // ==========================================================================

  /// Position of `name` in the display-name table. Duplicate names resolve to
  /// the first occurrence.
  pub fn vrc_user_index(&self, name: &str) -> Option<usize> {
    let index = self
      .vrc_user_display_names()?
      .iter()
      .position(|slot| slot.as_str() == Some(name));
    if index.is_none() {
      trace!(error = %LookupError::UnknownUser, name, "no index for display name");
    }
    index
  }

  /// Display name stored at `index`, if it is in range and holds a string.
  pub fn vrc_user_display_name(&self, index: usize) -> Option<&str> {
    let table = self.vrc_user_display_names()?;
    name_at(table, index)
      .inspect_err(|err| trace!(%err, "display name lookup failed"))
      .ok()
  }

  /// Resolve a `vrcUsers` list to display names, keeping list order.
  ///
  /// All or nothing: one entry that is not an index, is out of range, or
  /// points at a non-string slot fails the whole batch.
  pub fn display_names_from_indexes(&self, vrc_users: &[Value]) -> Option<Vec<&str>> {
    let table = self.vrc_user_display_names()?;
    vrc_users
      .iter()
      .enumerate()
      .map(|(slot, node)| {
        let index = as_index(node).ok_or(LookupError::NotAnIndex(slot))?;
        name_at(table, index)
      })
      .collect::<Result<Vec<_>, _>>()
      .inspect_err(|err| trace!(%err, "display name batch rejected"))
      .ok()
  }

  // ==========================================================================
  // Platform-generic queries
  // ==========================================================================

  pub fn is_member(&self, platform: Platform, name: &str, id: &str) -> bool {
    let Some(index) = self.vrc_user_index(name) else {
      return false;
    };
    self
      .entity_vrc_users(platform, id)
      .is_some_and(|vrc_users| contains_index(vrc_users, index))
  }

  pub fn has_role(&self, platform: Platform, name: &str, id: &str, role_id: &str) -> bool {
    let Some(index) = self.vrc_user_index(name) else {
      return false;
    };
    self
      .role_vrc_users(platform, id, role_id)
      .is_some_and(|vrc_users| contains_index(vrc_users, index))
  }

  /// Whether `name` holds any role in the entity flagged with `permission`.
  ///
  /// Roles without the flag count as unflagged. A flagged role whose member
  /// list cannot be read ends the scan with `false`, even if a later role
  /// would have matched.
  pub fn holds_permission(
    &self,
    platform: Platform,
    permission: Permission,
    name: &str,
    id: &str,
  ) -> bool {
    let (Some(index), Some(roles)) = (self.vrc_user_index(name), self.entity_roles(platform, id))
    else {
      return false;
    };

    for role_id in roles.keys() {
      let flagged = self
        .role_flag(platform, id, role_id, permission)
        .unwrap_or(false);
      if !flagged {
        continue;
      }

      let Some(vrc_users) = self.role_vrc_users(platform, id, role_id) else {
        return false;
      };
      if contains_index(vrc_users, index) {
        return true;
      }
    }

    false
  }

  /// [`Self::holds_permission`] over every group, then every server.
  ///
  /// Both collections must resolve before either is scanned.
  pub fn holds_permission_anywhere(&self, permission: Permission, name: &str) -> bool {
    let (Some(groups), Some(servers)) = (self.vrc_groups_by_id(), self.discord_servers_by_id())
    else {
      return false;
    };

    groups
      .keys()
      .any(|id| self.holds_permission(Platform::VrcGroup, permission, name, id))
      || servers
        .keys()
        .any(|id| self.holds_permission(Platform::DiscordServer, permission, name, id))
  }

  pub fn member_display_names(&self, platform: Platform, id: &str) -> Option<Vec<&str>> {
    self.display_names_from_indexes(self.entity_vrc_users(platform, id)?)
  }

  pub fn role_member_display_names(
    &self,
    platform: Platform,
    id: &str,
    role_id: &str,
  ) -> Option<Vec<&str>> {
    self.display_names_from_indexes(self.role_vrc_users(platform, id, role_id)?)
  }

  /// Number of entries in the entity's `vrcUsers` list.
  pub fn linked_member_count(&self, platform: Platform, id: &str) -> Option<usize> {
    self.entity_vrc_users(platform, id).map(<[Value]>::len)
  }

  // ==========================================================================
  // VRC Groups
  // ==========================================================================

  pub fn is_vrc_group_member(&self, name: &str, group_id: &str) -> bool {
    self.is_member(Platform::VrcGroup, name, group_id)
  }

  pub fn has_vrc_group_role(&self, name: &str, group_id: &str, role_id: &str) -> bool {
    self.has_role(Platform::VrcGroup, name, group_id, role_id)
  }

  pub fn is_vrc_group_admin(&self, name: &str, group_id: &str) -> bool {
    self.holds_permission(Platform::VrcGroup, Permission::Admin, name, group_id)
  }

  /// Whether `name` has any role with instance moderation rights in the group.
  pub fn is_vrc_group_moderator(&self, name: &str, group_id: &str) -> bool {
    self.holds_permission(Platform::VrcGroup, Permission::Moderator, name, group_id)
  }

  pub fn vrc_group_member_count(&self, group_id: &str) -> Option<usize> {
    self.linked_member_count(Platform::VrcGroup, group_id)
  }

  pub fn vrc_group_member_display_names(&self, group_id: &str) -> Option<Vec<&str>> {
    self.member_display_names(Platform::VrcGroup, group_id)
  }

  pub fn vrc_group_role_member_display_names(
    &self,
    group_id: &str,
    role_id: &str,
  ) -> Option<Vec<&str>> {
    self.role_member_display_names(Platform::VrcGroup, group_id, role_id)
  }

  // ==========================================================================
  // Discord Servers
  // ==========================================================================

  pub fn is_discord_member(&self, name: &str, guild_id: &str) -> bool {
    self.is_member(Platform::DiscordServer, name, guild_id)
  }

  pub fn has_discord_role(&self, name: &str, guild_id: &str, role_id: &str) -> bool {
    self.has_role(Platform::DiscordServer, name, guild_id, role_id)
  }

  pub fn is_discord_admin(&self, name: &str, guild_id: &str) -> bool {
    self.holds_permission(Platform::DiscordServer, Permission::Admin, name, guild_id)
  }

  pub fn is_discord_moderator(&self, name: &str, guild_id: &str) -> bool {
    self.holds_permission(Platform::DiscordServer, Permission::Moderator, name, guild_id)
  }

  /// Members linked to a VRC user. Unlike
  /// [`Self::discord_server_member_count`], unlinked members are not counted.
  pub fn discord_vrc_linked_member_count(&self, guild_id: &str) -> Option<usize> {
    self.linked_member_count(Platform::DiscordServer, guild_id)
  }

  pub fn discord_member_display_names(&self, guild_id: &str) -> Option<Vec<&str>> {
    self.member_display_names(Platform::DiscordServer, guild_id)
  }

  pub fn discord_role_member_display_names(
    &self,
    guild_id: &str,
    role_id: &str,
  ) -> Option<Vec<&str>> {
    self.role_member_display_names(Platform::DiscordServer, guild_id, role_id)
  }

  // ==========================================================================
  // Anywhere
  // ==========================================================================

  pub fn is_admin_anywhere(&self, name: &str) -> bool {
    self.holds_permission_anywhere(Permission::Admin, name)
  }

  pub fn is_moderator_anywhere(&self, name: &str) -> bool {
    self.holds_permission_anywhere(Permission::Moderator, name)
  }
}
