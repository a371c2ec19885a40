use std::fmt;

use serde_json::Value;

// Wire field names. These must match the published document exactly.
pub const FILE_TIME_UTC: &str = "fileTimeUtc";
pub const VRC_USER_DISPLAY_NAMES: &str = "vrcUserDisplayNames";
pub const VRC_WORLDS_BY_ID: &str = "vrcWorldsById";
pub const VRC_GROUPS_BY_ID: &str = "vrcGroupsById";
pub const DISCORD_SERVERS_BY_ID: &str = "discordServersById";
pub const NAME: &str = "name";
pub const VISITS: &str = "visits";
pub const FAVORITES: &str = "favorites";
pub const OCCUPANTS: &str = "occupants";
pub const MEMBER_COUNT: &str = "memberCount";
pub const VRC_USERS: &str = "vrcUsers";
pub const ROLES: &str = "roles";
pub const IS_ADMIN: &str = "isAdmin";
pub const IS_MODERATOR: &str = "isModerator";

/// The kind of a node in the parsed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
  Null,
  Boolean,
  Number,
  String,
  Array,
  Object,
}

impl Kind {
  pub fn of(node: &Value) -> Self {
    match node {
      Value::Null => Kind::Null,
      Value::Bool(_) => Kind::Boolean,
      Value::Number(_) => Kind::Number,
      Value::String(_) => Kind::String,
      Value::Array(_) => Kind::Array,
      Value::Object(_) => Kind::Object,
    }
  }
}

impl fmt::Display for Kind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Kind::Null => "null",
      Kind::Boolean => "boolean",
      Kind::Number => "number",
      Kind::String => "string",
      Kind::Array => "array",
      Kind::Object => "object",
    };
    f.write_str(name)
  }
}

/// Which platform an entity id belongs to.
///
/// VRC groups and Discord servers share the same role shape, so role lookups
/// and permission scans are written once against this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
  VrcGroup,
  DiscordServer,
}

impl Platform {
  /// Root field holding this platform's entities by id.
  pub fn collection(self) -> &'static str {
    match self {
      Platform::VrcGroup => VRC_GROUPS_BY_ID,
      Platform::DiscordServer => DISCORD_SERVERS_BY_ID,
    }
  }
}

/// A permission flag carried by roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
  Admin,
  Moderator,
}

impl Permission {
  /// Role field holding this flag.
  pub fn flag(self) -> &'static str {
    match self {
      Permission::Admin => IS_ADMIN,
      Permission::Moderator => IS_MODERATOR,
    }
  }
}
