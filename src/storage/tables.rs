use redb::TableDefinition;

/// Anime rows: uuid -> AnimeRow (msgpack)
pub const ANIME: TableDefinition<&str, &[u8]> = TableDefinition::new("anime");

/// Photo rows: id -> PhotoRow (msgpack)
pub const PHOTOS: TableDefinition<i64, &[u8]> = TableDefinition::new("photos");

/// Sequence counters, e.g. the next photo id
pub const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

/// Admin allowlist: user id -> unix timestamp the grant was made
pub const ADMINS: TableDefinition<&str, i64> = TableDefinition::new("admins");

/// Accounts: user id -> UserRecord (msgpack)
pub const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Email index: lowercased email -> user id
pub const USER_EMAILS: TableDefinition<&str, &str> = TableDefinition::new("user_emails");

/// Access tokens: token -> TokenRecord (msgpack)
pub const ACCESS_TOKENS: TableDefinition<&str, &[u8]> = TableDefinition::new("access_tokens");

/// Refresh tokens: token -> TokenRecord (msgpack)
pub const REFRESH_TOKENS: TableDefinition<&str, &[u8]> = TableDefinition::new("refresh_tokens");
