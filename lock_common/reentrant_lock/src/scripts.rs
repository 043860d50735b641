//! Lua scripts for distributed lock operations

/// Lua script for releasing lock
/// Deletes the key only when it exists and holds ARGV[1]; returns the number of deleted keys
pub const RELEASE_LOCK: &str = r#"
    if redis.call('get', KEYS[1]) == ARGV[1] then
        return redis.call('del', KEYS[1])
    end
    return 0
"#;
