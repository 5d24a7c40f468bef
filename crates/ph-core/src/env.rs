//! Environment-sourced configuration, read once at process startup.

/// PostgreSQL connection string. Required for any binary that touches the database.
pub fn db_url() -> String {
    std::env::var("DB_URL").expect("DB_URL must be set")
}

/// HMAC secret used to sign and verify session JWTs.
pub fn jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| String::default())
}

/// Socket address the HTTP/websocket edge binds to.
pub fn bind_addr() -> String {
    std::env::var("BIND_ADDR").expect("BIND_ADDR must be set")
}

/// Grace period, in seconds, a sat-out player keeps their seat before the
/// session sweep removes them. Overridable for tests.
pub fn sit_out_grace_secs() -> u64 {
    std::env::var("SIT_OUT_GRACE_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(360)
}
