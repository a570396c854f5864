#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub app: App,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

/// Application instance scope. Every collection is namespaced under this id
/// before the owner id, mirroring the two-level tenant isolation of the
/// original document store paths.
#[derive(Debug, Clone)]
pub struct App {
    pub id: String,
}

#[derive(Debug, Clone)]
pub struct AuthSecrets {
    pub custom_token_secret: String,
    pub session_secret: String,
    pub session_ttl_seconds: u64,
}
