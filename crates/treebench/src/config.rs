//! Per-backend connection configuration.
//!
//! The benchmark binary takes no flags and reads no environment; the
//! defaults below match a local docker-compose style setup of the three
//! backends.

/// MySQL connection settings.
#[derive(Debug, Clone)]
pub struct MySqlConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl MySqlConfig {
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            password: password.into(),
            database: database.into(),
        }
    }
}

impl Default for MySqlConfig {
    fn default() -> Self {
        Self::new("localhost", "test", "test", "test")
    }
}

/// Neo4j (Bolt) connection settings.
#[derive(Debug, Clone)]
pub struct Neo4jConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl Neo4jConfig {
    pub fn new(
        uri: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            user: user.into(),
            password: password.into(),
        }
    }
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self::new("neo4j://127.0.0.1:7687", "neo4j", "test")
    }
}

/// ArangoDB HTTP API connection settings.
#[derive(Debug, Clone)]
pub struct ArangoConfig {
    pub url: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ArangoConfig {
    pub fn new(
        url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            user: user.into(),
            password: password.into(),
            database: database.into(),
        }
    }
}

impl Default for ArangoConfig {
    fn default() -> Self {
        Self::new("http://localhost:8529", "root", "test", "test")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let mysql = MySqlConfig::default();
        assert_eq!(mysql.host, "localhost");
        assert_eq!(mysql.database, "test");

        let neo4j = Neo4jConfig::default();
        assert_eq!(neo4j.uri, "neo4j://127.0.0.1:7687");
        assert_eq!(neo4j.user, "neo4j");

        let arango = ArangoConfig::default();
        assert_eq!(arango.url, "http://localhost:8529");
        assert_eq!(arango.user, "root");
    }

    #[test]
    fn test_custom_config() {
        let mysql = MySqlConfig::new("db.internal", "bench", "secret", "trees");
        assert_eq!(mysql.host, "db.internal");
        assert_eq!(mysql.user, "bench");
        assert_eq!(mysql.password, "secret");
        assert_eq!(mysql.database, "trees");
    }
}
