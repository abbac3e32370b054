use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub upload_dir: String,
    pub assets_dir: String,
    pub public_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("ACCESS_TOKEN_SECRET")?,
            ttl_hours: std::env::var("ACCESS_TOKEN_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(72),
        };
        Ok(Self {
            database_url,
            jwt,
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()),
            assets_dir: std::env::var("ASSETS_DIR").unwrap_or_else(|_| "assets".into()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".into()),
        })
    }

    /// Image reference used when an edit leaves the story without one.
    pub fn placeholder_image_url(&self) -> String {
        format!(
            "{}/assets/placeholder.png",
            self.public_base_url.trim_end_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_url_is_under_assets() {
        let config = AppConfig {
            database_url: "postgres://localhost/db".into(),
            jwt: JwtConfig {
                secret: "s".into(),
                ttl_hours: 72,
            },
            upload_dir: "uploads".into(),
            assets_dir: "assets".into(),
            public_base_url: "http://localhost:8000/".into(),
        };
        assert_eq!(
            config.placeholder_image_url(),
            "http://localhost:8000/assets/placeholder.png"
        );
    }
}
