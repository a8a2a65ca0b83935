use std::env;
use std::io;

const DEFAULT_MAIL_FROM: &str = "noreply@taskmate.local";

pub struct Config {
    /// PostgreSQL connection string. `None` runs the server on the in-memory store.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    /// SendGrid API key. Without it outgoing emails are only logged.
    pub sendgrid_api_key: Option<String>,
    pub mail_from: String,
}

impl Config {
    pub fn from_env() -> io::Result<Self> {
        let jwt_secret = non_empty_var("JWT_SECRET")
            .ok_or_else(|| invalid_config("JWT_SECRET must be set"))?;
        let server_port = match non_empty_var("SERVER_PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| invalid_config("SERVER_PORT must be a number"))?,
            None => 8080,
        };

        Ok(Self {
            database_url: non_empty_var("DATABASE_URL"),
            server_port,
            server_host: non_empty_var("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret,
            sendgrid_api_key: non_empty_var("SENDGRID_API_KEY"),
            mail_from: non_empty_var("MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_config(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg.to_string())
}
