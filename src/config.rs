//! Runtime configuration: command-line flags, then environment overrides.

use std::env;

pub const DEFAULT_DB_PATH: &str = "data/car_garage.db";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: &str = "0.0.0.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite database file
    pub db_path: String,
    pub port: u16,
    pub host: String,
    /// Use an in-memory store instead of `db_path`
    pub in_memory: bool,
    /// Insert the sample inventory into an empty table
    pub seed: bool,
    pub show_help: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            port: DEFAULT_PORT,
            host: DEFAULT_HOST.to_string(),
            in_memory: false,
            seed: true,
            show_help: false,
        }
    }
}

impl Config {
    /// Reads the process arguments and environment
    pub fn from_env() -> Self {
        let args: Vec<String> = env::args().skip(1).collect();
        let mut config = Self::from_args(&args);
        config.apply_env(|key| env::var(key).ok());
        config
    }

    /// Parses flags. Unknown flags are ignored; a flag missing its value
    /// keeps the default.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        let mut config = Config::default();
        let mut iter = args.iter().map(AsRef::as_ref);

        while let Some(arg) = iter.next() {
            match arg {
                "--db" | "-d" => {
                    if let Some(path) = iter.next() {
                        config.db_path = path.to_string();
                    }
                }
                "--port" | "-p" => {
                    if let Some(port) = iter.next() {
                        config.port = port.parse().unwrap_or(config.port);
                    }
                }
                "--host" | "-h" => {
                    if let Some(host) = iter.next() {
                        config.host = host.to_string();
                    }
                }
                "--memory" | "-m" => config.in_memory = true,
                "--no-seed" => config.seed = false,
                "--help" => config.show_help = true,
                _ => {}
            }
        }

        config
    }

    /// Environment variables override flags
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.port = port.parse().unwrap_or(self.port);
        }
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(path) = lookup("CAR_GARAGE_DB") {
            self.db_path = path;
        }
        if lookup("CAR_GARAGE_MEMORY").is_some() {
            self.in_memory = true;
        }
        if lookup("CAR_GARAGE_NO_SEED").is_some() {
            self.seed = false;
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub const HELP: &str = r#"
car-garage - dealership inventory server

USAGE:
    car-garage [OPTIONS]

OPTIONS:
    -d, --db <PATH>      Database file path [default: data/car_garage.db]
    -p, --port <PORT>    Server port [default: 3000]
    -h, --host <HOST>    Host to bind to [default: 0.0.0.0]
    -m, --memory         Use an in-memory database
        --no-seed        Do not insert sample cars into an empty table
        --help           Print this help message

ENVIRONMENT VARIABLES (also read from .env):
    PORT                 Server port
    HOST                 Host to bind to
    CAR_GARAGE_DB        Database file path
    CAR_GARAGE_MEMORY    Set to use an in-memory database
    CAR_GARAGE_NO_SEED   Set to skip sample data
    RUST_LOG             Log filter [default: info,tower_http=info]

API ENDPOINTS:
    GET    /api/cars         List cars (q, status, sortBy, sortDir)
    GET    /api/cars/:id     Get one car
    POST   /api/cars         Create a car
    PUT    /api/cars/:id     Update a car
    DELETE /api/cars/:id     Delete a car
    GET    /health           Health check
    GET    /                 Web client
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::from_args::<&str>(&[]);
        assert_eq!(config, Config::default());
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert!(config.seed);
    }

    #[test]
    fn test_flags() {
        let config = Config::from_args(&[
            "--db", "/tmp/cars.db", "-p", "8080", "--host", "127.0.0.1", "--no-seed", "--memory",
        ]);
        assert_eq!(config.db_path, "/tmp/cars.db");
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert!(!config.seed);
        assert!(config.in_memory);
    }

    #[test]
    fn test_bad_port_keeps_previous() {
        let config = Config::from_args(&["--port", "eighty"]);
        assert_eq!(config.port, DEFAULT_PORT);

        let config = Config::from_args(&["--port"]);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_env_overrides_flags() {
        let env: HashMap<&str, &str> = [("PORT", "4000"), ("CAR_GARAGE_DB", "other.db"), ("CAR_GARAGE_NO_SEED", "1")]
            .into_iter()
            .collect();

        let mut config = Config::from_args(&["--port", "8080", "--db", "cars.db"]);
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.port, 4000);
        assert_eq!(config.db_path, "other.db");
        assert!(!config.seed);
        assert!(!config.in_memory);
    }
}
