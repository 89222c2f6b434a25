use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

pub const PASSKEY_ENV: &str = "BLOGDROP_PASSKEY";

#[derive(Deserialize)]
pub struct Server {
    pub address: String,
    pub port: u16,
    #[serde(default = "default_publish_path")]
    pub publish_path: String,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

#[derive(Deserialize, Default)]
pub struct Paths {
    /// Directory holding the submission form, served on `/` and `/public/`
    pub public_dir: Option<PathBuf>,
}

#[derive(Deserialize)]
pub struct Publish {
    pub passkey: Option<String>,
}

#[derive(Deserialize, Clone)]
pub struct Github {
    pub owner: String,
    pub repo: String,
    pub branch: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_pages_domain")]
    pub pages_domain: String,
    /// Name of the environment variable holding the access token
    #[serde(default = "default_token_env")]
    pub token_env: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone, Debug, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize)]
pub struct Config {
    pub server: Server,
    #[serde(default)]
    pub paths: Paths,
    pub publish: Publish,
    pub github: Github,
    pub log: Option<Log>,
}

fn default_publish_path() -> String {
    "/publish".to_string()
}

fn default_max_body_bytes() -> usize {
    4 * 1024 * 1024
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_pages_domain() -> String {
    "github.io".to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn parse_path(path: PathBuf) -> io::Result<PathBuf> {
    if path.starts_with("${exe_dir}") {
        let cur_exe = env::current_exe()?;
        let exe_dir = cur_exe.parent().unwrap_or(Path::new("."));
        let rest = path.strip_prefix("${exe_dir}")
            .map_err(|e| io::Error::new(ErrorKind::InvalidInput, e.to_string()))?;
        Ok(exe_dir.join(rest))
    } else {
        Ok(path)
    }
}

impl Config {
    /// The passkey, preferring the environment over the file
    pub fn passkey(&self) -> io::Result<String> {
        let passkey = env::var(PASSKEY_ENV).ok()
            .or_else(|| self.publish.passkey.clone())
            .filter(|p| !p.is_empty());
        passkey.ok_or_else(|| io::Error::new(
            ErrorKind::NotFound,
            format!("No passkey configured. Set publish.passkey or {}", PASSKEY_ENV)))
    }
}

impl Github {
    pub fn token(&self) -> io::Result<String> {
        match env::var(&self.token_env) {
            Ok(token) if !token.is_empty() => Ok(token),
            _ => Err(io::Error::new(
                ErrorKind::NotFound,
                format!("GitHub token not found. Please set {}", self.token_env))),
        }
    }
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    if !cfg.server.publish_path.starts_with('/') {
        cfg.server.publish_path = format!("/{}", cfg.server.publish_path);
    }

    cfg.paths.public_dir = cfg.paths.public_dir.map(parse_path).transpose()?;
    if let Some(ref mut log) = cfg.log {
        log.location = log.location.take().map(parse_path).transpose()?;
    }

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}
