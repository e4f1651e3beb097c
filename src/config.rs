use std::io::ErrorKind;
use std::path::PathBuf;
use std::{env, fs, io};

use serde::Deserialize;

pub const CFG_FILE_NAME: &str = "penned.toml";

/// Overrides the grammar endpoint without touching the config file, e.g. to
/// point a deployment at a self-hosted LanguageTool.
pub const GRAMMAR_ENDPOINT_ENV: &str = "LANGUAGETOOL_API";

const DEFAULT_GRAMMAR_ENDPOINT: &str = "https://api.languagetool.org/v2/check";
const DEFAULT_GRAMMAR_LANGUAGE: &str = "auto";
const DEFAULT_DEBOUNCE_MS: u64 = 1500;

#[derive(Deserialize)]
pub struct Site {
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
}

impl Site {
    pub fn author(&self) -> String {
        self.author.clone().unwrap_or_else(whoami::realname)
    }
}

#[derive(Deserialize)]
pub struct Paths {
    pub template_dir: PathBuf,
    pub public_dir: PathBuf,
    pub posts_dir: PathBuf,
}

#[derive(Deserialize)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize)]
pub struct Grammar {
    pub endpoint: Option<String>,
    pub language: Option<String>,
    pub debounce_ms: Option<u64>,
}

/// Grammar options with every gap filled in, ready to hand to the checker.
#[derive(Clone)]
pub struct GrammarSettings {
    pub endpoint: String,
    pub language: String,
    pub debounce_ms: u64,
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize)]
pub struct Feed {
    pub title: String,
    pub site_url: String,
    pub description: String,
}

#[derive(Deserialize)]
pub struct Config {
    pub site: Site,
    pub paths: Paths,
    pub blog: Server,
    pub writer: Server,
    pub grammar: Option<Grammar>,
    pub log: Option<Log>,
    pub feed: Option<Feed>,
}

impl Config {
    /// Missing `[grammar]` keys fall back to the public LanguageTool API,
    /// auto language detection and the stock debounce window.
    pub fn grammar_settings(&self) -> GrammarSettings {
        resolve_grammar(self.grammar.as_ref(), env::var(GRAMMAR_ENDPOINT_ENV).ok())
    }
}

fn resolve_grammar(grammar: Option<&Grammar>, env_endpoint: Option<String>) -> GrammarSettings {
    let endpoint = env_endpoint
        .filter(|endpoint| !endpoint.is_empty())
        .or_else(|| grammar.and_then(|g| g.endpoint.clone()))
        .unwrap_or_else(|| DEFAULT_GRAMMAR_ENDPOINT.to_string());
    let language = grammar
        .and_then(|g| g.language.clone())
        .unwrap_or_else(|| DEFAULT_GRAMMAR_LANGUAGE.to_string());
    let debounce_ms = grammar
        .and_then(|g| g.debounce_ms)
        .unwrap_or(DEFAULT_DEBOUNCE_MS);

    GrammarSettings {
        endpoint,
        language,
        debounce_ms,
    }
}

fn parse_path(path: PathBuf) -> PathBuf {
    if path.starts_with("${exe_dir}") {
        let cur_exe = env::current_exe().unwrap();
        let exe_dir = cur_exe.parent().unwrap().to_str().unwrap();
        let str_path = path.to_str().unwrap();
        PathBuf::from(str_path.replace("${exe_dir}", exe_dir))
    } else {
        path
    }
}

pub fn read_config(cfg_path: &PathBuf) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => {
            return Err(io::Error::new(
                e.kind(),
                format!(
                    "Error opening configuration file {}: {}",
                    cfg_path.to_str().unwrap(),
                    e
                ),
            ))
        }
    };

    let mut cfg: Config = match toml::from_str::<Config>(cfg_content.as_str()) {
        Ok(cfg) => cfg,
        Err(e) => {
            return Err(io::Error::new(
                ErrorKind::InvalidData,
                format!("Error parsing configuration file: {}", e),
            ))
        }
    };

    cfg.paths = Paths {
        template_dir: parse_path(cfg.paths.template_dir),
        public_dir: parse_path(cfg.paths.public_dir),
        posts_dir: parse_path(cfg.paths.posts_dir),
    };

    Ok(cfg)
}

/// Both applications look for `penned.toml` next to the executable, then in
/// the current directory, then in the user config directory.
pub fn get_config_path() -> Option<PathBuf> {
    let exe_path = env::current_exe().unwrap();
    let exe_dir = exe_path.parent().unwrap();
    let cur_dir = env::current_dir().unwrap();

    if exe_dir.join(CFG_FILE_NAME).exists() {
        return Some(exe_dir.join(CFG_FILE_NAME));
    }

    if cur_dir.join(CFG_FILE_NAME).exists() {
        return Some(cur_dir.join(CFG_FILE_NAME));
    }

    if let Some(cfg_dir) = dirs::config_dir() {
        if cfg_dir.join(CFG_FILE_NAME).exists() {
            return Some(cfg_dir.join(CFG_FILE_NAME));
        }
    }

    None
}

const CONFIG_SAMPLE: &str = r#"[site]
title = "My Writing"
description = "Notes and essays"
# Shown as the feed author. Defaults to the account's real name.
#author = "Your Name"

# For the file locations, if you want them to be relative to the executable
# directory use ${exe_dir}/location
[paths]
template_dir = "res/template"
public_dir = "res/public"
posts_dir = "posts"

[blog]
address = "0.0.0.0"
port = 8001

[writer]
address = "127.0.0.1"
port = 8002

# Grammar checking. Point endpoint at a self-hosted LanguageTool to keep the
# text local, e.g. http://localhost:8010/v2/check
[grammar]
language = "auto"
debounce_ms = 1500

#[log]
#level = "Info"
#log_to_console = true
#location = "log/penned.log"

#[feed]
#title = "My Writing"
#site_url = "https://example.com"
#description = "Notes and essays"
"#;

pub fn write_sample_cfg(file_path: &PathBuf) -> io::Result<()> {
    fs::write(file_path, CONFIG_SAMPLE)
}
