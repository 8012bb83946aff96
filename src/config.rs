use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_TIMEOUT_SECONDS: f64 = 25.0;
pub const DEFAULT_LOG_FILE: &str = "subhunter.log";

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    #[value(help = "One subdomain per line, sorted")]
    Csv,
    #[value(help = "A {\"subdomains\": [...]} object")]
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Technique {
    #[default]
    #[value(help = "Passive lookup in crt.sh certificate transparency logs")]
    Crtsh,
    #[value(help = "DNS enumeration (not implemented)")]
    Dns,
    #[value(help = "Wordlist brute force (not implemented)")]
    Bruteforce,
}

impl Technique {
    pub fn is_implemented(self) -> bool {
        matches!(self, Technique::Crtsh)
    }
}

/// Options for one run. Built once in `main` and only ever borrowed.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub domain: String,
    pub recursive: bool,
    pub include_wildcards: bool,
    pub exclude_wildcards: bool,
    pub output: Option<PathBuf>,
    pub verbose: bool,
    pub user_agent: String,
    pub rate_limit: Duration,
    pub timeout: Duration,
    pub log_file: PathBuf,
    pub extensions: Vec<String>,
    pub format: OutputFormat,
    pub interactive: bool,
    pub technique: Technique,
}

impl RunConfig {
    pub fn for_domain(domain: &str) -> Self {
        RunConfig {
            domain: domain.to_string(),
            recursive: false,
            include_wildcards: false,
            exclude_wildcards: false,
            output: None,
            verbose: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            rate_limit: Duration::ZERO,
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECONDS),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            extensions: Vec::new(),
            format: OutputFormat::default(),
            interactive: false,
            technique: Technique::default(),
        }
    }
}

/// Splits a comma separated extension list such as `"com, .org"`.
/// Blank entries are dropped, so an all-blank list disables filtering.
pub fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|extension| extension.trim())
        .map(|extension| extension.strip_prefix('.').unwrap_or(extension))
        .filter(|extension| !extension.is_empty())
        .map(|extension| extension.to_string())
        .collect()
}

/// Seconds as given on the command line; must be finite and not negative.
pub fn parse_seconds(raw: &str) -> Result<Duration, String> {
    let seconds: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("`{}` is not a number of seconds", raw))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(format!("`{}` must be a non-negative number of seconds", raw));
    }

    Duration::try_from_secs_f64(seconds)
        .map_err(|_| format!("`{}` is too many seconds", raw))
}
