use crate::config::{
    parse_extensions, parse_seconds, OutputFormat, RunConfig, Technique, DEFAULT_LOG_FILE,
    DEFAULT_USER_AGENT,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Fetch subdomains from crt.sh",
    long_about = None,
    after_help = "Example:\n  subhunter -d google.com"
)]
pub struct Cli {
    #[arg(short, long, help = "Target domain to fetch subdomains from")]
    domain: String,

    #[arg(short, long, help = "Enable recursive search for subdomains")]
    recursive: bool,

    #[arg(short, long, help = "Include wildcard subdomains in output")]
    wildcard: bool,

    #[arg(short, long, help = "Output file to save subdomains")]
    output: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    verbose: bool,

    #[arg(short, long, help = "Exclude wildcard subdomains")]
    exclude_wildcards: bool,

    #[arg(long, default_value = DEFAULT_USER_AGENT, help = "Custom User-Agent for requests")]
    user_agent: String,

    #[arg(long, default_value = "0.0", value_parser = parse_seconds, help = "Delay between requests in seconds")]
    rate_limit: Duration,

    #[arg(long, default_value = "25.0", value_parser = parse_seconds, help = "Timeout for requests in seconds")]
    timeout: Duration,

    #[arg(long = "log", default_value = DEFAULT_LOG_FILE, help = "Log file to save logs")]
    log_file: PathBuf,

    #[arg(short = 'x', long, help = "Filter by domain extensions (comma-separated; a leading dot is ignored and blank entries are skipped)")]
    extensions: Option<String>,

    #[arg(short, long, value_enum, help = "Output format")]
    format: Option<OutputFormat>,

    #[arg(short, long, help = "Enable interactive mode (not implemented)")]
    interactive: bool,

    #[arg(short, long, value_enum, default_value_t = Technique::Crtsh, help = "Subdomain enumeration technique")]
    technique: Technique,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl From<Cli> for RunConfig {
    fn from(cli: Cli) -> Self {
        RunConfig {
            domain: cli.domain,
            recursive: cli.recursive,
            include_wildcards: cli.wildcard,
            exclude_wildcards: cli.exclude_wildcards,
            output: cli.output,
            verbose: cli.verbose,
            user_agent: cli.user_agent,
            rate_limit: cli.rate_limit,
            timeout: cli.timeout,
            log_file: cli.log_file,
            extensions: cli
                .extensions
                .as_deref()
                .map(parse_extensions)
                .unwrap_or_default(),
            format: cli.format.unwrap_or_default(),
            interactive: cli.interactive,
            technique: cli.technique,
        }
    }
}
