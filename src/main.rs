use anyhow::Context;
use colored::Colorize;
use subhunter::banner::display_banner;
use subhunter::cli::Cli;
use subhunter::config::RunConfig;
use subhunter::logging;
use subhunter::modules::crt_sh::CrtShClient;
use subhunter::modules::report::{print_subdomains, save_subdomains};
use subhunter::modules::subdomain_extractor::SubdomainExtractor;
use tracing::{error, info, warn};

fn main() {
    display_banner();
    let config = RunConfig::from(Cli::parse_args());
    if let Err(err) = run(&config) {
        eprintln!("{}", format!("Error: {:#}", err).red());
    }
}

fn run(config: &RunConfig) -> anyhow::Result<()> {
    let logger = logging::build(&config.log_file, config.verbose)?;
    tracing::dispatcher::with_default(&logger, || hunt(config))
}

fn hunt(config: &RunConfig) -> anyhow::Result<()> {
    if !config.technique.is_implemented() {
        warn!(
            "Technique {:?} is not implemented yet, falling back to the crt.sh lookup",
            config.technique
        );
    }
    if config.interactive {
        warn!("Interactive mode is not implemented yet, running non-interactively");
    }

    let client = CrtShClient::build(config).context("cannot build the HTTP client")?;
    let subdomains = SubdomainExtractor::new(&client, config).run();
    info!("Found {} subdomains for {}", subdomains.len(), config.domain);
    print_subdomains(&subdomains);

    if let Some(output) = &config.output {
        if let Err(err) = save_subdomains(&subdomains, output, config.format) {
            error!("Error saving to file: {}", err);
            eprintln!("{}", format!("Error saving to file: {}", err).red());
        }
    }

    Ok(())
}
