use crate::config::RunConfig;
use crate::modules::crt_sh::{CertificateRecord, CertificateSource};
use std::collections::HashSet;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostnameKind {
    Concrete,
    Wildcard,
}

pub fn classify(hostname: &str) -> HostnameKind {
    if hostname.contains('*') {
        HostnameKind::Wildcard
    } else {
        HostnameKind::Concrete
    }
}

fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c'..='\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Every line of every record's `name_value`, trimmed. No deduplication.
/// `\r\n` leaves an empty piece behind, which `SubdomainSet::insert` ignores.
pub fn extract(records: &[CertificateRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.name_value.as_deref())
        .flat_map(|name_value| name_value.split(is_line_boundary))
        .map(|line| line.trim().to_string())
        .collect()
}

/// crt.sh expects `%` as its wildcard, itself percent-encoded in the query.
pub fn encode_wildcard(hostname: &str) -> String {
    hostname.replace('*', "%25")
}

/// Names collected so far, kept apart by kind until the final merge.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SubdomainSet {
    pub concrete: HashSet<String>,
    pub wildcard: HashSet<String>,
}

impl SubdomainSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, hostname: String) {
        if hostname.is_empty() {
            return;
        }
        match classify(&hostname) {
            HostnameKind::Concrete => self.concrete.insert(hostname),
            HostnameKind::Wildcard => self.wildcard.insert(hostname),
        };
    }

    pub fn extend<I: IntoIterator<Item = String>>(&mut self, hostnames: I) {
        for hostname in hostnames {
            self.insert(hostname);
        }
    }

    /// Union when wildcards are included, then subtraction when they are
    /// excluded, so exclusion always wins.
    pub fn merge(self, include_wildcards: bool, exclude_wildcards: bool) -> HashSet<String> {
        let mut subdomains = self.concrete;
        if include_wildcards {
            subdomains.extend(self.wildcard.iter().cloned());
        }
        if exclude_wildcards {
            subdomains.retain(|subdomain| !self.wildcard.contains(subdomain));
        }

        subdomains
    }
}

/// Keeps the names ending in `.<extension>` for one of `extensions`.
/// An empty list keeps everything.
pub fn filter_extensions(subdomains: HashSet<String>, extensions: &[String]) -> HashSet<String> {
    if extensions.is_empty() {
        return subdomains;
    }
    let suffixes: Vec<String> = extensions
        .iter()
        .map(|extension| format!(".{}", extension.trim()))
        .collect();

    subdomains
        .into_iter()
        .filter(|subdomain| suffixes.iter().any(|suffix| subdomain.ends_with(suffix)))
        .collect()
}

pub struct SubdomainExtractor<'a, S: CertificateSource> {
    source: &'a S,
    config: &'a RunConfig,
    subdomains: SubdomainSet,
}

impl<'a, S: CertificateSource> SubdomainExtractor<'a, S> {
    pub fn new(source: &'a S, config: &'a RunConfig) -> Self {
        SubdomainExtractor {
            source,
            config,
            subdomains: SubdomainSet::new(),
        }
    }

    /// Returns `false` when the query produced nothing usable.
    fn collect(&mut self, query: &str) -> bool {
        match self.source.fetch(query) {
            Ok(records) => {
                self.subdomains.extend(extract(&records));
                true
            }
            Err(err) => {
                error!("Error fetching data from crt.sh for {}: {}", query, err);
                false
            }
        }
    }

    /// Fetches, optionally expands wildcards one level deep, then merges and
    /// filters according to the run's options.
    pub fn run(mut self) -> HashSet<String> {
        let config = self.config;
        if !self.collect(&config.domain) {
            return HashSet::new();
        }

        if config.recursive {
            let mut wildcards: Vec<String> = self.subdomains.wildcard.iter().cloned().collect();
            wildcards.sort();
            for wildcard in wildcards {
                debug!("Expanding {}", wildcard);
                self.collect(&encode_wildcard(&wildcard));
            }
        }

        let subdomains = self
            .subdomains
            .merge(config.include_wildcards, config.exclude_wildcards);

        filter_extensions(subdomains, &config.extensions)
    }
}
