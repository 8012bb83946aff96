use crate::config::RunConfig;
use crate::error::FetchError;
use crate::modules::retry::RetryPolicy;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde::Deserialize;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

pub const CRT_SH_URL: &str = "https://crt.sh";

/// One certificate as listed by crt.sh. `name_value` holds every name on the
/// certificate, one per line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CertificateRecord {
    //issuer_ca_id: u32,
    //issuer_name: String,
    //common_name: String,
    pub name_value: Option<String>,
    //id: u64,
    //entry_timestamp: String,
    //not_before: String,
    //not_after: String,
    //serial_number: String
}

impl CertificateRecord {
    pub fn new(name_value: &str) -> Self {
        CertificateRecord {
            name_value: Some(name_value.to_string()),
        }
    }
}

/// Somewhere certificate records can be looked up by query string.
pub trait CertificateSource {
    fn fetch(&self, query: &str) -> Result<Vec<CertificateRecord>, FetchError>;
}

/// Decodes a crt.sh JSON answer. The body has to be an array; entries inside
/// it that are not certificate objects are logged and skipped.
pub fn parse_records(body: &str) -> Result<Vec<CertificateRecord>, serde_json::Error> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(body)?;
    let records = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            match serde_json::from_value::<CertificateRecord>(entry) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!("Skipping malformed crt.sh entry #{}: {}", index, err);
                    None
                }
            }
        })
        .collect();

    Ok(records)
}

pub struct CrtShClient {
    web_requester: Client,
    base_url: String,
    retry: RetryPolicy,
    rate_limit: Duration,
}

impl CrtShClient {
    pub fn build(config: &RunConfig) -> Result<CrtShClient, reqwest::Error> {
        let web_requester = Client::builder()
            .redirect(Policy::limited(4))
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;

        Ok(CrtShClient {
            web_requester,
            base_url: CRT_SH_URL.to_string(),
            retry: RetryPolicy::default(),
            rate_limit: config.rate_limit,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// `query` is embedded as is, so a wildcard must already be encoded.
    pub fn query_url(&self, query: &str) -> String {
        format!("{}/?q={}&output=json", self.base_url, query)
    }

    fn get_body(&self, url: &str) -> Result<String, FetchError> {
        let response = self.web_requester.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        Ok(response.text()?)
    }

    fn is_retryable(&self, err: &FetchError) -> bool {
        match err {
            FetchError::Request(err) => err.is_connect() || err.is_timeout(),
            FetchError::Status(status) => self.retry.is_retryable_status(*status),
            FetchError::Decode(_) => false,
        }
    }
}

impl CertificateSource for CrtShClient {
    fn fetch(&self, query: &str) -> Result<Vec<CertificateRecord>, FetchError> {
        let url = self.query_url(query);
        let body = self
            .retry
            .run(|_| self.get_body(&url), |err| self.is_retryable(err))?;
        debug!("Fetched data for {}", query);
        thread::sleep(self.rate_limit);
        let records = parse_records(&body)?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;
    use std::time::Instant;

    /// Answers one connection per canned response and hands back the
    /// request heads it saw.
    fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut head = String::new();
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                        break;
                    }
                    head.push_str(&line);
                }
                requests.push(head);
                write!(
                    stream,
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                )
                .unwrap();
            }
            requests
        });

        (base_url, handle)
    }

    fn client(base_url: &str, retry: RetryPolicy) -> CrtShClient {
        rate_limited_client(base_url, retry, Duration::ZERO)
    }

    fn rate_limited_client(base_url: &str, retry: RetryPolicy, rate_limit: Duration) -> CrtShClient {
        let mut config = RunConfig::for_domain("example.com");
        config.rate_limit = rate_limit;
        config.user_agent = "subhunter-test".to_string();
        config.timeout = Duration::from_secs(5);
        CrtShClient::build(&config)
            .unwrap()
            .with_base_url(base_url)
            .with_retry_policy(retry)
    }

    fn instant_retries() -> RetryPolicy {
        RetryPolicy {
            backoff_factor: Duration::ZERO,
            ..RetryPolicy::default()
        }
    }

    #[test]
    fn parses_name_values() {
        let records =
            parse_records(r#"[{"name_value":"a.example.com\n*.example.com","id":1},{"id":2}]"#)
                .unwrap();
        assert_eq!(
            records,
            vec![
                CertificateRecord::new("a.example.com\n*.example.com"),
                CertificateRecord { name_value: None },
            ]
        );
    }

    #[test]
    fn skips_malformed_entries() {
        let records =
            parse_records(r#"[42, {"name_value": 7}, {"name_value": "b.example.com"}]"#).unwrap();
        assert_eq!(records, vec![CertificateRecord::new("b.example.com")]);
    }

    #[test]
    fn rejects_non_array_bodies() {
        assert!(parse_records("<html>busy</html>").is_err());
        assert!(parse_records(r#"{"name_value": "a.example.com"}"#).is_err());
    }

    #[test]
    fn builds_query_url() {
        let client = client("https://crt.sh/", RetryPolicy::none());
        assert_eq!(
            client.query_url("%25.example.com"),
            "https://crt.sh/?q=%25.example.com&output=json"
        );
    }

    #[test]
    fn sends_query_and_user_agent() {
        let (base_url, server) = serve(vec![(200, r#"[{"name_value":"a.example.com"}]"#)]);
        let records = client(&base_url, RetryPolicy::none())
            .fetch("example.com")
            .unwrap();
        assert_eq!(records, vec![CertificateRecord::new("a.example.com")]);

        let requests = server.join().unwrap();
        assert!(requests[0].starts_with("GET /?q=example.com&output=json HTTP/1.1"));
        assert!(requests[0].to_lowercase().contains("user-agent: subhunter-test"));
    }

    #[test]
    fn retries_server_errors() {
        let (base_url, server) = serve(vec![
            (503, ""),
            (502, ""),
            (200, r#"[{"name_value":"a.example.com"}]"#),
        ]);
        let records = client(&base_url, instant_retries())
            .fetch("example.com")
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(server.join().unwrap().len(), 3);
    }

    #[test]
    fn client_errors_are_final() {
        let (base_url, server) = serve(vec![(404, "")]);
        let result = client(&base_url, instant_retries()).fetch("example.com");
        assert!(matches!(result, Err(FetchError::Status(status)) if status == 404));
        assert_eq!(server.join().unwrap().len(), 1);
    }

    #[test]
    fn exhausted_retries_report_last_status() {
        let (base_url, server) = serve(vec![(504, ""), (504, ""), (504, ""), (504, "")]);
        let result = client(&base_url, instant_retries()).fetch("example.com");
        assert!(matches!(result, Err(FetchError::Status(status)) if status == 504));
        assert_eq!(server.join().unwrap().len(), 4);
    }

    #[test]
    fn unreachable_host_is_a_request_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let result = client(&base_url, RetryPolicy::none()).fetch("example.com");
        assert!(matches!(result, Err(FetchError::Request(_))));
    }

    #[test]
    fn connection_failures_are_retried_then_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let client = client(&base_url, instant_retries());
        let err = client.fetch("example.com").unwrap_err();
        assert!(matches!(err, FetchError::Request(_)));
        assert!(client.is_retryable(&err));
    }

    #[test]
    fn sleeps_after_a_successful_fetch() {
        let (base_url, server) = serve(vec![(200, r#"[{"name_value":"a.example.com"}]"#)]);
        let client = rate_limited_client(&base_url, RetryPolicy::none(), Duration::from_millis(200));

        let started = Instant::now();
        let records = client.fetch("example.com").unwrap();
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert_eq!(records.len(), 1);
        server.join().unwrap();
    }

    #[test]
    fn sleeps_even_when_the_body_is_not_json() {
        let (base_url, server) = serve(vec![(200, "<html>busy</html>")]);
        let client = rate_limited_client(&base_url, RetryPolicy::none(), Duration::from_millis(200));

        let started = Instant::now();
        let result = client.fetch("example.com");
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert!(matches!(result, Err(FetchError::Decode(_))));
        server.join().unwrap();
    }

    #[test]
    fn failed_requests_do_not_sleep() {
        let (base_url, server) = serve(vec![(404, "")]);
        let client = rate_limited_client(&base_url, RetryPolicy::none(), Duration::from_secs(30));

        let started = Instant::now();
        assert!(client.fetch("example.com").is_err());
        assert!(started.elapsed() < Duration::from_secs(30));
        server.join().unwrap();
    }
}
