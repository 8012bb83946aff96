pub mod crt_sh;
pub mod report;
pub mod retry;
pub mod subdomain_extractor;
