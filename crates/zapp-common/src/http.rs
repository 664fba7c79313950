use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

use crate::error::ZappError;

/// An allowlist-capped HTTP client. Every ZAPP Atlas network call (ontology
/// graphs, substance catalog, submission endpoint) goes through this wrapper
/// so the set of reachable hosts stays explicit.
#[derive(Debug, Clone)]
pub struct CappedClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl CappedClient {
    /// Creates a new client with the default allowlist of data and
    /// submission hosts.
    pub fn new() -> Result<Self, ZappError> {
        let mut allowlist = HashSet::new();
        let domains = vec![
            "purl.obolibrary.org",   // ZFA / ZP ontology IRIs
            "zfin.org",              // ZFin-hosted ontology exports
            "ftp.ebi.ac.uk",         // ChEBI reference data
            "pubchem.ncbi.nlm.nih.gov", // PubChem mappings
            "localhost",             // Local atlas server
            "127.0.0.1",             // Localhost alt
        ];

        for d in domains {
            allowlist.insert(d.to_string());
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ZappError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Validates if a URL is permitted under the current allowlist.
    /// Subdomains of an allowed host are permitted.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Exposes the inner `reqwest::Client` builder pattern safely for GET requests.
    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, ZappError> {
        if !self.is_allowed(url) {
            return Err(ZappError::Security(format!(
                "Network capabilities capped: domain not in allowlist for URL {}",
                url
            )));
        }

        Ok(self.client.get(url))
    }

    /// Exposes the inner `reqwest::Client` builder pattern safely for POST requests.
    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, ZappError> {
        if !self.is_allowed(url) {
            return Err(ZappError::Security(format!(
                "Network capabilities capped: domain not in allowlist for URL {}",
                url
            )));
        }

        Ok(self.client.post(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allowlist_permits_obo() {
        let client = CappedClient::new().unwrap();
        assert!(client.is_allowed("https://purl.obolibrary.org/obo/zfa.json"));
        assert!(client.is_allowed("http://localhost:5000/observation"));
    }

    #[test]
    fn test_unknown_host_rejected() {
        let client = CappedClient::new().unwrap();
        assert!(!client.is_allowed("https://example.com/zfa.json"));
        assert!(client.get("https://example.com/zfa.json").is_err());
    }

    #[test]
    fn test_allow_domain_extends_allowlist() {
        let mut client = CappedClient::new().unwrap();
        assert!(!client.is_allowed("https://atlas.example.org/observation"));
        client.allow_domain("atlas.example.org");
        assert!(client.is_allowed("https://atlas.example.org/observation"));
    }

    #[test]
    fn test_subdomain_of_allowed_host() {
        let client = CappedClient::new().unwrap();
        assert!(client.is_allowed("https://download.zfin.org/zp.json"));
    }
}
