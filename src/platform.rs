//! # Hosting-Platform Account Client
//!
//! A small GitHub REST API client used for the account-listing capability:
//! "does this account exist", "list its repositories", "is this repository
//! a fork". The pipeline is single-threaded and strictly sequential, so the
//! client is blocking.
//!
//! Rate limits and authentication are the caller's responsibility; an
//! optional token is attached when provided and unauthenticated requests
//! are allowed for public data.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Default REST API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Host used to construct clone URLs for shorthand `owner/repo` targets.
pub const DEFAULT_CLONE_HOST: &str = "https://github.com";

/// Build the clone URL for a shorthand `owner/repo` target.
pub fn shorthand_clone_url(owner_repo: &str) -> String {
    format!("{}/{}.git", DEFAULT_CLONE_HOST, owner_repo)
}

/// One repository as reported by the account listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformRepo {
    pub name: String,
    pub clone_url: String,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub private: bool,
}

/// Account metadata; only the fields the resolver needs.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformAccount {
    pub login: String,
    #[serde(default)]
    pub public_repos: u64,
}

/// Blocking GitHub REST API client.
pub struct PlatformClient {
    http: Client,
    api_url: String,
    token: Option<String>,
}

impl PlatformClient {
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("authorscan/0.3"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        let http = Client::builder()
            .default_headers(headers)
            .build()
            .expect("failed to build reqwest client");
        log::debug!("created PlatformClient for {}", api_url);
        Self {
            http,
            api_url,
            token,
        }
    }

    /// Client against the default public endpoint, reading the token from
    /// the caller when available.
    pub fn public(token: Option<String>) -> Self {
        Self::new(DEFAULT_API_URL, token)
    }

    fn get(&self, url: &str) -> reqwest::blocking::RequestBuilder {
        let mut req = self.http.get(url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Check whether `account` is a valid user or organization.
    pub fn account_exists(&self, account: &str) -> Result<bool> {
        let url = format!("{}/users/{}", self.api_url, account);
        let resp = self.get(&url).send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        self.check_response(&url, resp.status())?;
        let user: PlatformAccount = resp.json()?;
        log::debug!(
            "account {} exists with {} public repositories",
            user.login,
            user.public_repos
        );
        Ok(true)
    }

    /// List every repository accessible for `account`.
    ///
    /// Private repositories are only visible when a token is attached and
    /// `include_private` is requested; in that case the authenticated
    /// listing endpoint is used so the platform applies the visibility
    /// criteria itself. Fork filtering happens at the resolver, which needs
    /// to distinguish "empty because forks were excluded" from "empty".
    pub fn list_repositories(
        &self,
        account: &str,
        include_private: bool,
    ) -> Result<Vec<PlatformRepo>> {
        let url = if include_private && self.token.is_some() {
            format!(
                "{}/user/repos?per_page=100&affiliation=owner",
                self.api_url
            )
        } else {
            format!("{}/users/{}/repos?per_page=100", self.api_url, account)
        };
        let resp = self.get(&url).send()?;
        self.check_response(&url, resp.status())?;
        let repos: Vec<PlatformRepo> = resp.json()?;
        log::debug!("listed {} repositories for {}", repos.len(), account);
        Ok(repos)
    }

    /// Check whether `owner/repo` is a fork. Best-effort: callers may treat
    /// a lookup failure as "not a fork" when the scan does not otherwise
    /// depend on the platform.
    pub fn is_fork(&self, owner_repo: &str) -> Result<bool> {
        let url = format!("{}/repos/{}", self.api_url, owner_repo);
        let resp = self.get(&url).send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        self.check_response(&url, resp.status())?;

        #[derive(Deserialize)]
        struct RepoFlags {
            #[serde(default)]
            fork: bool,
        }
        let flags: RepoFlags = resp.json()?;
        Ok(flags.fork)
    }

    fn check_response(&self, url: &str, status: StatusCode) -> Result<()> {
        if status.is_success() {
            return Ok(());
        }
        let message = match status.as_u16() {
            401 | 403 => format!(
                "HTTP {} - authentication or rate limit; set a platform token",
                status
            ),
            429 => format!("HTTP {} - rate limited", status),
            _ => format!("HTTP {}", status),
        };
        Err(Error::Network {
            url: url.to_string(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorthand_clone_url() {
        assert_eq!(
            shorthand_clone_url("octocat/hello-world"),
            "https://github.com/octocat/hello-world.git"
        );
    }

    #[test]
    fn test_platform_repo_deserialization() {
        let json = r#"{
            "name": "hello-world",
            "clone_url": "https://github.com/octocat/hello-world.git",
            "fork": true,
            "private": false,
            "stargazers_count": 42
        }"#;
        let repo: PlatformRepo = serde_json::from_str(json).unwrap();
        assert_eq!(repo.name, "hello-world");
        assert_eq!(repo.clone_url, "https://github.com/octocat/hello-world.git");
        assert!(repo.fork);
        assert!(!repo.private);
    }

    #[test]
    fn test_platform_repo_defaults_missing_flags() {
        let json = r#"{
            "name": "minimal",
            "clone_url": "https://github.com/octocat/minimal.git"
        }"#;
        let repo: PlatformRepo = serde_json::from_str(json).unwrap();
        assert!(!repo.fork);
        assert!(!repo.private);
    }

    #[test]
    fn test_account_deserialization() {
        let json = r#"{"login": "octocat", "public_repos": 8, "id": 1}"#;
        let account: PlatformAccount = serde_json::from_str(json).unwrap();
        assert_eq!(account.login, "octocat");
        assert_eq!(account.public_repos, 8);
    }

    #[test]
    fn test_api_url_trailing_slash_trimmed() {
        let client = PlatformClient::new("https://api.github.com/", None);
        assert_eq!(client.api_url, "https://api.github.com");
    }
}
