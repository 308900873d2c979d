//! HTTP client for the Cloud 189 open API.
//!
//! Owns the per-account session keys: created on a successful login, replaced
//! atomically on re-login, dropped when an account is replaced or deleted.
//! Never global; tests construct isolated instances.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;

use common::account::Account;
use common::error::DriverError;

use super::types::SessionResponse;

const API_BASE: &str = "https://cloud.189.cn/api/open";
const SESSION_URL: &str = "https://cloud.189.cn/v2/getUserBriefInfo.action";
const LOGIN_URL: &str = "https://open.e.189.cn/api/logbox/oauth2/loginSubmit.do";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

pub struct Cloud189Client {
    http: reqwest::Client,
    /// Separate client for download-link resolution: the vendor answers with
    /// a redirect we want to read, not follow.
    no_redirect: reqwest::Client,
    sessions: RwLock<HashMap<String, String>>,
}

impl Cloud189Client {
    pub fn new() -> Self {
        let timeout = Duration::from_secs(30);
        Self {
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("http client construction"),
            no_redirect: reqwest::Client::builder()
                .timeout(timeout)
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .expect("http client construction"),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Authenticate and return a fresh session key. The stored session is
    /// replaced only on success; a failed login keeps the previous one.
    pub async fn login(&self, account: &Account) -> Result<String, DriverError> {
        let resp = self
            .http
            .post(LOGIN_URL)
            .form(&[
                ("userName", account.username.as_str()),
                ("password", account.password.as_str()),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(DriverError::AuthFailed(format!(
                "login rejected with status {}",
                resp.status()
            )));
        }

        let session: SessionResponse = self
            .http
            .get(SESSION_URL)
            .send()
            .await?
            .json()
            .await?;
        if session.res_code != 0 || session.session_key.is_empty() {
            return Err(DriverError::AuthFailed(
                session
                    .res_message
                    .unwrap_or_else(|| "no session key issued".to_string()),
            ));
        }

        self.sessions
            .write()
            .insert(account.name.clone(), session.session_key.clone());
        Ok(session.session_key)
    }

    /// Bare HTTP client for endpoints outside the open API, like uploads.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn drop_session(&self, account_name: &str) {
        self.sessions.write().remove(account_name);
    }

    fn session_key(&self, account: &Account) -> String {
        self.sessions
            .read()
            .get(&account.name)
            .cloned()
            .unwrap_or_else(|| account.drive_id.clone())
    }

    /// Call an API endpoint, re-authenticating once on an expired session.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        query: &[(&str, &str)],
        form: &[(&str, &str)],
        account: &Account,
    ) -> Result<T, DriverError> {
        let url = format!("{}/{}", API_BASE, endpoint);
        match self.call(&url, method, query, form, account).await {
            Err(DriverError::Vendor(message)) if message.contains("InvalidSessionKey") => {
                tracing::debug!(account = %account.name, "session expired, re-authenticating");
                self.login(account).await?;
                self.call(&url, method, query, form, account).await
            }
            other => other,
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        url: &str,
        method: Method,
        query: &[(&str, &str)],
        form: &[(&str, &str)],
        account: &Account,
    ) -> Result<T, DriverError> {
        let session_key = self.session_key(account);
        let mut query: Vec<(&str, &str)> = query.to_vec();
        query.push(("sessionKey", session_key.as_str()));

        let request = match method {
            Method::Get => self.http.get(url).query(&query),
            Method::Post => self.http.post(url).query(&query).form(form),
        };
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(DriverError::Vendor(format!(
                "{} answered {}",
                url,
                resp.status()
            )));
        }
        let body = resp.bytes().await?;
        let parsed: serde_json::Value = serde_json::from_slice(&body)?;
        let res_code = parsed.get("res_code").or_else(|| parsed.get("resCode"));
        if let Some(code) = res_code.and_then(|v| v.as_i64()) {
            if code != 0 {
                let message = parsed
                    .get("res_message")
                    .or_else(|| parsed.get("resMessage"))
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown vendor failure");
                return Err(DriverError::Vendor(format!("code {}: {}", code, message)));
            }
        }
        Ok(serde_json::from_value(parsed)?)
    }

    /// Resolve the final download URL, reading one redirect hop if present.
    pub async fn follow_download(&self, url: &str) -> Result<String, DriverError> {
        let resp = self.no_redirect.get(url).send().await?;
        if resp.status().is_redirection() {
            if let Some(location) = resp
                .headers()
                .get(http::header::LOCATION)
                .and_then(|v| v.to_str().ok())
            {
                return Ok(location.to_string());
            }
        }
        Ok(url.to_string())
    }
}

impl Default for Cloud189Client {
    fn default() -> Self {
        Self::new()
    }
}
