//! Authenticated access to the REST backend.
//!
//! Every call carries the stored bearer token. When the backend answers with
//! [`TOKEN_EXPIRED`] the connector refreshes the token once and replays the
//! call once; a second expiry (or a failed refresh) clears the session and
//! surfaces [`ClientError::SessionExpired`].
//!
//! Refreshes are serialized behind a lock and keyed on the token that
//! expired, so callers racing on the same stale token share one refresh.
//!
//! [`TOKEN_EXPIRED`]: crate::error::TOKEN_EXPIRED

use std::sync::Arc;

use api_types::auth::AuthResponse;
use reqwest::{
    Method, Response, Url,
    header::{self, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    error::{ClientError, Result},
    session::{Session, SessionStore},
};

const LOGIN_PATH: &str = "login";
const REFRESH_PATH: &str = "login/refresh";

#[derive(Debug, Clone)]
pub struct Connector {
    base_url: Url,
    http: reqwest::Client,
    session: SessionStore,
    refresh_lock: Arc<Mutex<()>>,
}

impl Connector {
    pub fn new(base_url: &str, session: SessionStore) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|err| ClientError::InvalidUrl(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!(
                "{base_url} cannot be used as base url"
            )));
        }
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
            session,
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Form-encoded login. The returned token becomes the current session.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let endpoint = self.endpoint(LOGIN_PATH)?;
        tracing::debug!(%endpoint, "logging in as {username}");

        let res = self
            .http
            .post(endpoint)
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;
        let auth: AuthResponse = ensure_success(res).await?.json().await?;

        let session = Session::from(auth);
        self.session.store(session.clone()).await?;
        tracing::info!("logged in as {username}");
        Ok(session)
    }

    /// Exchanges the current token for a fresh one.
    pub async fn refresh(&self) -> Result<Session> {
        let current = self.session.current().await.ok_or(ClientError::NotLoggedIn)?;
        let endpoint = self.endpoint(REFRESH_PATH)?;

        let res = self
            .http
            .post(endpoint)
            .header(header::AUTHORIZATION, authorization(&current)?)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        let auth: AuthResponse = ensure_success(res).await?.json().await?;

        let session = Session::from(auth);
        self.session.store(session.clone()).await?;
        tracing::info!("authorisation token refreshed");
        Ok(session)
    }

    pub async fn logout(&self) -> Result<()> {
        self.session.clear().await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let res = self.execute(Method::GET, path, None).await?;
        Ok(res.json::<T>().await?)
    }

    pub async fn add<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let res = self.execute(Method::POST, path, Some(&body)).await?;
        Ok(res.json::<T>().await?)
    }

    pub async fn update<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let res = self.execute(Method::PATCH, path, Some(&body)).await?;
        Ok(res.json::<T>().await?)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(Method::DELETE, path, None).await?;
        Ok(())
    }

    async fn execute(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Response> {
        let endpoint = self.endpoint(path)?;
        let session = self.session.current().await;

        match self
            .send(method.clone(), endpoint.clone(), body, session.as_ref())
            .await
        {
            Err(err) if err.is_token_expired() => {}
            other => return other,
        }

        tracing::info!(%method, path, "authorisation token expired");
        if let Err(err) = self.refresh_after(session.as_ref()).await {
            tracing::warn!("token refresh failed: {err}");
            return self.force_logout().await;
        }

        let session = self.session.current().await;
        match self.send(method.clone(), endpoint, body, session.as_ref()).await {
            Err(err) if err.is_token_expired() => {
                tracing::warn!(%method, path, "token still expired after refresh");
                self.force_logout().await
            }
            other => other,
        }
    }

    /// Refreshes unless somebody already replaced `stale` while we waited.
    async fn refresh_after(&self, stale: Option<&Session>) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;
        let current = self.session.current().await;
        if current.is_some() && current.as_ref() != stale {
            tracing::debug!("token already refreshed by a concurrent request");
            return Ok(());
        }
        self.refresh().await.map(|_| ())
    }

    async fn force_logout(&self) -> Result<Response> {
        self.session.clear().await?;
        tracing::warn!("session cleared, login required");
        Err(ClientError::SessionExpired)
    }

    async fn send(
        &self,
        method: Method,
        endpoint: Url,
        body: Option<&Value>,
        session: Option<&Session>,
    ) -> Result<Response> {
        tracing::debug!(%method, %endpoint, "sending request");

        let accept = if method == Method::DELETE {
            "*/*"
        } else {
            "application/json"
        };
        let mut req = self
            .http
            .request(method, endpoint)
            .header(header::ACCEPT, accept);
        if let Some(session) = session {
            req = req.header(header::AUTHORIZATION, authorization(session)?);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        ensure_success(req.send().await?).await
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(path.trim_matches('/').split('/'));
        Ok(url)
    }
}

fn authorization(session: &Session) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&session.authorization())
        .map_err(|err| ClientError::InvalidToken(err.to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

async fn ensure_success(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let detail = res.json::<Value>().await.ok().and_then(|body| detail_of(&body));
    Err(ClientError::from_status(status, detail))
}

/// Extracts the `detail` of an error body. Validation errors carry a list of
/// objects whose `msg` fields are joined.
fn detail_of(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(detail) => Some(detail.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}
