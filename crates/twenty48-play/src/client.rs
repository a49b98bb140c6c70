use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::StatusCode;
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use log::debug;
use serde::Deserialize;
use twenty48_core::ScoreRecord;

/// Every way a call to the score service can fail. Nothing is swallowed here;
/// the caller decides how to show it.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid request: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("could not reach score server: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("failed to read response: {0}")]
    Body(#[from] hyper::Error),

    #[error("score server answered {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("score server did not accept the score")]
    Rejected,
}

#[derive(Deserialize)]
struct SubmitAck {
    success: bool,
}

/// HTTP client for `GET /highscores` and `POST /highscore`.
#[derive(Clone)]
pub struct ScoreClient {
    base_url: String,
    http: Client<HttpConnector, Full<Bytes>>,
}

impl ScoreClient {
    /// `base_url` such as `http://127.0.0.1:3001`; a trailing slash is ignored.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            http: Client::builder(TokioExecutor::new()).build_http(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn submit(&self, record: &ScoreRecord) -> Result<(), ClientError> {
        let body = serde_json::to_vec(record)?;
        let req = Request::builder()
            .method(Method::POST)
            .uri(self.url("/highscore"))
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body)))?;
        let bytes = self.send(req).await?;
        let ack: SubmitAck = serde_json::from_slice(&bytes)?;
        if !ack.success {
            return Err(ClientError::Rejected);
        }
        Ok(())
    }

    /// All stored records, highest first, as ordered by the server.
    pub async fn fetch(&self) -> Result<Vec<ScoreRecord>, ClientError> {
        let req = Request::builder()
            .method(Method::GET)
            .uri(self.url("/highscores"))
            .body(Full::new(Bytes::new()))?;
        let bytes = self.send(req).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, req: Request<Full<Bytes>>) -> Result<Bytes, ClientError> {
        debug!("{} {}", req.method(), req.uri());
        let res = self.http.request(req).await?;
        let status = res.status();
        let bytes = res.into_body().collect().await?.to_bytes();
        if !status.is_success() {
            return Err(ClientError::Status {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(bytes)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use score_server::app::{self, AppState};
    use score_server::store::ScoreStore;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// In-process score server on an ephemeral port; dropping the sender stops it.
    pub(crate) async fn spawn_server() -> (String, oneshot::Sender<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let state = AppState::new(ScoreStore::open_in_memory().unwrap());
        tokio::spawn(app::serve(listener, state, async move {
            let _ = rx.await;
        }));
        (format!("http://{addr}"), tx)
    }

    #[tokio::test]
    async fn submit_and_fetch_round_trip() {
        let (url, _stop) = spawn_server().await;
        let client = ScoreClient::new(format!("{url}/"));
        assert_eq!(client.base_url(), url);

        assert!(client.fetch().await.unwrap().is_empty());
        client.submit(&ScoreRecord::new("A", 50)).await.unwrap();
        client.submit(&ScoreRecord::new("B", 200)).await.unwrap();
        client.submit(&ScoreRecord::new("C", 10)).await.unwrap();

        let names: Vec<String> = client
            .fetch()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["B", "A", "C"]);
    }

    #[tokio::test]
    async fn unreachable_server_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ScoreClient::new(format!("http://{addr}"));
        let err = client.fetch().await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)), "{err}");
        let err = client.submit(&ScoreRecord::new("x", 4)).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)), "{err}");
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let (url, _stop) = spawn_server().await;
        let client = ScoreClient::new(format!("{url}/nope"));
        let err = client.fetch().await.unwrap_err();
        match err {
            ClientError::Status { status, .. } => assert_eq!(status, StatusCode::NOT_FOUND),
            other => panic!("expected status error, got {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_base_url_is_a_request_error() {
        let client = ScoreClient::new("not a url");
        let err = client.fetch().await.unwrap_err();
        assert!(matches!(err, ClientError::Request(_)), "{err}");
    }
}
