//! HTTP script endpoint
//!
//! Serves the widget bundle for signed script requests. The endpoint plugs
//! into an existing hyper service via [`ScriptEndpoint::try_handle`], or runs
//! standalone through [`ScriptEndpoint::bind`] and [`BoundEndpoint::serve`].

mod bundle;

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::body::Incoming;
use hyper::header::CONTENT_TYPE;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper::Response;
use hyper::StatusCode;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use bundle::ScriptAssets;

use crate::error::ServeError;
use crate::request::ScriptRequest;
use crate::request::SCRIPT_PARAM;
use crate::request::SIGNATURE_PARAM;
use crate::sign::Secret;

const SCRIPT_CONTENT_TYPE: &str = "application/javascript; charset=utf-8";

// =============================================================================
// ScriptEndpoint
// =============================================================================

/// Verifies and answers signed script requests.
#[derive(Clone)]
pub struct ScriptEndpoint {
    inner: Arc<EndpointInner>,
}

struct EndpointInner {
    secret: Secret,
    assets: ScriptAssets,
}

impl ScriptEndpoint {
    pub fn new(secret: Secret, assets: ScriptAssets) -> Self {
        Self {
            inner: Arc::new(EndpointInner { secret, assets }),
        }
    }

    /// Answer a request if it is a script request.
    ///
    /// Returns `None` when either query parameter is absent so the host can
    /// serve the request itself. Every produced response is JavaScript:
    /// rejected requests get a 400 whose body is a single `console.error`
    /// statement carrying the reason.
    pub fn try_handle<B>(&self, req: &Request<B>) -> Option<Response<Full<Bytes>>> {
        let query = req.uri().query().unwrap_or("");
        let params: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let payload = params.get(SCRIPT_PARAM)?;
        let signature = params.get(SIGNATURE_PARAM)?;

        Some(match self.answer(payload, signature) {
            Ok(body) => script_response(StatusCode::OK, body),
            Err(e) => console_error(&e.to_string()),
        })
    }

    /// The verify, decode, compose pipeline for one script request.
    fn answer(&self, payload: &str, signature: &str) -> Result<String, ServeError> {
        if !self.inner.secret.verify(payload, signature) {
            return Err(ServeError::SignatureInvalid);
        }
        let request = ScriptRequest::decode(payload)?;
        bundle::compose(&self.inner.assets, &request)
    }

    /// Bind a local listener; serve from the returned endpoint.
    pub async fn bind(&self, addr: SocketAddr) -> Result<BoundEndpoint, ServeError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        Ok(BoundEndpoint {
            listener,
            local_addr,
            endpoint: self.clone(),
        })
    }
}

impl std::fmt::Debug for ScriptEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptEndpoint")
            .field("assets", &self.inner.assets)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// BoundEndpoint
// =============================================================================

/// A script endpoint bound to a local address.
pub struct BoundEndpoint {
    listener: TcpListener,
    local_addr: SocketAddr,
    endpoint: ScriptEndpoint,
}

impl BoundEndpoint {
    /// The bound address. With port 0 this is where the listener landed.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve script requests until the token is cancelled.
    ///
    /// Connections are handled one at a time; requests without the script
    /// parameters get a 404.
    pub async fn serve(self, cancel: CancellationToken) -> Result<(), ServeError> {
        loop {
            let (stream, _) = tokio::select! {
                _ = cancel.cancelled() => {
                    return Ok(());
                }
                accepted = self.listener.accept() => accepted?,
            };

            let io = TokioIo::new(stream);
            let endpoint = self.endpoint.clone();
            let service = service_fn(move |req: Request<Incoming>| {
                let endpoint = endpoint.clone();
                async move {
                    let response = endpoint.try_handle(&req).unwrap_or_else(|| {
                        Response::builder()
                            .status(StatusCode::NOT_FOUND)
                            .body(Full::new(Bytes::from("not found")))
                            .unwrap()
                    });
                    Ok::<_, Infallible>(response)
                }
            });

            let conn = http1::Builder::new().serve_connection(io, service);
            // Connection errors are not critical (client may close early)
            let _ = conn.await;
        }
    }
}

impl std::fmt::Debug for BoundEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundEndpoint")
            .field("local_addr", &self.local_addr)
            .finish_non_exhaustive()
    }
}

fn script_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, SCRIPT_CONTENT_TYPE)
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

/// A 400 whose body logs the reason in the browser console.
fn console_error(message: &str) -> Response<Full<Bytes>> {
    let body = format!(
        "console.error({});",
        serde_json::Value::String(message.to_string())
    );
    script_response(StatusCode::BAD_REQUEST, body)
}
