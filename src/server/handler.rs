// src/server/handler.rs
use hyper::{Body, Method, Request, Response, StatusCode};
use std::sync::Arc;
use tower::Service;
use tracing::{debug, error};
use uuid::Uuid;

use crate::aggregator::{AggregatorError, StatusAggregator};
use crate::selection::{ListOptions, Requirements};

const COLLECTION_PATH: &str = "/componentstatuses";

#[derive(Clone)]
pub struct RequestHandler {
    aggregator: Arc<StatusAggregator>,
}

impl RequestHandler {
    pub fn new(aggregator: Arc<StatusAggregator>) -> Self {
        Self { aggregator }
    }

    async fn route(aggregator: Arc<StatusAggregator>, req: Request<Body>) -> Response<Body> {
        let request_id = Uuid::new_v4();
        debug!(
            %request_id,
            method = %req.method(),
            path = req.uri().path(),
            "incoming request"
        );

        if req.method() != Method::GET {
            return error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed");
        }

        let path = req.uri().path().trim_end_matches('/');
        if path == COLLECTION_PATH {
            let options = match parse_list_options(req.uri().query()) {
                Ok(options) => options,
                Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
            };
            let list = aggregator.list(options.as_ref()).await;
            return json_response(StatusCode::OK, &list);
        }

        if let Some(name) = path
            .strip_prefix(COLLECTION_PATH)
            .and_then(|rest| rest.strip_prefix('/'))
        {
            if name.is_empty() || name.contains('/') {
                return error_response(StatusCode::NOT_FOUND, "not found");
            }
            return match aggregator.get(name).await {
                Ok(status) => json_response(StatusCode::OK, &status),
                Err(err @ AggregatorError::NotFound(_)) => {
                    error_response(StatusCode::NOT_FOUND, &err.to_string())
                }
            };
        }

        error_response(StatusCode::NOT_FOUND, "not found")
    }
}

impl Service<Request<Body>> for RequestHandler {
    type Response = Response<Body>;
    type Error = Box<dyn std::error::Error + Send + Sync>;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let aggregator = self.aggregator.clone();
        Box::pin(async move { Ok(Self::route(aggregator, req).await) })
    }
}

/// Pulls `labelSelector` / `fieldSelector` out of the query string. Returns
/// `None` when neither is present so the aggregator sees "no options".
///
/// Values are form-urlencoded, so `fieldSelector=metadata.name%3Detcd-0`
/// and the unencoded `fieldSelector=metadata.name=etcd-0` both parse; a
/// literal comma or equals inside a selector value must be `%2C` / `%3D`.
fn parse_list_options(query: Option<&str>) -> anyhow::Result<Option<ListOptions>> {
    let Some(query) = query else {
        return Ok(None);
    };

    let mut options = ListOptions::default();
    let mut any = false;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "labelSelector" => {
                options.label_selector = Some(Arc::new(Requirements::parse(&value)?));
                any = true;
            }
            "fieldSelector" => {
                options.field_selector = Some(Arc::new(Requirements::parse(&value)?));
                any = true;
            }
            _ => {}
        }
    }
    Ok(any.then_some(options))
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: &T) -> Response<Body> {
    match serde_json::to_vec(body) {
        Ok(bytes) => Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Body::from(bytes))
            .unwrap(),
        Err(e) => {
            error!(%e, "failed to serialize response");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "serialization error")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response<Body> {
    Response::builder()
        .status(status)
        .body(Body::from(message.to_string()))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::static_registry;
    use crate::probe::{ProbeOutcome, Server, ServerCheck};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct AlwaysHealthy;

    #[async_trait]
    impl Server for AlwaysHealthy {
        async fn do_server_check(&self) -> ServerCheck {
            ServerCheck::new(ProbeOutcome::Success, "ok")
        }
    }

    fn handler_with(names: &[&str]) -> RequestHandler {
        let servers: HashMap<String, Arc<dyn Server>> = names
            .iter()
            .map(|name| (name.to_string(), Arc::new(AlwaysHealthy) as Arc<dyn Server>))
            .collect();
        RequestHandler::new(Arc::new(StatusAggregator::new(static_registry(servers))))
    }

    async fn send(handler: &RequestHandler, uri: &str) -> Response<Body> {
        let mut svc = handler.clone();
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        svc.call(req).await.unwrap()
    }

    #[tokio::test]
    async fn list_route_returns_json_items() {
        let handler = handler_with(&["etcd-0"]);
        let response = send(&handler, "/componentstatuses").await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["items"][0]["name"], "etcd-0");
    }

    #[tokio::test]
    async fn get_route_on_unknown_name_is_404_with_the_name() {
        let handler = handler_with(&["etcd-0"]);
        let response = send(&handler, "/componentstatuses/missing").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("missing"));
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let handler = handler_with(&["etcd-0"]);
        let response = send(&handler, "/healthz").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn no_query_yields_no_options() {
        assert!(parse_list_options(None).unwrap().is_none());
        assert!(parse_list_options(Some("")).unwrap().is_none());
    }

    #[test]
    fn selectors_are_parsed_from_query() {
        // The first `=` separates key from value, so equality terms pass
        // through without percent-encoding.
        let options = parse_list_options(Some("fieldSelector=metadata.name=etcd-0"))
            .unwrap()
            .expect("options expected");
        assert!(options.field_selector.is_some());
        assert!(options.label_selector.is_none());
    }

    #[test]
    fn selector_values_are_percent_decoded() {
        let options =
            parse_list_options(Some("fieldSelector=metadata.name%3Detcd-0&labelSelector=a%3Db"))
                .unwrap()
                .expect("options expected");
        assert!(options.field_selector.is_some());
        assert!(options.label_selector.is_some());
    }

    #[test]
    fn malformed_selector_is_an_error() {
        assert!(parse_list_options(Some("labelSelector=not-a-term")).is_err());
    }
}
