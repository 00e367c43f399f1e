//! Concurrent rendering of independent requests.
//!
//! Each request gets its own DOM and its own compositor state and runs on a
//! blocking worker; a semaphore caps how many run at once.

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::dom::MarkupDom;
use crate::{compose, compose_grid_container, ComposeConfig, Error, Mode, Result};

/// One render instruction: markup already laid out by the host, plus how to
/// compose it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderRequest {
    pub markup: String,
    /// `id` of the panel root (single mode) or grid container (grid mode).
    /// Defaults to the first element inside `<body>`.
    pub root_id: Option<String>,
    pub config: ComposeConfig,
}

impl RenderRequest {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            ..Default::default()
        }
    }
}

/// Line-protocol reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderResponse {
    pub id: u64,
    /// The SVG document, or the error message when `is_error` is set
    pub value: String,
    pub is_error: bool,
}

impl RenderResponse {
    pub fn from_result(id: u64, result: Result<String>) -> Self {
        match result {
            Ok(svg) => Self {
                id,
                value: svg,
                is_error: false,
            },
            Err(e) => Self {
                id,
                value: e.to_string(),
                is_error: true,
            },
        }
    }
}

/// Render one request synchronously.
pub fn render_markup(request: &RenderRequest) -> Result<String> {
    let mut dom = MarkupDom::parse(&request.markup);
    let root = match &request.root_id {
        Some(id) => dom
            .element_by_id(id)
            .ok_or_else(|| Error::StructuralMismatch(format!("no element with id {:?}", id)))?,
        None => dom
            .body()
            .and_then(|body| dom.first_element_child(body))
            .ok_or_else(|| Error::StructuralMismatch("document body is empty".into()))?,
    };

    match request.config.mode {
        Mode::Single => compose(&mut dom, &[root], &request.config),
        Mode::Grid => compose_grid_container(&mut dom, root, &request.config),
    }
}

/// Runs render requests on tokio's blocking pool with bounded parallelism.
///
/// Cloning is cheap; clones share the same limit.
#[derive(Debug, Clone)]
pub struct RenderService {
    permits: Arc<Semaphore>,
    concurrency: usize,
}

impl RenderService {
    /// A service running at most `concurrency` renders at once (minimum 1)
    pub fn new(concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            permits: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Render one request on a blocking worker.
    pub async fn render(&self, request: RenderRequest) -> Result<String> {
        let _permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| Error::RenderError(format!("service closed: {}", e)))?;

        tokio::task::spawn_blocking(move || render_markup(&request))
            .await
            .map_err(|e| Error::RenderError(format!("render task failed: {}", e)))?
    }

    /// Render every request, returning results in request order.
    pub async fn render_many(&self, requests: Vec<RenderRequest>) -> Vec<Result<String>> {
        join_all(requests.into_iter().map(|r| self.render(r))).await
    }
}

impl Default for RenderService {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_root_is_first_body_element() {
        let req = RenderRequest::new(r#"<svg width="40" height="30"></svg><svg width="1" height="1"></svg>"#);
        let svg = render_markup(&req).unwrap();
        assert!(svg.contains(r#"viewBox="0 0 40 30""#));
    }

    #[test]
    fn unknown_root_id_is_reported() {
        let req = RenderRequest {
            root_id: Some("missing".into()),
            ..RenderRequest::new("<div></div>")
        };
        assert!(matches!(
            render_markup(&req),
            Err(Error::StructuralMismatch(_))
        ));
    }

    #[test]
    fn response_carries_error_text() {
        let res = RenderResponse::from_result(7, Err(Error::ConfigError("x".into())));
        assert_eq!(res.id, 7);
        assert!(res.is_error);
        assert_eq!(res.value, "Invalid configuration: x");
    }

    #[test]
    fn concurrency_is_at_least_one() {
        assert_eq!(RenderService::new(0).concurrency(), 1);
        assert!(RenderService::default().concurrency() >= 1);
    }

    #[tokio::test]
    async fn render_many_keeps_order() {
        let service = RenderService::new(2);
        let requests = (1..=4)
            .map(|i| RenderRequest::new(format!(r#"<svg width="{}" height="10"></svg>"#, i * 10)))
            .collect();
        let results = service.render_many(requests).await;
        for (i, res) in results.into_iter().enumerate() {
            let expected = format!(r#"width="{}""#, (i + 1) * 10);
            assert!(res.unwrap().contains(&expected));
        }
    }
}
