use super::state::{
    extract_legacy_state_json, extract_state_json, parse_state, select_state_json, StateScript,
};
use crate::config::FetchStrategy;
use crate::error::{Result, ScrapeError};
use crate::http::{FetchOptions, HttpTransport, Renderer};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Page state tagged with the path that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum PageState {
    Direct(Value),
    Rendered(Value),
}

impl PageState {
    pub fn source(&self) -> &'static str {
        match self {
            PageState::Direct(_) => "direct",
            PageState::Rendered(_) => "rendered",
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            PageState::Direct(value) | PageState::Rendered(value) => value,
        }
    }
}

pub struct StateResolver {
    transport: Arc<dyn HttpTransport>,
    renderer: Arc<dyn Renderer>,
    strategy: FetchStrategy,
    options: Option<FetchOptions>,
}

impl StateResolver {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        renderer: Arc<dyn Renderer>,
        strategy: FetchStrategy,
    ) -> Self {
        Self {
            transport,
            renderer,
            strategy,
            options: None,
        }
    }

    pub fn with_options(mut self, options: Option<FetchOptions>) -> Self {
        self.options = options;
        self
    }

    pub async fn resolve(&self, url: &str, script: StateScript) -> Result<PageState> {
        let state = match self.strategy {
            FetchStrategy::Direct => PageState::Direct(self.direct(url, script).await?),
            FetchStrategy::Rendered => PageState::Rendered(self.rendered(url, script).await?),
            FetchStrategy::Auto => match self.direct(url, script).await {
                Ok(value) => PageState::Direct(value),
                Err(e) => {
                    warn!(
                        "Direct fetch of {} failed: {}. Falling back to {}",
                        url,
                        e,
                        self.renderer.name()
                    );
                    PageState::Rendered(self.rendered(url, script).await?)
                }
            },
        };

        debug!("Resolved page state of {} via {}", url, state.source());
        Ok(state)
    }

    async fn direct(&self, url: &str, script: StateScript) -> Result<Value> {
        let response = self.transport.get(url, &[], self.options.as_ref()).await?;

        let json = match select_state_json(&response.body, script) {
            Some(json) => json,
            None if script == StateScript::Sigi => {
                extract_legacy_state_json(&response.body)?.to_string()
            }
            None => {
                return Err(ScrapeError::Extraction(format!(
                    "no {} script tag (HTTP {})",
                    script.id(),
                    response.status
                )))
            }
        };

        parse_state(&json)
    }

    async fn rendered(&self, url: &str, script: StateScript) -> Result<Value> {
        let html = self.renderer.render(url).await?.ok_or_else(|| {
            ScrapeError::Load(format!("headless navigation to {url} returned no content"))
        })?;

        let json = match extract_state_json(&html, script) {
            Err(_) if script == StateScript::Sigi => extract_legacy_state_json(&html)?,
            found => found?,
        };
        parse_state(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeRenderer, FakeTransport};
    use crate::tiktok::state::page_with_state;
    use serde_json::json;

    const URL: &str = "https://www.tiktok.com/@jane/video/1";

    fn resolver(
        transport: FakeTransport,
        renderer: FakeRenderer,
        strategy: FetchStrategy,
    ) -> (StateResolver, Arc<FakeTransport>, Arc<FakeRenderer>) {
        let transport = Arc::new(transport);
        let renderer = Arc::new(renderer);
        let resolver = StateResolver::new(transport.clone(), renderer.clone(), strategy);
        (resolver, transport, renderer)
    }

    #[tokio::test]
    async fn test_direct_hit_skips_renderer() {
        let state = json!({"a": 1});
        let page = page_with_state(StateScript::Universal, &state);
        let (resolver, _, renderer) = resolver(
            FakeTransport::new().with_get(page),
            FakeRenderer::new(None),
            FetchStrategy::Auto,
        );

        let resolved = resolver.resolve(URL, StateScript::Universal).await.unwrap();
        assert_eq!(resolved, PageState::Direct(state));
        assert_eq!(renderer.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_tag_falls_back_to_renderer() {
        let state = json!({"b": 2});
        let rendered = page_with_state(StateScript::Universal, &state);
        let (resolver, transport, renderer) = resolver(
            FakeTransport::new().with_get_status(403, "<html>captcha</html>"),
            FakeRenderer::new(Some(rendered)),
            FetchStrategy::Auto,
        );

        let resolved = resolver.resolve(URL, StateScript::Universal).await.unwrap();
        assert_eq!(resolved.source(), "rendered");
        assert_eq!(resolved.into_value(), state);
        assert_eq!(transport.calls().len(), 1);
        assert_eq!(renderer.calls(), 1);
    }

    #[tokio::test]
    async fn test_error_status_page_is_still_parsed() {
        let state = json!({"e": 5});
        let (resolver, _, renderer) = resolver(
            FakeTransport::new()
                .with_get_status(404, page_with_state(StateScript::Universal, &state)),
            FakeRenderer::new(None),
            FetchStrategy::Auto,
        );

        let resolved = resolver.resolve(URL, StateScript::Universal).await.unwrap();
        assert_eq!(resolved, PageState::Direct(state));
        assert_eq!(renderer.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_json_falls_back_to_renderer() {
        let broken = "<script id=\"__UNIVERSAL_DATA_FOR_REHYDRATION__\" type=\"application/json\">{oops</script>";
        let rendered = page_with_state(StateScript::Universal, &json!({"c": 3}));
        let (resolver, _, renderer) = resolver(
            FakeTransport::new().with_get(broken),
            FakeRenderer::new(Some(rendered)),
            FetchStrategy::Auto,
        );

        let resolved = resolver.resolve(URL, StateScript::Universal).await.unwrap();
        assert!(matches!(resolved, PageState::Rendered(_)));
        assert_eq!(renderer.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_render_is_load_error() {
        let (resolver, _, _) = resolver(
            FakeTransport::new().with_get("<html></html>"),
            FakeRenderer::new(None),
            FetchStrategy::Auto,
        );

        let err = resolver.resolve(URL, StateScript::Universal).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Load(_)));
    }

    #[tokio::test]
    async fn test_forced_direct_does_not_fall_back() {
        let (resolver, _, renderer) = resolver(
            FakeTransport::new().with_get("<html></html>"),
            FakeRenderer::new(Some(page_with_state(StateScript::Universal, &json!({})))),
            FetchStrategy::Direct,
        );

        let err = resolver.resolve(URL, StateScript::Universal).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Extraction(_)));
        assert_eq!(renderer.calls(), 0);
    }

    #[tokio::test]
    async fn test_forced_rendered_skips_fetch() {
        let state = json!({"d": 4});
        let (resolver, transport, _) = resolver(
            FakeTransport::new(),
            FakeRenderer::new(Some(page_with_state(StateScript::Sigi, &state))),
            FetchStrategy::Rendered,
        );

        let resolved = resolver.resolve(URL, StateScript::Sigi).await.unwrap();
        assert_eq!(resolved, PageState::Rendered(state));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_sigi_legacy_assignment() {
        let html = r#"<script>window['SIGI_STATE']={"ItemModule":{}};window['SIGI_RETRY']={"x":1}</script>"#;
        let (resolver, _, renderer) = resolver(
            FakeTransport::new().with_get(html),
            FakeRenderer::new(None),
            FetchStrategy::Auto,
        );

        let resolved = resolver.resolve(URL, StateScript::Sigi).await.unwrap();
        assert_eq!(resolved, PageState::Direct(json!({"ItemModule": {}})));
        assert_eq!(renderer.calls(), 0);
    }

    #[tokio::test]
    async fn test_rendered_sigi_legacy_assignment() {
        let html = r#"<script>window['SIGI_STATE']={"ItemList":{}};window['SIGI_RETRY']={"x":1}</script>"#;
        let (resolver, _, renderer) = resolver(
            FakeTransport::new().with_get("<html>captcha</html>"),
            FakeRenderer::new(Some(html.to_string())),
            FetchStrategy::Auto,
        );

        let resolved = resolver.resolve(URL, StateScript::Sigi).await.unwrap();
        assert_eq!(resolved, PageState::Rendered(json!({"ItemList": {}})));
        assert_eq!(renderer.calls(), 1);
    }
}
