use crate::error::{Result, ScrapeError};
use scraper::{Html, Selector};
use serde_json::Value;

const SCRIPT_CLOSE: &str = "</script>";
const LEGACY_OPEN: &str = "window['SIGI_STATE']=";
const LEGACY_CLOSE: &str = ";window['SIGI_RETRY']=";

/// Script tags the platform embeds its page state in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateScript {
    /// Video, user and music pages.
    Universal,
    /// Legacy layout, still used by hashtag pages.
    Sigi,
}

impl StateScript {
    pub fn id(self) -> &'static str {
        match self {
            StateScript::Universal => "__UNIVERSAL_DATA_FOR_REHYDRATION__",
            StateScript::Sigi => "SIGI_STATE",
        }
    }

    fn open_marker(self) -> String {
        format!(r#"<script id="{}" type="application/json">"#, self.id())
    }
}

/// Slices the JSON text out of `<script id=... type="application/json">...</script>`.
pub fn extract_state_json(html: &str, script: StateScript) -> Result<&str> {
    slice_between(html, &script.open_marker(), SCRIPT_CLOSE)
        .ok_or_else(|| ScrapeError::Extraction(format!("no {} script tag", script.id())))
}

/// Older pages assigned the state to a global instead of a JSON script tag.
pub fn extract_legacy_state_json(html: &str) -> Result<&str> {
    slice_between(html, LEGACY_OPEN, LEGACY_CLOSE)
        .ok_or_else(|| ScrapeError::Extraction("no SIGI_STATE assignment".to_string()))
}

/// Looks the script tag up in parsed markup rather than by string offsets.
pub fn select_state_json(html: &str, script: StateScript) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(&format!("script#{}", script.id())).ok()?;
    let text: String = document.select(&selector).next()?.text().collect();
    Some(text)
}

pub fn parse_state(json: &str) -> Result<Value> {
    Ok(serde_json::from_str(json.trim())?)
}

fn slice_between<'a>(haystack: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = haystack.find(open)? + open.len();
    let len = haystack[start..].find(close)?;
    Some(&haystack[start..start + len])
}

#[cfg(test)]
pub(crate) fn page_with_state(script: StateScript, state: &Value) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>x</title></head><body><div id=\"app\"></div>{}{}{}<script>window.x=1</script></body></html>",
        script.open_marker(),
        state,
        SCRIPT_CLOSE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_state_json() {
        let state = json!({"__DEFAULT_SCOPE__": {"webapp.app-context": {"language": "en"}}});
        let html = page_with_state(StateScript::Universal, &state);

        let raw = extract_state_json(&html, StateScript::Universal).unwrap();
        assert_eq!(parse_state(raw).unwrap(), state);
    }

    #[test]
    fn test_extract_missing_marker() {
        let html = page_with_state(StateScript::Sigi, &json!({}));
        assert!(matches!(
            extract_state_json(&html, StateScript::Universal),
            Err(ScrapeError::Extraction(_))
        ));
        assert!(matches!(
            extract_state_json("<script id=\"SIGI_STATE\" type=\"application/json\">{", StateScript::Sigi),
            Err(ScrapeError::Extraction(_))
        ));
    }

    #[test]
    fn test_select_state_json() {
        let state = json!({"ItemModule": {"1": {"id": "1", "desc": "a < b && c"}}});
        let html = page_with_state(StateScript::Sigi, &state);

        let raw = select_state_json(&html, StateScript::Sigi).unwrap();
        assert_eq!(parse_state(&raw).unwrap(), state);
        assert!(select_state_json(&html, StateScript::Universal).is_none());
    }

    #[test]
    fn test_extract_legacy_state() {
        let html = r#"<script>window['SIGI_STATE']={"ItemList":{}};window['SIGI_RETRY']={}</script>"#;
        let raw = extract_legacy_state_json(html).unwrap();
        assert_eq!(parse_state(raw).unwrap(), json!({"ItemList": {}}));
        assert!(extract_legacy_state_json("<html></html>").is_err());
    }

    #[test]
    fn test_parse_is_idempotent() {
        let state = json!({
            "__DEFAULT_SCOPE__": {
                "webapp.video-detail": {"itemInfo": {"itemStruct": {"id": "1", "stats": {"diggCount": 3}}}}
            }
        });
        let html = page_with_state(StateScript::Universal, &state);

        let first = parse_state(extract_state_json(&html, StateScript::Universal).unwrap()).unwrap();
        let again = parse_state(&first.to_string()).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(parse_state("{not json"), Err(ScrapeError::Json(_))));
    }
}
