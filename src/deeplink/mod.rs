use wasm_bindgen::JsValue;

const SHARE_PREFIX: &str = "share_";
const LECTURE_PREFIX: &str = "lecture_";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum DeepLink {
    SharedLecture(String),
    Lecture(String),
}

/// Collected link candidates; later sources override earlier ones.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct DeepLinkResolution {
    pub slug: Option<String>,
    pub lecture_id: Option<String>,
    /// A `share` or `lecture` query parameter was consumed and must be
    /// removed from the visible URL.
    pub strip_query: bool,
}

impl DeepLinkResolution {
    /// A shared slug takes precedence over a lecture id.
    pub fn target(&self) -> Option<DeepLink> {
        if let Some(slug) = &self.slug {
            return Some(DeepLink::SharedLecture(slug.clone()));
        }
        self.lecture_id.clone().map(DeepLink::Lecture)
    }
}

pub(crate) fn parse_start_param(param: &str) -> Option<DeepLink> {
    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
    if let Some(slug) = param.strip_prefix(SHARE_PREFIX) {
        return non_empty(slug).map(DeepLink::SharedLecture);
    }
    if let Some(id) = param.strip_prefix(LECTURE_PREFIX) {
        return non_empty(id).map(DeepLink::Lecture);
    }
    None
}

/// Start parameter first, then `?share=` / `?lecture=` query values.
pub(crate) fn resolve(
    start_param: Option<&str>,
    share_query: Option<&str>,
    lecture_query: Option<&str>,
) -> DeepLinkResolution {
    let mut out = DeepLinkResolution::default();

    match start_param.and_then(parse_start_param) {
        Some(DeepLink::SharedLecture(slug)) => out.slug = Some(slug),
        Some(DeepLink::Lecture(id)) => out.lecture_id = Some(id),
        None => {}
    }

    if let Some(slug) = share_query.filter(|s| !s.is_empty()) {
        out.slug = Some(slug.to_string());
        out.strip_query = true;
    }
    if let Some(id) = lecture_query.filter(|s| !s.is_empty()) {
        out.lecture_id = Some(id.to_string());
        out.strip_query = true;
    }
    out
}

/// Decoded, non-empty value of `key` in the query of an absolute `href`.
pub(crate) fn query_param(href: &str, key: &str) -> Option<String> {
    let url = reqwest::Url::parse(href).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// Drop the query string from the address bar without reloading.
pub(crate) fn strip_query_from_url() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Ok(path) = window.location().pathname() else {
        return;
    };
    if let Ok(history) = window.history() {
        let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(&path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_param_prefixes() {
        assert_eq!(
            parse_start_param("share_my-talk"),
            Some(DeepLink::SharedLecture("my-talk".into()))
        );
        assert_eq!(
            parse_start_param("lecture_abc123"),
            Some(DeepLink::Lecture("abc123".into()))
        );
        assert_eq!(parse_start_param("share_"), None);
        assert_eq!(parse_start_param("promo"), None);
    }

    #[test]
    fn test_share_query_opens_shared_lecture_and_strips() {
        let r = resolve(None, Some("SLUG"), None);
        assert_eq!(r.target(), Some(DeepLink::SharedLecture("SLUG".into())));
        assert!(r.strip_query);
    }

    #[test]
    fn test_query_overrides_start_param() {
        let r = resolve(Some("share_old"), Some("new"), None);
        assert_eq!(r.slug.as_deref(), Some("new"));

        let r = resolve(Some("lecture_1"), None, Some("2"));
        assert_eq!(r.target(), Some(DeepLink::Lecture("2".into())));
    }

    #[test]
    fn test_slug_wins_over_lecture_id() {
        let r = resolve(Some("share_talk"), None, Some("lec-9"));
        assert_eq!(r.target(), Some(DeepLink::SharedLecture("talk".into())));
    }

    #[test]
    fn test_start_param_alone_keeps_url() {
        let r = resolve(Some("lecture_x"), None, None);
        assert!(!r.strip_query);
        assert_eq!(r.target(), Some(DeepLink::Lecture("x".into())));
        assert_eq!(resolve(None, None, None).target(), None);
    }

    #[test]
    fn test_query_param_parsing() {
        assert_eq!(
            query_param("https://app.test/?startapp=share_abc&x=1", "startapp").as_deref(),
            Some("share_abc")
        );
        assert_eq!(
            query_param("https://app.test/?a=hello%20world", "a").as_deref(),
            Some("hello world")
        );
        assert_eq!(query_param("https://app.test/?a=b+c", "a").as_deref(), Some("b c"));
        assert_eq!(query_param("https://app.test/?a=", "a"), None);
        assert_eq!(query_param("https://app.test/", "a"), None);
        assert_eq!(query_param("not a url", "a"), None);
    }
}
