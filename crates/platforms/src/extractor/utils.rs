use regex::Regex;
use reqwest::Response;
use reqwest::header::HeaderMap;
use rustc_hash::FxHashMap;

use crate::extractor::error::ResolveError;

#[inline]
pub fn capture_group_1<'a>(re: &Regex, input: &'a str) -> Option<&'a str> {
    re.captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[inline]
pub fn capture_group_1_owned(re: &Regex, input: &str) -> Option<String> {
    capture_group_1(re, input).map(ToOwned::to_owned)
}

/// Passes 2xx responses through and turns anything else into
/// [`ResolveError::UpstreamHttp`].
pub fn ensure_success(response: Response) -> Result<Response, ResolveError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ResolveError::upstream(status, response.url().as_str()))
    }
}

/// Collects `name=value` pairs from every `Set-Cookie` header.
pub fn parse_set_cookies(headers: &HeaderMap) -> FxHashMap<String, String> {
    let mut cookies = FxHashMap::default();
    for value in headers.get_all(reqwest::header::SET_COOKIE).iter() {
        if let Ok(cookie_str) = value.to_str()
            && let Some(cookie_part) = cookie_str.split(';').next()
            && let Some((name, value)) = cookie_part.split_once('=')
        {
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                continue;
            }
            cookies.insert(name.to_owned(), value.to_owned());
        }
    }
    cookies
}

/// Strips the query string and fragment from a URL.
#[inline]
pub fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

/// Escapes the characters that are significant in HTML text content.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, SET_COOKIE};

    #[test]
    fn parses_set_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("PHPSESSID=abc123; path=/; HttpOnly"),
        );
        headers.append(SET_COOKIE, HeaderValue::from_static("empty=; path=/"));
        headers.append(SET_COOKIE, HeaderValue::from_static("lang=en"));

        let cookies = parse_set_cookies(&headers);
        assert_eq!(cookies.get("PHPSESSID").map(String::as_str), Some("abc123"));
        assert_eq!(cookies.get("lang").map(String::as_str), Some("en"));
        assert!(!cookies.contains_key("empty"));
    }

    #[test]
    fn strip_query_keeps_path() {
        assert_eq!(
            strip_query("https://v.redd.it/x/DASH_720.mp4?source=fallback"),
            "https://v.redd.it/x/DASH_720.mp4"
        );
        assert_eq!(strip_query("https://a.b/c#frag"), "https://a.b/c");
        assert_eq!(strip_query("https://a.b/c"), "https://a.b/c");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("a <b> & \"c\""), "a &lt;b&gt; &amp; &quot;c&quot;");
    }
}
