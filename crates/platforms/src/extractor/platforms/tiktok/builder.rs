use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::{
    config::{Endpoints, PlatformFlags},
    extractor::{
        error::ResolveError,
        platform_extractor::{Extractor, PlatformResolver},
        platforms::tiktok::models::DownloadToken,
        utils::{capture_group_1_owned, ensure_success, parse_set_cookies},
    },
    matcher::{DetectedLink, LinkTarget, Platform, TikTokLink},
    media::{Resolution, ResolvedMedia},
};

static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<input type="hidden" id="token" name="token" value="([^"]+)""#).unwrap()
});
static HREF_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"href="([^"]+)""#).unwrap());

const SESSION_COOKIE: &str = "PHPSESSID";

pub struct TikTok {
    extractor: Extractor,
    service_url: String,
    file_stem: String,
}

impl TikTok {
    pub fn new(link: &DetectedLink, client: Client, endpoints: &Endpoints) -> Self {
        let file_stem = match &link.target {
            LinkTarget::TikTok(TikTokLink::Video { video_id, .. }) => video_id.clone(),
            LinkTarget::TikTok(TikTokLink::Short { code, .. }) => format!("tiktok_{code}"),
            _ => "tiktok".to_string(),
        };

        let service_url = endpoints.tiktok_service.clone();
        let mut extractor = Extractor::new(Platform::TikTok, link.normalized_url.clone(), client);
        extractor.set_origin_and_referer(&service_url);

        Self {
            extractor,
            service_url,
            file_stem,
        }
    }

    /// Loads the service's landing page for a session cookie and the hidden
    /// form token. Either one missing aborts the resolution.
    async fn mint_token(&self) -> Result<DownloadToken, ResolveError> {
        let response = self
            .extractor
            .get(&format!("{}/", self.service_url))
            .send()
            .await?;
        let response = ensure_success(response)?;

        let session_cookie = parse_set_cookies(response.headers())
            .remove(SESSION_COOKIE)
            .ok_or_else(|| ResolveError::missing("PHPSESSID cookie"))?;
        let body = response.text().await?;
        let csrf_token = capture_group_1_owned(&TOKEN_REGEX, &body)
            .ok_or_else(|| ResolveError::missing("token input"))?;

        Ok(DownloadToken {
            session_cookie,
            csrf_token,
        })
    }

    async fn search(&self, token: &DownloadToken) -> Result<String, ResolveError> {
        let form = [
            ("url", self.extractor.url.as_str()),
            ("format", ""),
            ("token", token.csrf_token.as_str()),
        ];
        let response = self
            .extractor
            .post(&format!("{}/search/", self.service_url))
            .header(reqwest::header::COOKIE, token.cookie_header())
            .header("X-Requested-With", "XMLHttpRequest")
            .form(&form)
            .send()
            .await?;
        let body = ensure_success(response)?.text().await?;

        Self::first_absolute_link(&body).ok_or_else(|| {
            ResolveError::EmptyResult(format!("no download link for {}", self.extractor.url))
        })
    }

    fn first_absolute_link(body: &str) -> Option<String> {
        HREF_REGEX
            .captures_iter(body)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .find(|href| {
                Url::parse(href).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
            })
            .map(ToOwned::to_owned)
    }
}

#[async_trait]
impl PlatformResolver for TikTok {
    fn get_extractor(&self) -> &Extractor {
        &self.extractor
    }

    async fn resolve(&self, flags: &PlatformFlags) -> Result<Resolution, ResolveError> {
        if !flags.video {
            return Ok(Resolution::default());
        }

        let token = self.mint_token().await?;
        debug!(url = %self.extractor.url, "TikTok download token minted");

        let video_url = self.search(&token).await?;
        debug!(url = %self.extractor.url, video_url = %video_url, "TikTok download link found");

        Ok(Resolution::new(
            None,
            vec![ResolvedMedia::video(
                video_url,
                "video/mp4",
                format!("{}.mp4", self.file_stem),
            )],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::LinkMatcher;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LANDING_PAGE: &str = r#"<form><input type="hidden" id="token" name="token" value="f00dcafe"></form>"#;

    fn resolver(server: &MockServer) -> TikTok {
        let link = LinkMatcher::new()
            .find_links("https://www.tiktok.com/@someone/video/7234567890123456789")
            .remove(0);
        TikTok::new(&link, Client::new(), &Endpoints::rooted_at(&server.uri()))
    }

    async fn mount_search(server: &MockServer, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/ttdownloader/search/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a href="/faq">faq</a>
                   <a href="https://dl.example/no-watermark.mp4">download</a>
                   <a href="https://dl.example/watermark.mp4">download</a>"#,
            ))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn handshake_then_first_absolute_link() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ttdownloader/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Set-Cookie", "PHPSESSID=sess42; path=/")
                    .set_body_string(LANDING_PAGE),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/ttdownloader/search/"))
            .and(header("Cookie", "PHPSESSID=sess42"))
            .and(body_string_contains("token=f00dcafe"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a href="/faq">faq</a>
                   <a href="https://dl.example/no-watermark.mp4">download</a>
                   <a href="https://dl.example/watermark.mp4">download</a>"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let resolution = resolver(&server)
            .resolve(&PlatformFlags::default())
            .await
            .unwrap();

        assert_eq!(resolution.caption, None);
        assert_eq!(
            resolution.media,
            vec![ResolvedMedia::video(
                "https://dl.example/no-watermark.mp4",
                "video/mp4",
                "7234567890123456789.mp4"
            )]
        );
    }

    #[tokio::test]
    async fn short_link_is_submitted_with_its_own_host() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ttdownloader/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Set-Cookie", "PHPSESSID=sess7; path=/")
                    .set_body_string(LANDING_PAGE),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/ttdownloader/search/"))
            .and(body_string_contains("vt.tiktok.com%2FZSxyz"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"<a href="https://dl.example/short.mp4">download</a>"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let link = LinkMatcher::new()
            .find_links("look https://vt.tiktok.com/ZSxyz/")
            .remove(0);
        let resolution = TikTok::new(&link, Client::new(), &Endpoints::rooted_at(&server.uri()))
            .resolve(&PlatformFlags::default())
            .await
            .unwrap();

        assert_eq!(resolution.media[0].file_name, "tiktok_ZSxyz.mp4");
    }

    #[tokio::test]
    async fn token_page_failure_issues_no_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ttdownloader/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        mount_search(&server, 0).await;

        let err = resolver(&server)
            .resolve(&PlatformFlags::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::UpstreamHttp { .. }));
    }

    #[tokio::test]
    async fn missing_session_cookie_issues_no_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ttdownloader/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LANDING_PAGE))
            .mount(&server)
            .await;
        mount_search(&server, 0).await;

        let err = resolver(&server)
            .resolve(&PlatformFlags::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::MissingField(_)));
    }

    #[tokio::test]
    async fn video_flag_off_makes_no_requests() {
        let server = MockServer::start().await;
        mount_search(&server, 0).await;

        let flags = PlatformFlags {
            video: false,
            ..PlatformFlags::default()
        };
        let resolution = resolver(&server).resolve(&flags).await.unwrap();
        assert!(resolution.is_empty());
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[test]
    fn relative_links_are_skipped() {
        assert_eq!(
            TikTok::first_absolute_link(r#"<a href="/x"></a><a href="mailto:a@b"></a>"#),
            None
        );
    }
}
