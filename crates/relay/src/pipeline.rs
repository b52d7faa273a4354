use std::sync::Arc;

use bytes::Bytes;
use futures::future::join_all;
use hls_stitch::StreamReconstructor;
use mediagrab_platforms::{
    DetectedLink, LinkMatcher, MediaSource, ResolvedMedia, ResolverFactory, build_client,
};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::message::InboundMessage;
use crate::sink::{MediaSink, PostContent};

/// What happened to one inbound message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageReport {
    pub links_found: usize,
    /// Links whose platform is disabled in the config.
    pub links_skipped: usize,
    /// Links that could not be resolved at all.
    pub links_failed: usize,
    pub captions_posted: usize,
    pub media_posted: usize,
    /// Media that was resolved but could not be fetched, rebuilt or posted.
    pub media_failed: usize,
}

#[derive(Debug, Default)]
struct LinkReport {
    skipped: bool,
    failed: bool,
    caption_posted: bool,
    media_posted: usize,
    media_failed: usize,
}

/// Drives inbound text through link matching, resolution and delivery.
///
/// Every link and every media item is contained on its own: a failure is
/// logged and never prevents the rest of the message from being delivered.
pub struct Relay {
    config: Arc<RelayConfig>,
    matcher: LinkMatcher,
    factory: ResolverFactory,
    reconstructor: StreamReconstructor,
    http_client: Client,
    sink: Arc<dyn MediaSink>,
}

impl Relay {
    /// Builds the shared HTTP client from `config.http`.
    pub fn new(config: RelayConfig, sink: Arc<dyn MediaSink>) -> Result<Self, RelayError> {
        let client = build_client(&config.http.user_agent, config.http.timeout())?;
        Ok(Self::with_client(config, client, sink))
    }

    pub fn with_client(config: RelayConfig, http_client: Client, sink: Arc<dyn MediaSink>) -> Self {
        let factory = ResolverFactory::new(http_client.clone(), config.endpoints.clone())
            .with_reddit_user_agent(config.http.reddit_user_agent.clone());
        let reconstructor =
            StreamReconstructor::new(http_client.clone(), config.hls.stitch_config());

        Self {
            config: Arc::new(config),
            matcher: LinkMatcher::new(),
            factory,
            reconstructor,
            http_client,
            sink,
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub async fn handle_message(&self, message: &InboundMessage) -> MessageReport {
        if !message.should_handle(&self.config) {
            debug!(kind = ?message.kind, "Message ignored");
            return MessageReport::default();
        }

        let links = self.matcher.find_links(&message.body);
        if links.is_empty() {
            return MessageReport::default();
        }
        debug!(count = links.len(), "Links found in message");

        let reports = join_all(links.iter().map(|link| self.handle_link(link))).await;

        let mut summary = MessageReport {
            links_found: links.len(),
            ..MessageReport::default()
        };
        for report in reports {
            summary.links_skipped += usize::from(report.skipped);
            summary.links_failed += usize::from(report.failed);
            summary.captions_posted += usize::from(report.caption_posted);
            summary.media_posted += report.media_posted;
            summary.media_failed += report.media_failed;
        }
        summary
    }

    async fn handle_link(&self, link: &DetectedLink) -> LinkReport {
        let platform = link.platform();
        let flags = self.config.flags.for_platform(platform);
        let mut report = LinkReport::default();

        if !flags.enabled {
            debug!(%platform, url = %link.normalized_url, "Platform disabled, skipping link");
            report.skipped = true;
            return report;
        }

        let resolver = self.factory.create_resolver(link);
        let resolution = match resolver.resolve(flags).await {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!(%platform, url = %link.normalized_url, error = %e, "Failed to resolve link");
                report.failed = true;
                return report;
            }
        };
        debug!(
            %platform,
            url = %link.normalized_url,
            caption = resolution.caption.is_some(),
            media = resolution.media.len(),
            "Link resolved"
        );

        if let Some(caption) = resolution.caption {
            match self.sink.post(PostContent::Caption(caption)).await {
                Ok(()) => report.caption_posted = true,
                Err(e) => {
                    warn!(%platform, url = %link.normalized_url, error = %e, "Failed to post caption")
                }
            }
        }

        let results = join_all(resolution.media.iter().map(|media| self.deliver(media))).await;
        for (media, result) in resolution.media.iter().zip(results) {
            match result {
                Ok(()) => report.media_posted += 1,
                Err(e) => {
                    warn!(
                        %platform,
                        url = %media.source.url(),
                        file_name = %media.file_name,
                        error = %e,
                        "Failed to deliver media"
                    );
                    report.media_failed += 1;
                }
            }
        }

        report
    }

    async fn deliver(&self, media: &ResolvedMedia) -> Result<(), RelayError> {
        debug!(%media, "Delivering media");
        let data = match &media.source {
            MediaSource::DirectUrl(url) => self.fetch_direct(url).await?,
            MediaSource::HlsManifest(url) => self.reconstructor.reconstruct(url).await?.bytes,
        };
        if data.is_empty() {
            return Err(RelayError::EmptyBody {
                url: media.source.url().to_string(),
            });
        }

        let size = data.len();
        let locator = self
            .sink
            .upload(data, &media.mime_type, &media.file_name)
            .await?;
        self.sink
            .post(PostContent::Media {
                locator,
                kind: media.kind,
                mime_type: media.mime_type.clone(),
                file_name: media.file_name.clone(),
                size,
            })
            .await?;

        info!(kind = media.kind.as_str(), file_name = %media.file_name, size, "Media delivered");
        Ok(())
    }

    async fn fetch_direct(&self, url: &str) -> Result<Bytes, RelayError> {
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::UpstreamHttp {
                status,
                url: url.to_string(),
            });
        }
        let data = response.bytes().await?;
        if data.is_empty() {
            return Err(RelayError::EmptyBody {
                url: url.to_string(),
            });
        }
        Ok(data)
    }
}
