use crate::model::HostingServiceRecord;
use crate::utils::to_kebab_case;

use reqwest::Url;
use tracing::debug;

pub const DEFAULT_LINK_TEMPLATE: &str = "https://affiliate.link/{slug}";

/// Derives computed fields from a validated record. Pure and total.
///
/// Two services whose names slug to the same value get the same link;
/// collisions are not detected.
#[derive(Debug, Clone)]
pub struct RecordEnricher {
    link_template: String,
}

impl Default for RecordEnricher {
    fn default() -> Self {
        Self::new(DEFAULT_LINK_TEMPLATE)
    }
}

impl RecordEnricher {
    /// `{slug}` is replaced by the service-name slug, `{host}` by the host of
    /// the source URL (empty if the URL does not parse).
    pub fn new(link_template: impl Into<String>) -> Self {
        Self {
            link_template: link_template.into(),
        }
    }

    pub fn enrich(&self, record: &HostingServiceRecord, source_url: &str) -> HostingServiceRecord {
        let link = self.affiliate_link(&record.service_name, source_url);
        debug!("Affiliate link for {}: {}", record.service_name, link);

        HostingServiceRecord {
            affiliate_link: Some(link),
            ..record.clone()
        }
    }

    pub fn affiliate_link(&self, service_name: &str, source_url: &str) -> String {
        let host = Url::parse(source_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();

        self.link_template
            .replace("{slug}", &to_kebab_case(service_name))
            .replace("{host}", &host)
    }
}
