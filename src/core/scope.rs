use url::{Host, Url};

/// Crawl eligibility relative to the seed URL.
///
/// A link is in scope when it shares the seed's origin, when its host is the
/// seed's registrable domain (public suffix plus one label) or a subdomain of
/// it, or when it is the seed host reached over the other scheme.
#[derive(Debug, Clone)]
pub struct Scope {
    origin: url::Origin,
    host: String,
    registrable_host: String,
}

impl Scope {
    pub fn new(seed: &Url) -> anyhow::Result<Self> {
        let host = seed
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid target host"))?
            .to_lowercase();

        let registrable_host = match seed.host() {
            Some(Host::Domain(_)) => registrable_domain(&host),
            _ => host.clone(),
        };

        Ok(Self {
            origin: seed.origin(),
            host,
            registrable_host,
        })
    }

    pub fn is_in_scope(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        if url.origin() == self.origin {
            return true;
        }

        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_lowercase();

        host == self.host
            || host == self.registrable_host
            || host.ends_with(&format!(".{}", self.registrable_host))
    }
}

/// `blog.example.co.uk` -> `example.co.uk`. Single-label hosts such as
/// `localhost` have no registrable part and stay as they are.
fn registrable_domain(host: &str) -> String {
    let host = host.trim_end_matches('.');
    match psl::domain_str(host) {
        Some(domain) => domain.to_string(),
        None => host.strip_prefix("www.").unwrap_or(host).to_string(),
    }
}
