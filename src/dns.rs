use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveResult},
    proto::rr::rdata::TXT,
    system_conf,
};

use crate::config;

/// Resolver trait for real or mock DNS
///
/// Lookup failures never reach the caller: an unreachable server, NXDOMAIN
/// and an empty answer all look the same.
#[async_trait]
pub trait MailResolver: Send + Sync {
    /// Check if domain has MX records
    async fn resolve_mx(&self, domain: &str) -> bool;

    /// TXT records for `name` in answer order, `None` if the lookup failed
    async fn resolve_txt(&self, name: &str) -> Option<Vec<String>>;
}

/// DNS resolver wrapper
#[derive(Clone)]
pub struct DnsResolver {
    inner: Arc<TokioAsyncResolver>,
}

impl DnsResolver {
    /// Builds a resolver from the host's resolv.conf
    pub fn new() -> anyhow::Result<Self> {
        Self::from_system_conf(system_conf::read_system_conf().map_err(ResolveError::from))
    }

    fn from_system_conf(
        system: ResolveResult<(ResolverConfig, ResolverOpts)>,
    ) -> anyhow::Result<Self> {
        let (resolver_config, opts) = system.context("Failed to read system DNS config")?;
        Ok(Self::with_config(resolver_config, opts))
    }

    pub fn with_config(resolver_config: ResolverConfig, opts: ResolverOpts) -> Self {
        let resolver = TokioAsyncResolver::tokio(resolver_config, config::resolver_opts(opts));
        Self {
            inner: Arc::new(resolver),
        }
    }
}

/// Joins the character-strings of one TXT record into a single string
pub(crate) fn txt_to_string(txt: &TXT) -> String {
    let bytes: Vec<u8> = txt
        .txt_data()
        .iter()
        .flat_map(|chunk| chunk.iter().copied())
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[async_trait]
impl MailResolver for DnsResolver {
    async fn resolve_mx(&self, domain: &str) -> bool {
        match self.inner.mx_lookup(domain).await {
            Ok(mx_lookup) => mx_lookup.iter().next().is_some(),
            Err(_) => false,
        }
    }

    async fn resolve_txt(&self, name: &str) -> Option<Vec<String>> {
        let response = self.inner.txt_lookup(name).await.ok()?;
        Some(response.iter().map(txt_to_string).collect())
    }
}
