use serde::{Deserialize, Serialize};

use crate::dns::MailResolver;
use crate::parse::{extract_domain, is_valid_format};

pub const INVALID_FORMAT_REASON: &str = "Invalid email format";
pub const NO_MX_REASON: &str = "Domain does not have valid MX records";

const SPF_PREFIX: &str = "v=spf1";
const DMARC_PREFIX: &str = "v=DMARC1";

/// Outcome of verifying one address, serialized as the `/verify` response body.
///
/// `reason` is set only when `valid` is false. The record fields carry the
/// TXT text exactly as published and are empty when no record matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub valid: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,

    #[serde(rename = "hasMX")]
    pub has_mx: bool,

    #[serde(rename = "hasSPF")]
    pub has_spf: bool,

    #[serde(rename = "spfRecord", default, skip_serializing_if = "String::is_empty")]
    pub spf_record: String,

    #[serde(rename = "hasDMARC")]
    pub has_dmarc: bool,

    #[serde(rename = "dmarcRecord", default, skip_serializing_if = "String::is_empty")]
    pub dmarc_record: String,
}

/// What DNS says about a mail domain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainReport {
    pub has_mx: bool,
    pub spf_record: Option<String>,
    pub dmarc_record: Option<String>,
}

/// First TXT record on `domain` starting with `v=spf1`
pub async fn check_spf<R: MailResolver + ?Sized>(dns: &R, domain: &str) -> Option<String> {
    first_with_prefix(dns.resolve_txt(domain).await?, SPF_PREFIX)
}

/// First TXT record on `_dmarc.<domain>` starting with `v=DMARC1`
pub async fn check_dmarc<R: MailResolver + ?Sized>(dns: &R, domain: &str) -> Option<String> {
    let name = format!("_dmarc.{}", domain);
    first_with_prefix(dns.resolve_txt(&name).await?, DMARC_PREFIX)
}

fn first_with_prefix(records: Vec<String>, prefix: &str) -> Option<String> {
    records.into_iter().find(|r| r.starts_with(prefix))
}

/// Runs the MX, SPF and DMARC lookups one after another.
///
/// All three always run, whatever the earlier ones returned.
pub async fn check_domain<R: MailResolver + ?Sized>(dns: &R, domain: &str) -> DomainReport {
    let has_mx = dns.resolve_mx(domain).await;
    let spf_record = check_spf(dns, domain).await;
    let dmarc_record = check_dmarc(dns, domain).await;

    DomainReport {
        has_mx,
        spf_record,
        dmarc_record,
    }
}

/// Core function: format check, then DNS.
///
/// A malformed address short-circuits before any lookup. Otherwise the
/// address is valid iff its domain has MX records; SPF and DMARC are
/// reported either way.
pub async fn verify_email<R: MailResolver + ?Sized>(email: &str, dns: &R) -> VerificationResult {
    let domain = match extract_domain(email) {
        Some(domain) if is_valid_format(email) => domain,
        _ => {
            return VerificationResult {
                reason: INVALID_FORMAT_REASON.to_string(),
                ..VerificationResult::default()
            };
        }
    };

    let report = check_domain(dns, domain).await;
    let reason = if report.has_mx {
        String::new()
    } else {
        NO_MX_REASON.to_string()
    };

    VerificationResult {
        valid: report.has_mx,
        reason,
        has_mx: report.has_mx,
        has_spf: report.spf_record.is_some(),
        spf_record: report.spf_record.unwrap_or_default(),
        has_dmarc: report.dmarc_record.is_some(),
        dmarc_record: report.dmarc_record.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves canned MX presence and TXT answers; counts every lookup.
    #[derive(Default)]
    struct MockResolver {
        mx: Vec<&'static str>,
        txt: HashMap<&'static str, Vec<&'static str>>,
        lookups: AtomicUsize,
    }

    impl MockResolver {
        fn with_mx(mut self, domain: &'static str) -> Self {
            self.mx.push(domain);
            self
        }

        fn with_txt(mut self, name: &'static str, records: &[&'static str]) -> Self {
            self.txt.insert(name, records.to_vec());
            self
        }

        fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MailResolver for MockResolver {
        async fn resolve_mx(&self, domain: &str) -> bool {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.mx.iter().any(|d| *d == domain)
        }

        async fn resolve_txt(&self, name: &str) -> Option<Vec<String>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.txt
                .get(name)
                .map(|records| records.iter().map(|r| r.to_string()).collect())
        }
    }

    #[tokio::test]
    async fn test_invalid_format_skips_dns() {
        let resolver = MockResolver::default().with_mx("example.com");

        for email in ["", "not-an-email", "user@localhost", "a b@example.com", "@example.com"] {
            let result = verify_email(email, &resolver).await;
            assert_eq!(
                result,
                VerificationResult {
                    valid: false,
                    reason: INVALID_FORMAT_REASON.to_string(),
                    ..VerificationResult::default()
                }
            );
        }
        assert_eq!(resolver.lookups(), 0);
    }

    #[tokio::test]
    async fn test_domain_with_mx_is_valid() {
        let resolver = MockResolver::default().with_mx("example.com");

        let result = verify_email("user@example.com", &resolver).await;

        assert!(result.valid);
        assert!(result.reason.is_empty());
        assert!(result.has_mx);
        assert!(!result.has_spf);
        assert!(!result.has_dmarc);
        assert_eq!(resolver.lookups(), 3);
    }

    #[tokio::test]
    async fn test_missing_mx_still_reports_spf_and_dmarc() {
        let resolver = MockResolver::default()
            .with_txt("nomail.org", &["v=spf1 -all"])
            .with_txt("_dmarc.nomail.org", &["v=DMARC1; p=reject"]);

        let result = verify_email("user@nomail.org", &resolver).await;

        assert!(!result.valid);
        assert_eq!(result.reason, NO_MX_REASON);
        assert!(!result.has_mx);
        assert!(result.has_spf);
        assert_eq!(result.spf_record, "v=spf1 -all");
        assert!(result.has_dmarc);
        assert_eq!(result.dmarc_record, "v=DMARC1; p=reject");
        assert_eq!(resolver.lookups(), 3);
    }

    #[tokio::test]
    async fn test_spf_record_passes_through_verbatim() {
        let resolver = MockResolver::default().with_mx("example.com").with_txt(
            "example.com",
            &[
                "google-site-verification=abc123",
                "v=spf1 include:_spf.example.com ~all",
            ],
        );

        let result = verify_email("user@example.com", &resolver).await;

        assert!(result.has_spf);
        assert_eq!(result.spf_record, "v=spf1 include:_spf.example.com ~all");
    }

    #[tokio::test]
    async fn test_first_matching_record_wins() {
        let resolver = MockResolver::default()
            .with_txt("example.com", &["v=spf1 a -all", "v=spf1 mx ~all"])
            .with_txt("_dmarc.example.com", &["v=DMARC1; p=none", "v=DMARC1; p=reject"]);

        assert_eq!(
            check_spf(&resolver, "example.com").await.as_deref(),
            Some("v=spf1 a -all")
        );
        assert_eq!(
            check_dmarc(&resolver, "example.com").await.as_deref(),
            Some("v=DMARC1; p=none")
        );
    }

    #[tokio::test]
    async fn test_prefix_match_is_case_sensitive() {
        let resolver = MockResolver::default()
            .with_txt("example.com", &["V=SPF1 -all", " v=spf1 -all"])
            .with_txt("_dmarc.example.com", &["v=dmarc1; p=none"]);

        assert_eq!(check_spf(&resolver, "example.com").await, None);
        assert_eq!(check_dmarc(&resolver, "example.com").await, None);
    }

    #[tokio::test]
    async fn test_dmarc_looked_up_under_underscore_label() {
        let resolver = MockResolver::default()
            .with_txt("example.com", &["v=DMARC1; p=none"])
            .with_txt("_dmarc.example.com", &["v=DMARC1; p=quarantine; rua=mailto:d@example.com"]);

        let report = check_domain(&resolver, "example.com").await;

        assert_eq!(
            report.dmarc_record.as_deref(),
            Some("v=DMARC1; p=quarantine; rua=mailto:d@example.com")
        );
        assert_eq!(report.spf_record, None);
    }

    #[tokio::test]
    async fn test_repeated_verification_is_stable() {
        let resolver = MockResolver::default()
            .with_mx("example.com")
            .with_txt("example.com", &["v=spf1 -all"]);

        let first = verify_email("user@example.com", &resolver).await;
        let second = verify_email("user@example.com", &resolver).await;

        assert_eq!(first, second);
    }

    #[test]
    fn test_serialization_omits_empty_strings() {
        let result = VerificationResult {
            valid: true,
            has_mx: true,
            ..VerificationResult::default()
        };

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "valid": true,
                "hasMX": true,
                "hasSPF": false,
                "hasDMARC": false,
            })
        );
    }

    #[test]
    fn test_serialization_wire_names() {
        let result = VerificationResult {
            valid: false,
            reason: NO_MX_REASON.to_string(),
            has_mx: false,
            has_spf: true,
            spf_record: "v=spf1 -all".to_string(),
            has_dmarc: true,
            dmarc_record: "v=DMARC1; p=none".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "valid": false,
                "reason": "Domain does not have valid MX records",
                "hasMX": false,
                "hasSPF": true,
                "spfRecord": "v=spf1 -all",
                "hasDMARC": true,
                "dmarcRecord": "v=DMARC1; p=none",
            })
        );
    }
}
