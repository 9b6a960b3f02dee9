pub mod config;
pub mod dns;
pub mod error;
pub mod parse;
pub mod server;
pub mod verification;

pub use dns::{DnsResolver, MailResolver};
pub use error::RequestError;
pub use parse::{extract_domain, is_valid_format};
pub use verification::{DomainReport, VerificationResult, check_domain, verify_email};
