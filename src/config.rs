use trust_dns_resolver::config::ResolverOpts;

/// Address the HTTP service binds to
pub const BIND_HOST: &str = "0.0.0.0";

pub const PORT: u16 = 8080;

/// The only route the service exposes
pub const VERIFY_PATH: &str = "/verify";

/// Request bodies up to this size are read in full
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Adjusts resolver options for the service.
///
/// Keeps the incoming timeout and attempt count, but turns the response
/// cache off so every request sees live DNS state.
pub fn resolver_opts(mut opts: ResolverOpts) -> ResolverOpts {
    opts.cache_size = 0;
    opts
}
