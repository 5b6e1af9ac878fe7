use crate::config::MxConfig;
use crate::models::address::Address;
use crate::outcome::{ErrorKind, Outcome};
use async_trait::async_trait;
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{NameServerConfigGroup, ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
};

/// Result of a single MX verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxResponse {
    pub success: bool,
    pub message: String,
}

impl MxResponse {
    pub fn verified(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum MxError {
    /// The caller passed something the verifier cannot use
    #[error("{0}")]
    InvalidArgument(String),
    #[error("DNS lookup failed: {0}")]
    Resolve(String),
}

impl From<ResolveError> for MxError {
    fn from(err: ResolveError) -> Self {
        MxError::Resolve(err.to_string())
    }
}

/// MX verification capability used by the verify step.
///
/// Implementations keep their registered servers and bypass domains for the
/// life of the process and must tolerate concurrent registration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailVerifier: Send + Sync {
    /// Adds a resolver to query. Registering the same server twice is a no-op.
    fn add_dns_server(&self, server: &str) -> Result<(), MxError>;

    /// Marks a domain as trusted so `check` skips the lookup for it.
    fn add_bypass_domain(&self, domain: &str);

    /// Checks that the domain of `address` has at least one mail exchanger.
    async fn check(&self, address: &str) -> Result<MxResponse, MxError>;
}

/// # DNS Mail Verifier
///
/// [`MailVerifier`] that looks up MX records with `trust-dns-resolver`.
///
/// Lookups use the registered servers (falling back to the system
/// configuration when none are registered) with a 2 second timeout and 2
/// attempts per query. Bypass domains are answered from memory.
#[derive(Debug, Default)]
pub struct DnsMailVerifier {
    servers: RwLock<Vec<IpAddr>>,
    bypass: RwLock<HashSet<String>>,
}

impl DnsMailVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_bypassed(&self, domain: &str) -> bool {
        self.bypass
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&domain.to_lowercase())
    }

    /// Creates a resolver for the currently registered servers
    ///
    /// Configures resolver with:
    /// - 2 second timeout per request
    /// - 2 retry attempts
    fn create_resolver(&self) -> TokioAsyncResolver {
        let mut opts = ResolverOpts::default();
        opts.timeout = Duration::from_secs(2);
        opts.attempts = 2;

        let servers = self
            .servers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let config = if servers.is_empty() {
            ResolverConfig::default()
        } else {
            ResolverConfig::from_parts(
                None,
                vec![],
                NameServerConfigGroup::from_ips_clear(&servers, 53, true),
            )
        };

        TokioAsyncResolver::tokio(config, opts)
    }
}

#[async_trait]
impl MailVerifier for DnsMailVerifier {
    fn add_dns_server(&self, server: &str) -> Result<(), MxError> {
        let ip: IpAddr = server.trim().parse().map_err(|_| {
            MxError::InvalidArgument(format!("'{}' is not a valid DNS server address", server))
        })?;

        let mut servers = self.servers.write().unwrap_or_else(PoisonError::into_inner);
        if !servers.contains(&ip) {
            servers.push(ip);
        }
        Ok(())
    }

    fn add_bypass_domain(&self, domain: &str) {
        let domain = domain.trim().to_lowercase();
        if domain.is_empty() {
            return;
        }
        self.bypass
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(domain);
    }

    async fn check(&self, address: &str) -> Result<MxResponse, MxError> {
        let domain = match address.rsplit_once('@') {
            Some((_, domain)) if !domain.trim().is_empty() => domain.trim().to_lowercase(),
            _ => {
                return Err(MxError::InvalidArgument(format!(
                    "'{}' does not contain a domain",
                    address
                )));
            }
        };

        if self.is_bypassed(&domain) {
            return Ok(MxResponse::verified(format!("'{}' is a bypass domain", domain)));
        }

        let resolver = self.create_resolver();
        match resolver.mx_lookup(domain.as_str()).await {
            Ok(records) if records.iter().next().is_some() => Ok(MxResponse::verified(format!(
                "'{}' has MX records",
                domain
            ))),
            Ok(_) => Ok(MxResponse::rejected(format!(
                "'{}' has no MX records",
                domain
            ))),
            Err(err) if matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. }) => Ok(
                MxResponse::rejected(format!("'{}' has no MX records", domain)),
            ),
            Err(err) => Err(err.into()),
        }
    }
}

impl Outcome<Address> {
    /// Verifies that the address's domain has mail exchangers.
    ///
    /// Registers the configured DNS servers and bypass domains with
    /// `verifier` (built-in defaults for whichever list is missing or
    /// empty), then checks the address. Requires `validate_format` and
    /// `parse` to have run first. Verifier errors become `Empty`
    /// failures carrying the verifier's message. A verified domain is added
    /// to the bypass list, so later checks for it skip the lookup.
    ///
    /// # Arguments
    /// * `verifier` - The MX capability, usually shared process-wide
    /// * `config` - Optional servers and bypass domains
    ///
    /// # Examples
    /// ```no_run
    /// use email_sanitizer::models::address::Address;
    /// use email_sanitizer::validation::dnsmx::DnsMailVerifier;
    ///
    /// # async fn run() {
    /// let verifier = DnsMailVerifier::new();
    /// let outcome = Address::validator("someone@example.com")
    ///     .validate_format()
    ///     .parse()
    ///     .verify_mx(&verifier, None)
    ///     .await;
    /// println!("{:?}", outcome.error_message());
    /// # }
    /// ```
    pub async fn verify_mx<V>(self, verifier: &V, config: Option<&MxConfig>) -> Self
    where
        V: MailVerifier + ?Sized,
    {
        self.then_async(|address| async move {
            let Some(domain) = address.domain().map(str::to_string) else {
                return Outcome::failure(
                    ErrorKind::Empty,
                    "No domain parsed from email, cannot verify MX records",
                );
            };

            // a single '@' keeps the checked and the bypassed domain the same
            if !address.is_format_valid() {
                return Outcome::failure(
                    ErrorKind::InvalidFormat,
                    "Format validation must be done prior to verifying MX records",
                );
            }

            let config = config.cloned().unwrap_or_default();
            for server in config.effective_dns_servers() {
                if let Err(err) = verifier.add_dns_server(&server) {
                    warn!("Rejected DNS server '{}': {}", server, err);
                    return Outcome::failure(ErrorKind::Empty, failure_message(err));
                }
            }
            for bypass in config.effective_bypass_domains() {
                verifier.add_bypass_domain(&bypass);
            }

            let response = match verifier.check(address.normalized()).await {
                Ok(response) => response,
                Err(err) => MxResponse::rejected(failure_message(err)),
            };

            if !response.success {
                debug!(
                    "MX verification failed for '{}': {}",
                    address.normalized(),
                    response.message
                );
                return Outcome::failure(ErrorKind::Empty, response.message);
            }

            verifier.add_bypass_domain(&domain);
            info!("Verified MX records for '{}', added to bypass list", domain);

            Outcome::success(address)
        })
        .await
    }
}

fn failure_message(err: MxError) -> String {
    match err {
        MxError::InvalidArgument(message) => message,
        other => format!("Unknown exception. Record not added. {}", other),
    }
}
