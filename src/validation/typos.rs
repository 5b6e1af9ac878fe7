use crate::models::address::Address;
use crate::outcome::{ErrorKind, Outcome};
use std::collections::HashMap;
use std::sync::LazyLock;

pub const TYPO_TEMPLATE: &str = "'{typodomain}' is usually a typo. Did you mean '{local}@{domain}'?";
pub const SQUATTER_TEMPLATE: &str =
    "'{typodomain}' is a squatter domain. Did you mean '{local}@{domain}'?";

static DEFAULT_TABLE: LazyLock<TypoTable> = LazyLock::new(TypoTable::default);

/// A known misspelled domain and the domain the user most likely meant.
///
/// The message template may use `{typodomain}`, `{domain}` and `{local}`
/// placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypoRule {
    pub typo_domain: String,
    pub correct_domain: String,
    pub message_template: String,
}

impl TypoRule {
    pub fn new(typo_domain: impl Into<String>, correct_domain: impl Into<String>) -> Self {
        Self {
            typo_domain: typo_domain.into(),
            correct_domain: correct_domain.into(),
            message_template: TYPO_TEMPLATE.to_string(),
        }
    }

    pub fn with_template(self, message_template: impl Into<String>) -> Self {
        Self {
            message_template: message_template.into(),
            ..self
        }
    }

    /// Renders the template for an address with the given local part.
    pub fn message(&self, local: &str) -> String {
        self.message_template
            .replace("{typodomain}", &self.typo_domain)
            .replace("{domain}", &self.correct_domain)
            .replace("{local}", local)
    }
}

/// Lookup capability used by the typo step.
///
/// Implement this to plug in a different source of typo rules. Lookups are
/// exact matches on the domain as given.
pub trait TypoLookup: Send + Sync {
    fn lookup(&self, domain: &str) -> Option<&TypoRule>;
}

/// # Typo Table
///
/// Immutable map from typo domain to [`TypoRule`]. The default table covers
/// common misspellings of gmail.com, aol.com and hotmail.com and is built
/// once per process (see [`TypoTable::shared`]). A custom table replaces the
/// defaults entirely; entries are never merged.
#[derive(Debug, Clone)]
pub struct TypoTable {
    rules: HashMap<String, TypoRule>,
}

impl TypoTable {
    pub fn new(rules: impl IntoIterator<Item = TypoRule>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|rule| (rule.typo_domain.clone(), rule))
                .collect(),
        }
    }

    /// The process-wide default table
    pub fn shared() -> &'static TypoTable {
        &DEFAULT_TABLE
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for TypoTable {
    fn default() -> Self {
        Self::new([
            TypoRule::new("gmial.com", "gmail.com").with_template(SQUATTER_TEMPLATE),
            TypoRule::new("gamil.com", "gmail.com"),
            TypoRule::new("gmaul.com", "gmail.com"),
            TypoRule::new("gnail.com", "gmail.com"),
            TypoRule::new("gmai.com", "gmail.com"),
            TypoRule::new("gmsil.com", "gmail.com"),
            TypoRule::new("ail.com", "aol.com").with_template(SQUATTER_TEMPLATE),
            TypoRule::new("hitnail.com", "hotmail.com"),
            TypoRule::new("hitmail.com", "hotmail.com"),
            TypoRule::new("hotnail.com", "hotmail.com"),
        ])
    }
}

impl TypoLookup for TypoTable {
    fn lookup(&self, domain: &str) -> Option<&TypoRule> {
        self.rules.get(domain)
    }
}

impl TypoLookup for HashMap<String, TypoRule> {
    fn lookup(&self, domain: &str) -> Option<&TypoRule> {
        self.get(domain)
    }
}

impl Outcome<Address> {
    /// Fails with `InvalidFormat` when the domain is a known typo, using the
    /// default table.
    ///
    /// The domain is matched as-is, so run `lower` first.
    ///
    /// # Examples
    /// ```
    /// use email_sanitizer::models::address::Address;
    ///
    /// let outcome = Address::validator("foo@gmial.com")
    ///     .validate_format()
    ///     .parse()
    ///     .common_typos();
    ///
    /// assert!(outcome.error_message().unwrap().contains("foo@gmail.com"));
    /// ```
    pub fn common_typos(self) -> Self {
        self.common_typos_with(TypoTable::shared())
    }

    /// Same as [`Outcome::common_typos`] with a caller supplied lookup.
    pub fn common_typos_with<L>(self, lookup: &L) -> Self
    where
        L: TypoLookup + ?Sized,
    {
        self.then(|address| {
            let (Some(local), Some(domain)) = (address.local_part(), address.domain()) else {
                return Outcome::failure(
                    ErrorKind::Empty,
                    "No domain parsed from email, cannot check common typos",
                );
            };

            match lookup.lookup(domain) {
                Some(rule) => Outcome::failure(ErrorKind::InvalidFormat, rule.message(local)),
                None => Outcome::success(address),
            }
        })
    }
}
