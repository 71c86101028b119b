use std::collections::HashSet;
use std::fmt::Display;

use async_trait::async_trait;
use hickory_resolver::{error::ResolveError, TokioAsyncResolver};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::domain::entry::Entry;

const MAX_LENGTH: usize = 255;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$"
    ).expect("Email regex is valid");
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryField {
    Name,
    Email,
    ExcludedEntries,
}

impl EntryField {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryField::Name => "name",
            EntryField::Email => "email",
            EntryField::ExcludedEntries => "excluded_entries",
        }
    }
}

impl Display for EntryField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: EntryField,
    pub message: String,
}

impl Violation {
    fn new(field: EntryField, message: impl Into<String>) -> Self {
        Violation { field, message: message.into() }
    }
}

/// Which rules to evaluate. Exclusions need the other entries of the pool,
/// so they are only checked when asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationGroup {
    Default,
    ExcludeEntries,
}

/// Decides whether a mail domain can receive mail.
#[async_trait]
pub trait MailDomainResolver: Send + Sync {
    async fn accepts_mail(&self, domain: &str) -> bool;
}

#[async_trait]
impl MailDomainResolver for Box<dyn MailDomainResolver> {
    async fn accepts_mail(&self, domain: &str) -> bool {
        self.as_ref().accepts_mail(domain).await
    }
}

/// Source of the MX records of a domain.
#[async_trait]
pub trait MxLookup: Send + Sync {
    async fn mail_exchangers(&self, domain: &str) -> Result<Vec<String>, ResolveError>;
}

#[async_trait]
impl MxLookup for TokioAsyncResolver {
    async fn mail_exchangers(&self, domain: &str) -> Result<Vec<String>, ResolveError> {
        let fqdn = if domain.ends_with('.') { domain.to_string() } else { format!("{}.", domain) };
        let lookup = self.mx_lookup(fqdn).await?;

        // A null MX ("." as exchange) announces that the domain takes no mail.
        Ok(lookup.iter()
            .filter(|mx| !mx.exchange().is_root())
            .map(|mx| mx.exchange().to_utf8())
            .collect())
    }
}

/// Accepts a domain if it publishes at least one mail exchanger.
pub struct DnsMailDomainResolver<L = TokioAsyncResolver> {
    lookup: L,
}

impl DnsMailDomainResolver {
    pub fn from_system_conf() -> Result<Self, ResolveError> {
        Ok(DnsMailDomainResolver { lookup: TokioAsyncResolver::tokio_from_system_conf()? })
    }
}

impl<L> DnsMailDomainResolver<L> where L: MxLookup {
    pub fn with_lookup(lookup: L) -> Self {
        DnsMailDomainResolver { lookup }
    }
}

#[async_trait]
impl<L> MailDomainResolver for DnsMailDomainResolver<L> where L: MxLookup {
    async fn accepts_mail(&self, domain: &str) -> bool {
        match self.lookup.mail_exchangers(domain).await {
            Ok(exchangers) => !exchangers.is_empty(),
            Err(e) => {
                debug!(domain, error = %e, "MX lookup failed");
                false
            }
        }
    }
}

/// Accepts every domain.
pub struct SkipMailDomainCheck;

#[async_trait]
impl MailDomainResolver for SkipMailDomainCheck {
    async fn accepts_mail(&self, _domain: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    NotBlank(EntryField),
    MaxLength(EntryField, usize),
    EmailSyntax,
    EmailDeliverable,
}

const DEFAULT_RULES: &[Rule] = &[
    Rule::NotBlank(EntryField::Name),
    Rule::MaxLength(EntryField::Name, MAX_LENGTH),
    Rule::NotBlank(EntryField::Email),
    Rule::MaxLength(EntryField::Email, MAX_LENGTH),
    Rule::EmailSyntax,
    Rule::EmailDeliverable,
];

fn field_value(entry: &Entry, field: EntryField) -> &str {
    match field {
        EntryField::Name => entry.name(),
        EntryField::Email => entry.email(),
        EntryField::ExcludedEntries => "",
    }
}

fn invalid_email_message(email: &str) -> String {
    format!("The email '{}' is not a valid email.", email)
}

pub fn is_valid_email_syntax(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Checks entries before they are saved. Violations are collected, never raised.
pub struct EntryValidator<R> {
    resolver: R,
}

impl<R> EntryValidator<R> where R: MailDomainResolver {
    pub fn new(resolver: R) -> Self {
        EntryValidator { resolver }
    }

    pub async fn validate(&self, entry: &Entry) -> Vec<Violation> {
        self.validate_groups(entry, &[], &[ValidationGroup::Default]).await
    }

    /// `pool_entries` are the saved entries of the entry's pool. They are only used
    /// by the exclusion rules.
    pub async fn validate_groups(&self, entry: &Entry, pool_entries: &[Entry], groups: &[ValidationGroup]) -> Vec<Violation> {
        let mut violations = vec![];

        if groups.contains(&ValidationGroup::Default) {
            violations.extend(self.check_default_rules(entry).await);
        }
        if groups.contains(&ValidationGroup::ExcludeEntries) {
            violations.extend(validate_excludes(entry, pool_entries));
        }

        debug!(entry_id = ?entry.id(), num_violations = violations.len(), "Validated entry");
        violations
    }

    async fn check_default_rules(&self, entry: &Entry) -> Vec<Violation> {
        let mut violations = vec![];
        let mut email_syntax_ok = false;

        for rule in DEFAULT_RULES {
            match *rule {
                Rule::NotBlank(field) => {
                    if field_value(entry, field).trim().is_empty() {
                        violations.push(Violation::new(field, "This value should not be blank."));
                    }
                },
                Rule::MaxLength(field, max) => {
                    if field_value(entry, field).chars().count() > max {
                        violations.push(Violation::new(field, format!("This value is too long. It should have {} characters or less.", max)));
                    }
                },
                Rule::EmailSyntax => {
                    let email = entry.email();
                    if email.is_empty() {
                        continue;
                    }
                    email_syntax_ok = is_valid_email_syntax(email);
                    if !email_syntax_ok {
                        violations.push(Violation::new(EntryField::Email, invalid_email_message(email)));
                    }
                },
                Rule::EmailDeliverable => {
                    if !email_syntax_ok {
                        continue;
                    }
                    let email = entry.email();
                    let domain = email.rsplit('@').next().unwrap_or_default();
                    if !self.resolver.accepts_mail(domain).await {
                        violations.push(Violation::new(EntryField::Email, invalid_email_message(email)));
                    }
                }
            }
        }

        violations
    }
}

/// Checks that the exclusions of `entry` still allow a complete draw of its pool.
///
/// The saved version of `entry` in `pool_entries` (if any) is replaced by `entry` itself.
pub fn validate_excludes(entry: &Entry, pool_entries: &[Entry]) -> Vec<Violation> {
    let mut violations = vec![];

    let mut participants : Vec<&Entry> = pool_entries.iter()
        .filter(|other| other.pool_id() == entry.pool_id())
        .filter(|other| other.id().is_none() || other.id() != entry.id())
        .collect();
    participants.push(entry);

    if let Some(id) = entry.id() {
        if entry.excluded_entries().contains(&id) {
            violations.push(Violation::new(EntryField::ExcludedEntries, "A participant can not exclude themselves."));
        }
    }

    let known_ids : HashSet<i32> = participants.iter().filter_map(|p| p.id()).collect();
    for excluded in entry.excluded_entries() {
        if Some(*excluded) != entry.id() && !known_ids.contains(excluded) {
            violations.push(Violation::new(EntryField::ExcludedEntries, format!("Participant {} is not part of this pool.", excluded)));
        }
    }

    if participants.len() < 2 {
        return violations;
    }

    let can_draw = |giver: &Entry, receiver: &Entry| -> bool {
        if std::ptr::eq(giver, receiver) {
            return false;
        }
        match receiver.id() {
            Some(receiver_id) => !giver.excluded_entries().contains(&receiver_id),
            None => true
        }
    };

    if !participants.iter().any(|receiver| can_draw(entry, *receiver)) {
        violations.push(Violation::new(EntryField::ExcludedEntries, "There is nobody left for this participant to draw."));
    }

    for receiver in participants.iter() {
        if !participants.iter().any(|giver| can_draw(*giver, *receiver)) {
            violations.push(Violation::new(EntryField::ExcludedEntries, format!("Nobody can draw {} with these exclusions.", receiver.name())));
        }
    }

    violations
}


#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use super::*;

    struct StaticResolver {
        accepted: Vec<&'static str>,
    }

    #[async_trait]
    impl MailDomainResolver for StaticResolver {
        async fn accepts_mail(&self, domain: &str) -> bool {
            self.accepted.contains(&domain)
        }
    }

    fn validator() -> EntryValidator<StaticResolver> {
        EntryValidator::new(StaticResolver { accepted: vec!["example.org"] })
    }

    fn saved_entry(id: i32, name: &str) -> Entry {
        Entry::new(1, name, format!("{}@example.org", name.to_lowercase())).with_id(id)
    }

    #[tokio::test]
    async fn test_valid_entry_has_no_violations() {
        let entry = Entry::new(1, "Alice", "alice@example.org");
        assert_eq!(validator().validate(&entry).await, vec![]);
    }

    #[tokio::test]
    async fn test_invalid_email_is_reported() {
        let entry = Entry::new(1, "Alice", "not-an-email");
        let violations = validator().validate(&entry).await;

        assert_eq!(violations, vec![Violation::new(EntryField::Email, "The email 'not-an-email' is not a valid email.")]);
    }

    #[tokio::test]
    async fn test_blank_name_is_reported() {
        let entry = Entry::new(1, "   ", "alice@example.org");
        let violations = validator().validate(&entry).await;

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, EntryField::Name);
    }

    #[tokio::test]
    async fn test_blank_email_is_only_reported_once() {
        let entry = Entry::new(1, "Alice", "");
        let violations = validator().validate(&entry).await;

        assert_eq!(violations, vec![Violation::new(EntryField::Email, "This value should not be blank.")]);
    }

    #[tokio::test]
    async fn test_undeliverable_domain_is_reported() {
        let entry = Entry::new(1, "Alice", "alice@nowhere.invalid");
        let violations = validator().validate(&entry).await;

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, EntryField::Email);
    }

    #[tokio::test]
    async fn test_too_long_name_is_reported() {
        let entry = Entry::new(1, "a".repeat(256), "alice@example.org");
        let violations = validator().validate(&entry).await;

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, EntryField::Name);
    }

    struct RecordingMxLookup {
        exchangers: Vec<(&'static str, &'static str)>,
        queried: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MxLookup for RecordingMxLookup {
        async fn mail_exchangers(&self, domain: &str) -> Result<Vec<String>, ResolveError> {
            self.queried.lock().unwrap().push(domain.to_string());
            let found = self.exchangers.iter()
                .filter(|(d, _)| *d == domain)
                .map(|(_, mx)| mx.to_string())
                .collect::<Vec<_>>();
            if found.is_empty() {
                Err(ResolveError::from("no MX records"))
            }
            else {
                Ok(found)
            }
        }
    }

    #[tokio::test]
    async fn test_mail_domain_is_checked_for_mx_records() {
        let resolver = DnsMailDomainResolver::with_lookup(RecordingMxLookup {
            exchangers: vec![("mail-only.example", "mx1.mail-only.example.")],
            queried: Mutex::new(vec![]),
        });
        let validator = EntryValidator::new(resolver);

        let accepted = Entry::new(1, "Alice", "alice@mail-only.example");
        assert!(validator.validate(&accepted).await.is_empty());

        let rejected = Entry::new(1, "Bob", "bob@web-only.example");
        assert_eq!(validator.validate(&rejected).await, vec![Violation::new(EntryField::Email, "The email 'bob@web-only.example' is not a valid email.")]);

        assert_eq!(*validator.resolver.lookup.queried.lock().unwrap(), vec!["mail-only.example", "web-only.example"]);
    }

    #[tokio::test]
    async fn test_skip_mail_domain_check() {
        let entry = Entry::new(1, "Alice", "alice@nowhere.invalid");
        let validator = EntryValidator::new(SkipMailDomainCheck);
        assert!(validator.validate(&entry).await.is_empty());
    }

    #[test]
    fn test_email_syntax() {
        assert!(is_valid_email_syntax("santa@north-pole.example.org"));
        assert!(is_valid_email_syntax("first.last+tag@example.co"));
        assert!(!is_valid_email_syntax("not-an-email"));
        assert!(!is_valid_email_syntax("two@@example.org"));
        assert!(!is_valid_email_syntax(".dot@example.org"));
        assert!(!is_valid_email_syntax("double..dot@example.org"));
        assert!(!is_valid_email_syntax("no-tld@example"));
        assert!(!is_valid_email_syntax("space in@example.org"));
    }

    #[test]
    fn test_excluding_self_is_reported() {
        let mut alice = saved_entry(1, "Alice");
        let bob = saved_entry(2, "Bob");
        let carol = saved_entry(3, "Carol");
        alice.add_excluded_entry(1);

        let violations = validate_excludes(&alice, &[alice.clone(), bob, carol]);
        assert_eq!(violations, vec![Violation::new(EntryField::ExcludedEntries, "A participant can not exclude themselves.")]);
    }

    #[test]
    fn test_excluding_foreign_entry_is_reported() {
        let mut alice = saved_entry(1, "Alice");
        let bob = saved_entry(2, "Bob");
        alice.add_excluded_entry(42);

        let violations = validate_excludes(&alice, &[bob]);
        assert_eq!(violations, vec![Violation::new(EntryField::ExcludedEntries, "Participant 42 is not part of this pool.")]);
    }

    #[test]
    fn test_excluding_everybody_is_reported() {
        let mut alice = saved_entry(1, "Alice");
        let bob = saved_entry(2, "Bob");
        let carol = saved_entry(3, "Carol");
        alice.add_excluded_entry(2).add_excluded_entry(3);

        let violations = validate_excludes(&alice, &[bob, carol]);
        assert!(violations.contains(&Violation::new(EntryField::ExcludedEntries, "There is nobody left for this participant to draw.")));
    }

    #[test]
    fn test_receiver_excluded_by_everybody_is_reported() {
        let mut alice = saved_entry(1, "Alice");
        let mut bob = saved_entry(2, "Bob");
        let carol = saved_entry(3, "Carol");
        bob.add_excluded_entry(3);
        alice.add_excluded_entry(3);

        let violations = validate_excludes(&alice, &[alice.clone(), bob, carol]);
        assert_eq!(violations, vec![Violation::new(EntryField::ExcludedEntries, "Nobody can draw Carol with these exclusions.")]);
    }

    #[test]
    fn test_consistent_exclusions_pass() {
        let mut alice = saved_entry(1, "Alice");
        let bob = saved_entry(2, "Bob");
        let carol = saved_entry(3, "Carol");
        alice.add_excluded_entry(2);

        assert!(validate_excludes(&alice, &[alice.clone(), bob, carol]).is_empty());
    }

    #[test]
    fn test_unsaved_entry_in_pool() {
        let alice = Entry::new(1, "Alice", "alice@example.org");
        let bob = saved_entry(2, "Bob");

        assert!(validate_excludes(&alice, &[bob]).is_empty());
    }

    #[tokio::test]
    async fn test_groups_are_selected() {
        let mut alice = Entry::new(1, "", "alice@example.org");
        alice.add_excluded_entry(42);

        let default_only = validator().validate_groups(&alice, &[], &[ValidationGroup::Default]).await;
        assert_eq!(default_only.iter().map(|v| v.field).collect::<Vec<_>>(), vec![EntryField::Name]);

        let excludes_only = validator().validate_groups(&alice, &[], &[ValidationGroup::ExcludeEntries]).await;
        assert_eq!(excludes_only.iter().map(|v| v.field).collect::<Vec<_>>(), vec![EntryField::ExcludedEntries]);
    }
}
