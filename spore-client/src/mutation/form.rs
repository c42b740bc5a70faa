//! Form values and validation for mutation modals.

use std::collections::BTreeMap;
use std::fmt;

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<&'static str, String>);

impl FormErrors {
    /// No errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error on `field`, keeping the first one.
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Message for `field`, if invalid.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether the form is valid.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Whether `value` holds anything besides whitespace.
pub fn is_not_empty(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Destination of a transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferForm {
    /// Receiving address.
    pub to: String,
}

impl TransferForm {
    /// Form sending to `to`.
    pub fn to(to: impl Into<String>) -> Self {
        Self { to: to.into() }
    }

    pub(crate) fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        if !is_not_empty(&self.to) {
            errors.insert("to", "address cannot be empty");
        }
        errors
    }
}

/// Content of a new spore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MintForm {
    /// MIME type of `content`.
    pub content_type: String,
    /// Raw content bytes.
    pub content: Vec<u8>,
}

impl MintForm {
    pub(crate) fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        if !is_not_empty(&self.content_type) {
            errors.insert("content_type", "content type cannot be empty");
        }
        if self.content.is_empty() {
            errors.insert("content", "content cannot be empty");
        }
        errors
    }
}

/// Shorten an address to its first and last `keep` characters.
///
/// Always renders both ends, so values of `2 * keep` characters or fewer
/// overlap.
///
/// ```
/// use spore_client::mutation::truncate_middle;
///
/// assert_eq!(truncate_middle("ckt1qzda0cr08m85hc8jlnfp3zer7xulejywt49kt2rr0vthywaa50xwsq", 6), "ckt1qz...50xwsq");
/// assert_eq!(truncate_middle("short", 6), "short...short");
/// ```
pub fn truncate_middle(value: &str, keep: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    let head: String = chars.iter().take(keep).collect();
    let tail: String = chars[chars.len().saturating_sub(keep)..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_always_shows_both_ends() {
        assert_eq!(truncate_middle("abcdefghijklmn", 6), "abcdef...ijklmn");
        assert_eq!(truncate_middle("abcdefghijkl", 6), "abcdef...ghijkl");
        assert_eq!(truncate_middle("abc", 6), "abc...abc");
        assert_eq!(truncate_middle("", 6), "...");
    }

    #[test]
    fn transfer_requires_address() {
        assert_eq!(
            TransferForm::to("  ").validate().get("to"),
            Some("address cannot be empty")
        );
        assert!(TransferForm::to("ckt1qyq").validate().is_empty());
    }

    #[test]
    fn mint_requires_content() {
        let errors = MintForm::default().validate();
        assert!(errors.get("content").is_some());
        assert!(errors.get("content_type").is_some());
        assert_eq!(
            errors.to_string(),
            "content: content cannot be empty; content_type: content type cannot be empty"
        );
    }

    #[test]
    fn first_error_wins() {
        let mut errors = FormErrors::new();
        errors.insert("to", "first");
        errors.insert("to", "second");
        assert_eq!(errors.get("to"), Some("first"));
    }
}
