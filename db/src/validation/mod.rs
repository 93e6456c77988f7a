//! Word-by-word screening of user supplied text.
//!
//! A [`ValidationChain`] runs every whitespace-delimited token of a field
//! through each registered [`Validator`] in order and stops at the first
//! rejection.

use std::{fmt, sync::Arc};

use serde::Serialize;
use thiserror::Error;

pub mod keywords;
pub mod url;

pub use keywords::{Keyword, KeywordCache};
pub use url::UrlValidator;

/// Anything that can accept or refuse a single word.
pub trait Validator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the reason when `word` must not be stored.
    fn verify(&self, word: &str) -> Result<(), String>;
}

impl<V: Validator + ?Sized> Validator for Arc<V> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn verify(&self, word: &str) -> Result<(), String> {
        (**self).verify(word)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{field} rejected by {validator} validator: {reason}")]
pub struct Rejection {
    pub field: &'static str,
    pub validator: &'static str,
    pub word: String,
    pub reason: String,
}

#[derive(Clone, Default)]
pub struct ValidationChain {
    validators: Vec<Arc<dyn Validator>>,
}

impl fmt::Debug for ValidationChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.validators.iter().map(|v| v.name()))
            .finish()
    }
}

impl ValidationChain {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, validator: impl Validator + 'static) -> Self {
        self.push(Arc::new(validator));
        self
    }

    pub fn push(&mut self, validator: Arc<dyn Validator>) {
        self.validators.push(validator);
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn verify_text(&self, field: &'static str, text: &str) -> Result<(), Rejection> {
        for word in text.split_whitespace() {
            for validator in &self.validators {
                if let Err(reason) = validator.verify(word) {
                    tracing::warn!(
                        field,
                        validator = validator.name(),
                        word,
                        reason,
                        "Rejected text"
                    );

                    return Err(Rejection {
                        field,
                        validator: validator.name(),
                        word: word.to_string(),
                        reason,
                    });
                }
            }
        }

        Ok(())
    }

    /// Checks several named fields, reporting the first failing one.
    pub fn verify_fields(&self, fields: &[(&'static str, &str)]) -> Result<(), Rejection> {
        fields
            .iter()
            .try_for_each(|(field, text)| self.verify_text(field, text))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct Forbid(&'static str);

    impl Validator for Forbid {
        fn name(&self) -> &'static str {
            "forbid"
        }

        fn verify(&self, word: &str) -> Result<(), String> {
            if word == self.0 {
                Err(format!("found {word}"))
            } else {
                Ok(())
            }
        }
    }

    struct Counting(Arc<AtomicUsize>);

    impl Validator for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn verify(&self, _word: &str) -> Result<(), String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn empty_chain_accepts_everything() {
        let chain = ValidationChain::new();
        assert!(chain.is_empty());
        assert!(chain.verify_text("name", "anything goes").is_ok());
    }

    #[test]
    fn rejection_names_field_word_and_validator() {
        let chain = ValidationChain::new().with(Forbid("spam"));

        let rejection = chain
            .verify_text("description", "fresh spam salad")
            .unwrap_err();

        assert_eq!(rejection.field, "description");
        assert_eq!(rejection.validator, "forbid");
        assert_eq!(rejection.word, "spam");
        assert_eq!(rejection.reason, "found spam");
    }

    #[test]
    fn chain_stops_at_first_rejection() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = ValidationChain::new()
            .with(Forbid("bad"))
            .with(Counting(calls.clone()));

        let result = chain.verify_text("name", "good bad ugly");

        assert!(result.is_err());
        // "good" reached the second validator, "bad" stopped at the first
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn verify_fields_reports_the_failing_field() {
        let chain = ValidationChain::new().with(Forbid("bad"));

        let rejection = chain
            .verify_fields(&[("name", "Greek"), ("description", "a bad one")])
            .unwrap_err();

        assert_eq!(rejection.field, "description");
    }

    #[test]
    fn tokens_split_on_any_whitespace() {
        let chain = ValidationChain::new().with(Forbid("bad"));

        assert!(chain.verify_text("name", "tab\tbad").is_err());
        assert!(chain.verify_text("name", "line\nbad").is_err());
        assert!(chain.verify_text("name", "notbad").is_ok());
    }
}
