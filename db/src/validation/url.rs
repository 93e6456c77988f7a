use url::{Host, Url};

use super::Validator;

/// Refuses tokens that look like links, with or without a scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlValidator;

impl UrlValidator {
    fn looks_like_url(word: &str) -> bool {
        let word = word.trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | ')'));

        if let Ok(url) = Url::parse(word) {
            if url.has_host() {
                return true;
            }
        }

        if !word.contains('.') {
            return false;
        }

        // bare hosts like `example.com/path`
        match Url::parse(&format!("http://{word}")) {
            Ok(url) => match url.host() {
                Some(Host::Domain(domain)) => has_plausible_tld(domain),
                Some(Host::Ipv4(_) | Host::Ipv6(_)) => word.split('.').count() == 4,
                None => false,
            },
            Err(_) => false,
        }
    }
}

fn has_plausible_tld(domain: &str) -> bool {
    let mut labels = domain.split('.');
    let Some(tld) = labels.next_back() else {
        return false;
    };

    labels.clone().count() >= 1
        && labels.all(|label| !label.is_empty())
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}

impl Validator for UrlValidator {
    fn name(&self) -> &'static str {
        "url"
    }

    fn verify(&self, word: &str) -> Result<(), String> {
        if Self::looks_like_url(word) {
            return Err(format!("found link {word}"));
        }

        Ok(())
    }
}
