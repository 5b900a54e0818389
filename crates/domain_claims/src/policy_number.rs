//! Policy number classification
//!
//! Maps a raw policy number onto the insurer that issued it. Each insurer
//! uses a distinct numbering scheme, so the format alone identifies the
//! company:
//!
//! | Insurer                  | Format                                  | Example                   |
//! |--------------------------|-----------------------------------------|---------------------------|
//! | LIC                      | exactly 9 digits                        | `123456789`               |
//! | HDFC Ergo                | exactly 10 digits                       | `1234567890`              |
//! | Muthoot Health Insurance | `<letters>-<4 digits>-<6 digits>`       | `MHI-2025-009876`         |
//! | Star Health Insurance    | `<letters>/<segments>/<digits>`         | `P/141113/01/2025/012345` |
//! | ICICI Lombard            | 11+ alphanumerics with a letter and a digit | `ABCDE123456`         |
//!
//! Rules are tried in table order and the first match wins. The function is
//! pure and total, so clients may call it on every keystroke.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Message reported for a non-empty policy number that matches no scheme
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid policy number format.";

/// Insurer identified from a policy number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsuranceCompany {
    #[serde(rename = "LIC")]
    Lic,
    #[serde(rename = "HDFC Ergo")]
    HdfcErgo,
    #[serde(rename = "Muthoot Health Insurance")]
    MuthootHealth,
    #[serde(rename = "Star Health Insurance")]
    StarHealth,
    #[serde(rename = "ICICI Lombard")]
    IciciLombard,
}

impl InsuranceCompany {
    pub const ALL: [InsuranceCompany; 5] = [
        InsuranceCompany::Lic,
        InsuranceCompany::HdfcErgo,
        InsuranceCompany::MuthootHealth,
        InsuranceCompany::StarHealth,
        InsuranceCompany::IciciLombard,
    ];

    /// Display name, also used as the persisted form
    pub fn name(&self) -> &'static str {
        match self {
            InsuranceCompany::Lic => "LIC",
            InsuranceCompany::HdfcErgo => "HDFC Ergo",
            InsuranceCompany::MuthootHealth => "Muthoot Health Insurance",
            InsuranceCompany::StarHealth => "Star Health Insurance",
            InsuranceCompany::IciciLombard => "ICICI Lombard",
        }
    }
}

impl fmt::Display for InsuranceCompany {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InsuranceCompany {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InsuranceCompany::ALL
            .into_iter()
            .find(|company| company.name() == s)
            .ok_or_else(|| format!("unknown insurance company '{}'", s))
    }
}

/// Outcome of classifying a policy number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyClassification {
    pub company: Option<InsuranceCompany>,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PolicyClassification {
    fn matched(company: InsuranceCompany) -> Self {
        Self {
            company: Some(company),
            valid: true,
            error: None,
        }
    }

    /// Nothing entered yet. Not an error.
    fn empty() -> Self {
        Self {
            company: None,
            valid: false,
            error: None,
        }
    }

    fn invalid() -> Self {
        Self {
            company: None,
            valid: false,
            error: Some(INVALID_FORMAT_MESSAGE.to_string()),
        }
    }

    /// Returns the insurer when classification succeeded
    pub fn company(&self) -> Option<InsuranceCompany> {
        if self.valid { self.company } else { None }
    }
}

/// Classifies a raw policy number
///
/// # Examples
///
/// ```rust
/// use domain_claims::policy_number::{classify, InsuranceCompany};
///
/// assert_eq!(classify(" 123456789 ").company, Some(InsuranceCompany::Lic));
/// assert!(!classify("12345678").valid);
/// ```
pub fn classify(raw: &str) -> PolicyClassification {
    let policy = raw.trim();
    if policy.is_empty() {
        return PolicyClassification::empty();
    }

    if is_digits(policy, 9) {
        return PolicyClassification::matched(InsuranceCompany::Lic);
    }
    if is_digits(policy, 10) {
        return PolicyClassification::matched(InsuranceCompany::HdfcErgo);
    }
    if is_muthoot_format(policy) {
        return PolicyClassification::matched(InsuranceCompany::MuthootHealth);
    }
    if is_star_health_format(policy) {
        return PolicyClassification::matched(InsuranceCompany::StarHealth);
    }
    if is_icici_lombard_format(policy) {
        return PolicyClassification::matched(InsuranceCompany::IciciLombard);
    }

    PolicyClassification::invalid()
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn all_letters(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphabetic())
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && all_digits(s)
}

/// `<letters>-<4 digits>-<6 digits>`
fn is_muthoot_format(s: &str) -> bool {
    let mut parts = s.split('-');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(prefix), Some(year), Some(serial), None) => {
            all_letters(prefix) && is_digits(year, 4) && is_digits(serial, 6)
        }
        _ => false,
    }
}

/// `<letters>/<word chars or slashes>/<digits>`
fn is_star_health_format(s: &str) -> bool {
    let Some((prefix, rest)) = s.split_once('/') else {
        return false;
    };
    if !all_letters(prefix) {
        return false;
    }
    // The trailing digit run cannot contain a slash, so it must follow the last one
    let Some((middle, serial)) = rest.rsplit_once('/') else {
        return false;
    };
    !middle.is_empty()
        && middle.bytes().all(|b| is_word_byte(b) || b == b'/')
        && all_digits(serial)
}

/// 11+ ASCII alphanumerics with at least one letter and one digit
fn is_icici_lombard_format(s: &str) -> bool {
    s.len() >= 11
        && s.bytes().all(|b| b.is_ascii_alphanumeric())
        && s.bytes().any(|b| b.is_ascii_alphabetic())
        && s.bytes().any(|b| b.is_ascii_digit())
}
