//! Payout account capture
//!
//! After approval, the policy holder who filed the claim supplies the bank
//! account the payout goes to. The account can be written exactly once.

use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use core_kernel::ClaimId;
use crate::actor::{Actor, Role};
use crate::claim::Claim;
use crate::error::{ClaimError, PreconditionViolation};
use crate::ports::{ClaimChange, ClaimStore, WriteCondition};
use crate::submission::required_text;

pub const MAX_ACCOUNT_NUMBER_LEN: usize = 20;
pub const MAX_IFSC_CODE_LEN: usize = 20;

/// Bank account number and IFSC code, always set together
#[derive(Clone, PartialEq, Eq)]
pub struct PayoutAccount {
    account_number: String,
    ifsc_code: String,
}

impl PayoutAccount {
    /// Trims both values; each must be non-empty and at most 20 characters.
    /// No routing validation is done on the IFSC code.
    pub fn new(account_number: &str, ifsc_code: &str) -> Result<Self, ClaimError> {
        let account_number = required_text(
            "account_number",
            account_number,
            "Account number is required",
            MAX_ACCOUNT_NUMBER_LEN,
        )?;
        let ifsc_code = required_text(
            "ifsc_code",
            ifsc_code,
            "IFSC code is required",
            MAX_IFSC_CODE_LEN,
        )?;
        Ok(Self { account_number, ifsc_code })
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn ifsc_code(&self) -> &str {
        &self.ifsc_code
    }

    /// `****` followed by the last four characters of the account number
    pub fn masked_account_number(&self) -> String {
        let chars: Vec<char> = self.account_number.chars().collect();
        let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
        format!("****{}", tail)
    }
}

impl fmt::Debug for PayoutAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayoutAccount")
            .field("account_number", &self.masked_account_number())
            .field("ifsc_code", &self.ifsc_code)
            .finish()
    }
}

/// Guarded single write of the payout account
pub struct PayoutAccountCapture {
    store: Arc<dyn ClaimStore>,
}

impl PayoutAccountCapture {
    pub fn new(store: Arc<dyn ClaimStore>) -> Self {
        Self { store }
    }

    /// Records the payout account on an approved claim owned by `actor`
    ///
    /// First write wins. A losing concurrent write is reported as
    /// `PayoutAlreadySet` when the winner set the account, and as a
    /// conflict otherwise.
    pub async fn capture(
        &self,
        actor: &Actor,
        claim_id: ClaimId,
        account_number: &str,
        ifsc_code: &str,
    ) -> Result<Claim, ClaimError> {
        actor.require(Role::PolicyHolder, "adding a payout account")?;
        let account = PayoutAccount::new(account_number, ifsc_code)?;

        let mut claim = self
            .store
            .get(claim_id)
            .await
            .map_err(|e| ClaimError::from_store_read(claim_id, e))?;

        if claim.policy_holder_id != actor.id {
            warn!(claim_id = %claim_id, actor = %actor.id, "Payout account rejected: not the filer");
            return Err(ClaimError::forbidden(format!(
                "claim {} was not filed by {}",
                claim_id, actor.id
            )));
        }

        if let Err(violation) = claim.attach_payout(account, Utc::now()) {
            warn!(claim_id = %claim_id, status = %claim.status, %violation, "Payout account rejected");
            return Err(violation.into());
        }
        claim.check_invariants()?;

        let written = self
            .store
            .update(&claim, ClaimChange::PayoutAccount, WriteCondition::approved_without_payout())
            .await;
        match written {
            Ok(()) => {
                info!(
                    claim_id = %claim_id,
                    account = %claim.payout.as_ref().map(|p| p.masked_account_number()).unwrap_or_default(),
                    "Payout account captured"
                );
                Ok(claim)
            }
            Err(e) if e.is_conflict() => {
                let current = self
                    .store
                    .get(claim_id)
                    .await
                    .map_err(|e| ClaimError::from_store_read(claim_id, e))?;
                warn!(claim_id = %claim_id, "Payout account write lost to a concurrent writer");
                if current.payout.is_some() {
                    Err(PreconditionViolation::PayoutAlreadySet.into())
                } else {
                    Err(ClaimError::conflict(
                        claim_id,
                        format!("claim changed concurrently and is now {}", current.status),
                    ))
                }
            }
            Err(e) => Err(ClaimError::from_store_write(claim_id, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payout_account_trims_and_bounds() {
        let account = PayoutAccount::new(" 1234567890 ", " HDFC0000123 ").unwrap();
        assert_eq!(account.account_number(), "1234567890");
        assert_eq!(account.ifsc_code(), "HDFC0000123");

        let err = PayoutAccount::new("", "HDFC0000123").unwrap_err();
        assert_eq!(err.field(), Some("account_number"));
        let err = PayoutAccount::new("123", &"I".repeat(21)).unwrap_err();
        assert_eq!(err.field(), Some("ifsc_code"));
    }

    #[test]
    fn test_masking() {
        let account = PayoutAccount::new("000123456789", "SBIN0000001").unwrap();
        assert_eq!(account.masked_account_number(), "****6789");
        assert!(!format!("{:?}", account).contains("000123456789"));

        let short = PayoutAccount::new("42", "SBIN0000001").unwrap();
        assert_eq!(short.masked_account_number(), "****42");
    }
}
