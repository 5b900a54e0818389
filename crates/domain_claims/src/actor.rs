//! Acting users and their role capability
//!
//! The identity provider authenticates the caller; the engine receives the
//! resulting `Actor` and only checks capabilities against it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::UserId;
use crate::error::ClaimError;

/// Role capability granted by the identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Files claims and captures payout details
    PolicyHolder,
    /// Verifies and decides claims
    InsuranceWorker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::PolicyHolder => "policy_holder",
            Role::InsuranceWorker => "insurance_worker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "policy_holder" => Ok(Role::PolicyHolder),
            "insurance_worker" => Ok(Role::InsuranceWorker),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// An authenticated user acting on the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn policy_holder(id: UserId) -> Self {
        Self { id, role: Role::PolicyHolder }
    }

    pub fn insurance_worker(id: UserId) -> Self {
        Self { id, role: Role::InsuranceWorker }
    }

    pub fn is_reviewer(&self) -> bool {
        self.role == Role::InsuranceWorker
    }

    /// Fails with `Forbidden` unless the actor holds `role`
    pub fn require(&self, role: Role, action: &str) -> Result<(), ClaimError> {
        if self.role == role {
            Ok(())
        } else {
            Err(ClaimError::forbidden(format!(
                "{} requires the {} role, actor {} is {}",
                action, role, self.id, self.role
            )))
        }
    }
}
