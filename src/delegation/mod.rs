//! Delegation and service account analysis.
//!
//! Works on attribute values an LDAP client already fetched: the `userAccountControl`
//! integer, SPN and target strings, and the raw descriptor blobs of
//! `msDS-AllowedToActOnBehalfOfOtherIdentity` and `msDS-GroupMSAMembership`.
//!
//! # Key Components
//!
//! - [`analyze`] / [`Finding`] - Unconstrained, constrained and resource-based delegation
//! - [`assess`] - Service account recognition and risk rating
//! - [`managed_password_readers`] - Who may read a gMSA password
//! - [`UserAccountControl`] - Account control flags

mod analyzer;
mod serviceaccount;
mod uac;

pub use analyzer::{analyze, analyze_with, DelegationInput, Finding};
pub use serviceaccount::{
    assess, is_service_account, managed_password_readers, RiskLevel, ServiceAccountAssessment,
    ServiceAccountInput, ServiceAccountRisk, STALE_PASSWORD_DAYS,
};
pub use uac::UserAccountControl;
