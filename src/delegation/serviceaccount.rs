//! Service account heuristics and group managed service account readers.

use std::fmt;

use crate::{
    config::DecoderConfig,
    delegation::{analyzer::resource_based_actors, uac::UserAccountControl},
    descriptor::{SecurityDescriptor, SecurityIdentifier},
    diagnostics::{Decoded, DiagnosticCategory, Diagnostics},
    Result,
};

/// Password age after which a service account password counts as stale.
pub const STALE_PASSWORD_DAYS: u64 = 365;

/// Attributes used to recognize and assess a service account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceAccountInput {
    /// `userAccountControl`
    pub account_control: UserAccountControl,
    /// `sAMAccountName`
    pub sam_account_name: String,
    /// `description`
    pub description: Option<String>,
    /// `servicePrincipalName` values
    pub spns: Vec<String>,
    /// Days since `pwdLastSet`, if the password was ever set
    pub password_age_days: Option<u64>,
}

/// One risk of a service account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceAccountRisk {
    /// Enabled account with an SPN, so anyone can request a ticket encrypted with its key
    Kerberoastable,
    /// The password never expires
    PasswordNeverExpires,
    /// The password was last set this many days ago
    StalePassword(u64),
    /// Trusted for unconstrained delegation
    UnconstrainedDelegation,
    /// Trusted for constrained delegation with protocol transition
    ConstrainedDelegation,
}

impl fmt::Display for ServiceAccountRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceAccountRisk::Kerberoastable => write!(f, "Kerberoastable"),
            ServiceAccountRisk::PasswordNeverExpires => write!(f, "Password Never Expires"),
            ServiceAccountRisk::StalePassword(days) => write!(f, "Password {}d old", days),
            ServiceAccountRisk::UnconstrainedDelegation => write!(f, "Unconstrained Delegation"),
            ServiceAccountRisk::ConstrainedDelegation => write!(f, "Constrained Delegation"),
        }
    }
}

/// Overall rating derived from the number of risks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
pub enum RiskLevel {
    /// No risks
    #[strum(serialize = "low")]
    Low,
    /// One or two risks
    #[strum(serialize = "medium")]
    Medium,
    /// Three or more risks
    #[strum(serialize = "high")]
    High,
}

impl RiskLevel {
    fn from_count(count: usize) -> Self {
        match count {
            0 => RiskLevel::Low,
            1 | 2 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }
}

/// Result of [`assess`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAccountAssessment {
    /// Risks in a fixed order: Kerberoasting, password, delegation
    pub risks: Vec<ServiceAccountRisk>,
    /// Rating derived from the number of risks
    pub level: RiskLevel,
}

/// Returns `true` if the account looks like a service account.
///
/// An account qualifies if its password never expires, it has an SPN, or its name or
/// description mentions a service (`svc` prefix, `service` anywhere).
#[must_use]
pub fn is_service_account(input: &ServiceAccountInput) -> bool {
    let sam = input.sam_account_name.to_lowercase();
    let description = input
        .description
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();

    input
        .account_control
        .contains(UserAccountControl::DONT_EXPIRE_PASSWORD)
        || !input.spns.is_empty()
        || sam.starts_with("svc")
        || sam.contains("service")
        || description.contains("service")
}

/// Assesses a service account, or returns `None` if the account does not look like one.
///
/// # Examples
///
/// ```rust
/// use sdscope::delegation::{assess, RiskLevel, ServiceAccountInput};
///
/// let input = ServiceAccountInput {
///     account_control: 0x0001_0200u32.into(),
///     sam_account_name: "svc_sql".into(),
///     spns: vec!["MSSQLSvc/db01.corp.example:1433".into()],
///     password_age_days: Some(900),
///     ..Default::default()
/// };
///
/// let assessment = assess(&input).unwrap();
/// assert_eq!(assessment.level, RiskLevel::High);
/// ```
#[must_use]
pub fn assess(input: &ServiceAccountInput) -> Option<ServiceAccountAssessment> {
    if !is_service_account(input) {
        return None;
    }

    let uac = input.account_control;
    let mut risks = Vec::new();

    if !input.spns.is_empty() && !uac.is_disabled() {
        risks.push(ServiceAccountRisk::Kerberoastable);
    }
    if uac.contains(UserAccountControl::DONT_EXPIRE_PASSWORD) {
        risks.push(ServiceAccountRisk::PasswordNeverExpires);
    }
    if let Some(days) = input.password_age_days {
        if days > STALE_PASSWORD_DAYS {
            risks.push(ServiceAccountRisk::StalePassword(days));
        }
    }
    if uac.contains(UserAccountControl::TRUSTED_FOR_DELEGATION) {
        risks.push(ServiceAccountRisk::UnconstrainedDelegation);
    }
    if uac.contains(UserAccountControl::TRUSTED_TO_AUTH_FOR_DELEGATION) {
        risks.push(ServiceAccountRisk::ConstrainedDelegation);
    }

    let level = RiskLevel::from_count(risks.len());
    Some(ServiceAccountAssessment { risks, level })
}

/// Principals allowed to retrieve the password of a group managed service account.
///
/// Decodes an `msDS-GroupMSAMembership` descriptor and returns the trustees of its allow
/// entries, deduplicated in DACL order.
///
/// # Errors
/// Any error of [`SecurityDescriptor::decode`].
pub fn managed_password_readers(blob: &[u8]) -> Result<Decoded<Vec<SecurityIdentifier>>> {
    let decoded = SecurityDescriptor::decode_with(blob, &DecoderConfig::default())?;
    let mut diagnostics = Diagnostics::new();
    diagnostics.extend(decoded.diagnostics);

    if decoded.value.dacl.is_none() {
        diagnostics.warning(
            DiagnosticCategory::Delegation,
            "managed password membership descriptor has no DACL",
        );
    }

    Ok(Decoded::new(resource_based_actors(&decoded.value), diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::builders::{ace_bytes, acl_bytes, sid_bytes, DescriptorBuilder};

    fn account(uac: u32, sam: &str) -> ServiceAccountInput {
        ServiceAccountInput {
            account_control: uac.into(),
            sam_account_name: sam.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn recognition() {
        assert!(!is_service_account(&account(0x0200, "jdoe")));
        assert!(is_service_account(&account(0x0200, "SVC-backup")));
        assert!(is_service_account(&account(0x0200, "BackupService")));
        assert!(is_service_account(&account(0x0001_0200, "jdoe")));

        let mut described = account(0x0200, "app01");
        described.description = Some("Service for the ERP import".into());
        assert!(is_service_account(&described));

        let mut with_spn = account(0x0200, "app01");
        with_spn.spns = vec!["http/app01".into()];
        assert!(is_service_account(&with_spn));

        assert_eq!(assess(&account(0x0200, "jdoe")), None);
    }

    #[test]
    fn risks_in_order() {
        let mut input = account(0x0109_0200, "svc_web");
        input.spns = vec!["http/web01".into()];
        input.password_age_days = Some(400);

        let assessment = assess(&input).unwrap();
        assert_eq!(
            assessment.risks,
            [
                ServiceAccountRisk::Kerberoastable,
                ServiceAccountRisk::PasswordNeverExpires,
                ServiceAccountRisk::StalePassword(400),
                ServiceAccountRisk::UnconstrainedDelegation,
                ServiceAccountRisk::ConstrainedDelegation,
            ]
        );
        assert_eq!(assessment.level, RiskLevel::High);
        assert_eq!(assessment.risks[2].to_string(), "Password 400d old");
    }

    #[test]
    fn levels() {
        assert_eq!(assess(&account(0x0200, "svc_idle")).unwrap().level, RiskLevel::Low);

        let mut disabled = account(0x0202, "svc_old");
        disabled.spns = vec!["http/old".into()];
        disabled.password_age_days = Some(365);
        let assessment = assess(&disabled).unwrap();
        assert!(assessment.risks.is_empty());
        assert_eq!(assessment.level.to_string(), "low");

        let assessment = assess(&account(0x0001_0200, "svc_batch")).unwrap();
        assert_eq!(assessment.level, RiskLevel::Medium);
    }

    #[test]
    fn password_readers() {
        let servers = sid_bytes(5, &[21, 10, 20, 30, 1200]);
        let blob = DescriptorBuilder::new()
            .with_control(0x8004)
            .with_owner(sid_bytes(5, &[32, 544]))
            .with_dacl(acl_bytes(
                2,
                &[
                    ace_bytes(0x00, 0x00, 0x000F_01FF, &servers),
                    ace_bytes(0x00, 0x00, 0x000F_01FF, &servers),
                ],
            ))
            .build();

        let readers = managed_password_readers(&blob).unwrap();
        assert_eq!(readers.value.len(), 1);
        assert_eq!(readers.value[0].to_string(), "S-1-5-21-10-20-30-1200");
        assert!(readers.diagnostics.is_empty());
    }

    #[test]
    fn password_readers_without_dacl() {
        let blob = DescriptorBuilder::new().build();
        let readers = managed_password_readers(&blob).unwrap();
        assert!(readers.value.is_empty());
        assert!(readers.has_warnings());
    }
}
