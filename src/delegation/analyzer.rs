//! Kerberos delegation classification for a single account.

use strum::{Display, IntoStaticStr};

use crate::{
    config::DecoderConfig,
    delegation::uac::UserAccountControl,
    descriptor::{AccessControlEntry, SecurityDescriptor, SecurityIdentifier},
    diagnostics::{Decoded, DiagnosticCategory, Diagnostics},
    Result,
};

/// Delegation-relevant attributes of one directory account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelegationInput {
    /// `userAccountControl`
    pub account_control: UserAccountControl,
    /// `servicePrincipalName` values
    pub spns: Vec<String>,
    /// `msDS-AllowedToDelegateTo` values
    pub allowed_targets: Vec<String>,
    /// Raw `msDS-AllowedToActOnBehalfOfOtherIdentity` descriptor
    pub resource_based: Option<Vec<u8>>,
}

impl DelegationInput {
    /// Creates an input with the given `userAccountControl` value and nothing else set.
    #[must_use]
    pub fn new(account_control: impl Into<UserAccountControl>) -> Self {
        DelegationInput {
            account_control: account_control.into(),
            ..Default::default()
        }
    }

    /// Sets the service principal names.
    #[must_use]
    pub fn with_spns<I, S>(mut self, spns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spns = spns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the constrained delegation targets.
    #[must_use]
    pub fn with_allowed_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_targets = targets.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the resource-based constrained delegation descriptor.
    #[must_use]
    pub fn with_resource_based(mut self, descriptor: impl Into<Vec<u8>>) -> Self {
        self.resource_based = Some(descriptor.into());
        self
    }
}

/// A kind of delegation an account is configured for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum Finding {
    /// The account may impersonate any user to any service
    #[strum(serialize = "Unconstrained")]
    Unconstrained,
    /// The account may delegate to `targets`, only with a Kerberos ticket from the user
    #[strum(serialize = "Constrained (Kerberos only)")]
    ConstrainedKerberosOnly {
        /// Service principal names delegation is allowed to
        targets: Vec<String>,
    },
    /// The account may delegate to `targets` and obtain tickets for any user on its own
    #[strum(serialize = "Constrained (any protocol)")]
    ConstrainedAnyProtocol {
        /// Service principal names delegation is allowed to
        targets: Vec<String>,
    },
    /// `actors` may delegate to this account
    #[strum(serialize = "Resource-based")]
    ResourceBased {
        /// Trustees granted access in the resource-based descriptor, in DACL order
        actors: Vec<SecurityIdentifier>,
    },
}

impl Finding {
    /// Returns `true` for configurations that allow impersonating arbitrary users without
    /// their Kerberos ticket.
    #[must_use]
    pub fn is_high_risk(&self) -> bool {
        matches!(
            self,
            Finding::Unconstrained | Finding::ConstrainedAnyProtocol { .. }
        )
    }
}

/// Classifies the delegation configuration of an account with [`DecoderConfig::default`].
///
/// # Errors
/// Any error of [`SecurityDescriptor::decode_with`] for the resource-based descriptor.
///
/// # Examples
///
/// ```rust
/// use sdscope::delegation::{analyze, DelegationInput, Finding};
///
/// let input = DelegationInput::new(0x0108_0000u32)
///     .with_allowed_targets(["cifs/fs01.corp.example"]);
/// let findings = analyze(&input)?.value;
///
/// assert_eq!(findings[0], Finding::Unconstrained);
/// assert!(matches!(findings[1], Finding::ConstrainedAnyProtocol { .. }));
/// # Ok::<(), sdscope::Error>(())
/// ```
pub fn analyze(input: &DelegationInput) -> Result<Decoded<Vec<Finding>>> {
    analyze_with(input, &DecoderConfig::default())
}

/// Classifies the delegation configuration of an account.
///
/// Findings are produced in the order unconstrained, constrained, resource-based, and
/// several may apply to the same account.
///
/// # Errors
/// Any error of [`SecurityDescriptor::decode_with`] for the resource-based descriptor.
pub fn analyze_with(
    input: &DelegationInput,
    config: &DecoderConfig,
) -> Result<Decoded<Vec<Finding>>> {
    let mut diagnostics = Diagnostics::new();
    let mut findings = Vec::new();
    let uac = input.account_control;

    if uac.contains(UserAccountControl::TRUSTED_FOR_DELEGATION) {
        if uac.is_domain_controller() {
            diagnostics.info(
                DiagnosticCategory::Delegation,
                "unconstrained delegation on a domain controller account",
            );
        }
        findings.push(Finding::Unconstrained);
    }

    let any_protocol = uac.contains(UserAccountControl::TRUSTED_TO_AUTH_FOR_DELEGATION);
    if input.allowed_targets.is_empty() {
        if any_protocol {
            diagnostics.warning(
                DiagnosticCategory::Delegation,
                "protocol transition is enabled but no delegation targets are set",
            );
        }
    } else {
        let targets = input.allowed_targets.clone();
        findings.push(if any_protocol {
            Finding::ConstrainedAnyProtocol { targets }
        } else {
            Finding::ConstrainedKerberosOnly { targets }
        });

        if input.spns.is_empty() {
            diagnostics.info(
                DiagnosticCategory::Delegation,
                "delegation targets are set but the account has no service principal name",
            );
        }
    }

    if uac.contains(UserAccountControl::NOT_DELEGATED) {
        diagnostics.info(
            DiagnosticCategory::Delegation,
            "account is marked sensitive and cannot be delegated",
        );
    }

    if let Some(blob) = &input.resource_based {
        let decoded = SecurityDescriptor::decode_with(blob, config)?;
        diagnostics.extend(decoded.diagnostics);

        match &decoded.value.dacl {
            Some(dacl) => {
                if dacl.iter().any(AccessControlEntry::is_deny) {
                    diagnostics.warning(
                        DiagnosticCategory::Delegation,
                        "resource-based delegation descriptor contains deny entries",
                    );
                }
                findings.push(Finding::ResourceBased {
                    actors: resource_based_actors(&decoded.value),
                });
            }
            None => {
                diagnostics.warning(
                    DiagnosticCategory::Delegation,
                    "resource-based delegation descriptor has no DACL",
                );
                findings.push(Finding::ResourceBased { actors: Vec::new() });
            }
        }
    }

    log::debug!(
        "delegation analysis: uac {:#010x}, {} findings",
        uac.bits(),
        findings.len()
    );
    Ok(Decoded::new(findings, diagnostics))
}

/// Trustees granted an allow entry that applies to the object itself, deduplicated in DACL
/// order.
pub(crate) fn resource_based_actors(descriptor: &SecurityDescriptor) -> Vec<SecurityIdentifier> {
    let mut actors: Vec<SecurityIdentifier> = Vec::new();
    for entry in descriptor.dacl.iter().flatten() {
        if !entry.is_allow() || entry.is_inherit_only() {
            continue;
        }
        if let Some(trustee) = entry.trustee() {
            if !actors.contains(trustee) {
                actors.push(trustee.clone());
            }
        }
    }
    actors
}
