//! The `userAccountControl` flag set.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    /// Bits of the `userAccountControl` attribute
    pub struct UserAccountControl: u32 {
        /// The logon script is executed
        const SCRIPT = 0x0000_0001;
        /// The account is disabled
        const ACCOUNTDISABLE = 0x0000_0002;
        /// A home folder is required
        const HOMEDIR_REQUIRED = 0x0000_0008;
        /// The account is locked out
        const LOCKOUT = 0x0000_0010;
        /// No password is required
        const PASSWD_NOTREQD = 0x0000_0020;
        /// The user cannot change the password
        const PASSWD_CANT_CHANGE = 0x0000_0040;
        /// The password is stored with reversible encryption
        const ENCRYPTED_TEXT_PWD_ALLOWED = 0x0000_0080;
        /// Local account for users whose primary account is in another domain
        const TEMP_DUPLICATE_ACCOUNT = 0x0000_0100;
        /// Default account type of a user
        const NORMAL_ACCOUNT = 0x0000_0200;
        /// Trust account of a trusting domain
        const INTERDOMAIN_TRUST_ACCOUNT = 0x0000_0800;
        /// Computer account of a workstation or member server
        const WORKSTATION_TRUST_ACCOUNT = 0x0000_1000;
        /// Computer account of a domain controller
        const SERVER_TRUST_ACCOUNT = 0x0000_2000;
        /// The password never expires
        const DONT_EXPIRE_PASSWORD = 0x0001_0000;
        /// MNS logon account
        const MNS_LOGON_ACCOUNT = 0x0002_0000;
        /// Interactive logon requires a smart card
        const SMARTCARD_REQUIRED = 0x0004_0000;
        /// Trusted for unconstrained Kerberos delegation
        const TRUSTED_FOR_DELEGATION = 0x0008_0000;
        /// The account's credentials cannot be delegated
        const NOT_DELEGATED = 0x0010_0000;
        /// Only DES encryption types are used
        const USE_DES_KEY_ONLY = 0x0020_0000;
        /// Kerberos pre-authentication is not required
        const DONT_REQ_PREAUTH = 0x0040_0000;
        /// The password has expired
        const PASSWORD_EXPIRED = 0x0080_0000;
        /// Constrained delegation may use protocol transition (S4U2Self)
        const TRUSTED_TO_AUTH_FOR_DELEGATION = 0x0100_0000;
        /// Read-only domain controller account
        const PARTIAL_SECRETS_ACCOUNT = 0x0400_0000;
    }
}

impl UserAccountControl {
    /// Returns `true` for disabled accounts.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.contains(UserAccountControl::ACCOUNTDISABLE)
    }

    /// Returns `true` for domain controller computer accounts, writable or read-only.
    #[must_use]
    pub fn is_domain_controller(&self) -> bool {
        self.intersects(
            UserAccountControl::SERVER_TRUST_ACCOUNT | UserAccountControl::PARTIAL_SECRETS_ACCOUNT,
        )
    }
}

impl From<u32> for UserAccountControl {
    fn from(value: u32) -> Self {
        UserAccountControl::from_bits_retain(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_unknown_bits() {
        let uac = UserAccountControl::from(0x8000_0200);
        assert!(uac.contains(UserAccountControl::NORMAL_ACCOUNT));
        assert_eq!(uac.bits(), 0x8000_0200);
    }

    #[test]
    fn account_kinds() {
        assert!(UserAccountControl::from(0x0208_2000).is_domain_controller());
        assert!(UserAccountControl::from(0x0400_1000).is_domain_controller());
        assert!(!UserAccountControl::from(0x1000).is_domain_controller());
        assert!(UserAccountControl::from(0x0202).is_disabled());
    }
}
