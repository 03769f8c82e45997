//! Security descriptor control flags.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// The 16-bit control field of a security descriptor header
    ///
    /// Unknown bits are retained so a decoded descriptor re-encodes to the same header.
    pub struct ControlFlags: u16 {
        /// The owner SID was provided by a default mechanism
        const OWNER_DEFAULTED = 0x0001;
        /// The group SID was provided by a default mechanism
        const GROUP_DEFAULTED = 0x0002;
        /// The descriptor carries a DACL
        const DACL_PRESENT = 0x0004;
        /// The DACL was provided by a default mechanism
        const DACL_DEFAULTED = 0x0008;
        /// The descriptor carries a SACL
        const SACL_PRESENT = 0x0010;
        /// The SACL was provided by a default mechanism
        const SACL_DEFAULTED = 0x0020;
        /// The DACL is trusted, used by server-side implementations
        const DACL_TRUSTED = 0x0040;
        /// Server security, used by server-side implementations
        const SERVER_SECURITY = 0x0080;
        /// Inheritable ACEs are requested to propagate into the DACL
        const DACL_AUTO_INHERIT_REQ = 0x0100;
        /// Inheritable ACEs are requested to propagate into the SACL
        const SACL_AUTO_INHERIT_REQ = 0x0200;
        /// The DACL was set up to support automatic propagation
        const DACL_AUTO_INHERITED = 0x0400;
        /// The SACL was set up to support automatic propagation
        const SACL_AUTO_INHERITED = 0x0800;
        /// Inherited ACEs from the parent do not apply to the DACL
        const DACL_PROTECTED = 0x1000;
        /// Inherited ACEs from the parent do not apply to the SACL
        const SACL_PROTECTED = 0x2000;
        /// The reserved byte of the header holds resource manager control bits
        const RM_CONTROL_VALID = 0x4000;
        /// The descriptor is self-relative: all parts are referenced by offset
        const SELF_RELATIVE = 0x8000;
    }
}

impl ControlFlags {
    /// Names of the known flags that are set, in bit order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retains_unknown_bits() {
        let flags = ControlFlags::from_bits_retain(0x8014);
        assert!(flags.contains(ControlFlags::SELF_RELATIVE));
        assert!(flags.contains(ControlFlags::DACL_PRESENT | ControlFlags::SACL_PRESENT));
        assert_eq!(flags.bits(), 0x8014);
        assert_eq!(flags.names(), ["DACL_PRESENT", "SACL_PRESENT", "SELF_RELATIVE"]);
    }
}
