//! Built-in platform definitions.

pub mod arista_eos;
pub mod cisco_ios;
pub mod cisco_nxos;
pub mod hp_procurve;
pub mod linux;

use super::PlatformDefinition;

/// Every platform shipped with netshell.
pub fn builtin() -> Vec<PlatformDefinition> {
    vec![
        arista_eos::platform(),
        cisco_ios::platform(),
        cisco_nxos::platform(),
        hp_procurve::platform(),
        linux::platform(),
    ]
}
