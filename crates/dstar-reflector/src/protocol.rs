//! Protocol selection shared by the recorder and player binaries

use dstar_wire::Callsign;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflectorKind {
    DExtra,
    DExtraOpen,
    DPlus,
}

impl ReflectorKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dextra" => Some(Self::DExtra),
            "dextraopen" => Some(Self::DExtraOpen),
            "dplus" => Some(Self::DPlus),
            _ => None,
        }
    }
}

/// Picks a protocol from the reflector's callsign prefix: `REF*` uses
/// D-Plus, `ORF*` uses DExtra-Open, everything else uses DExtra. An
/// explicit choice always wins.
pub fn select_protocol(reflector: &Callsign, explicit: Option<ReflectorKind>) -> ReflectorKind {
    if let Some(kind) = explicit {
        return kind;
    }
    let trimmed = reflector.trimmed();
    if trimmed.starts_with("REF") {
        ReflectorKind::DPlus
    } else if trimmed.starts_with("ORF") {
        ReflectorKind::DExtraOpen
    } else {
        ReflectorKind::DExtra
    }
}
