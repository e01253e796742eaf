use serde::{Deserialize, Serialize};

/// Pointer to one process found while enumerating an OAB listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSeed {
    /// Public process number as printed in the listing
    pub process_id: String,

    /// The OAB number whose listing produced this seed
    pub oab: String,

    /// Absolute URL of the process "show" page
    pub url: String,
}

/// Snapshot of the header data of one process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessBasicInfo {
    /// OAB the process was reached from (empty when fetched directly)
    pub oab: String,

    /// Example: "1007573-30.2024.8.26.0229"
    pub process_id: String,

    /// Forum code as used by the portal's `processo.foro` parameter, e.g. "53"
    pub forum_code: String,

    /// Example: "Foro de Hortolândia"
    pub forum_name: String,

    /// Internal process code, e.g. "6D0008MAZ0000"
    pub process_code: String,

    pub judge: String,

    /// Example: "Habilitação de Crédito"
    pub class: String,

    /// Who is claiming in the process
    pub claimant: String,

    /// Who is being claimed against
    pub defendant: String,

    /// Court section ("vara") handling the process
    pub court_section: String,

    /// Source URL the snapshot was built from
    pub url: String,
}
