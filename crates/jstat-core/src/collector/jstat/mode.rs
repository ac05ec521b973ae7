//! Report modes requested from `jstat` and their column layouts.
//!
//! Each mode maps output token positions to metric names. The layouts follow
//! the column order `jstat` has printed since JDK 8 (metaspace instead of
//! permgen). Newer JDKs append columns (`CGC`, `CGCT`) which fall past the
//! end of every mapping and are ignored.

use std::fmt;
use std::str::FromStr;

/// Position → metric name, `None` for a column that is not exported.
pub type ColumnMapping = &'static [Option<&'static str>];

/// `jstat -gccapacity`:
/// `NGCMN NGCMX NGC S0C S1C EC OGCMN OGCMX OGC OC MCMN MCMX MC CCSMN CCSMX CCSC YGC FGC`
const GCCAPACITY: ColumnMapping = &[
    Some("ngcmn"),
    Some("ngcmx"),
    Some("ngc"),
    Some("s0c"),
    Some("s1c"),
    Some("ec"),
    Some("ogcmn"),
    Some("ogcmx"),
    Some("ogc"),
    Some("oc"),
    Some("mcmn"),
    Some("mcmx"),
    Some("mc"),
    Some("ccsmn"),
    Some("ccsmx"),
    Some("ccsc"),
    Some("ygc"),
    Some("fgc"),
];

/// `jstat -gcold`: `MC MU CCSC CCSU OC OU YGC FGC FGCT GCT`
const GCOLD: ColumnMapping = &[
    None,
    Some("mu"),
    None,
    None,
    None,
    Some("ou"),
    None,
    None,
    None,
    None,
];

/// `jstat -gcnew`: `S0C S1C S0U S1U TT MTT DSS EC EU YGC YGCT`
const GCNEW: ColumnMapping = &[
    None,
    None,
    Some("s0u"),
    Some("s1u"),
    Some("tt"),
    Some("mtt"),
    Some("dss"),
    None,
    Some("eu"),
    None,
    None,
];

/// `jstat -gc`:
/// `S0C S1C S0U S1U EC EU OC OU MC MU CCSC CCSU YGC YGCT FGC FGCT GCT`
const GC: ColumnMapping = &[
    Some("s0c"),
    Some("s1c"),
    Some("s0u"),
    Some("s1u"),
    Some("ec"),
    Some("eu"),
    Some("oc"),
    Some("ou"),
    Some("mc"),
    Some("mu"),
    Some("ccsc"),
    Some("ccsu"),
    Some("ygc"),
    Some("ygct"),
    Some("fgc"),
    Some("fgct"),
    Some("gct"),
];

/// A `jstat` output option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportMode {
    /// `-gccapacity`: generation and space capacities.
    Capacity,
    /// `-gcold`: old generation and metaspace usage.
    Old,
    /// `-gcnew`: young generation usage and tenuring.
    New,
    /// `-gc`: combined heap summary with GC counts and times.
    Summary,
}

impl ReportMode {
    /// All modes in collection order.
    pub const ALL: [ReportMode; 4] = [
        ReportMode::Capacity,
        ReportMode::Old,
        ReportMode::New,
        ReportMode::Summary,
    ];

    /// Option name as passed to `jstat` (without the leading dash).
    pub fn option(self) -> &'static str {
        match self {
            ReportMode::Capacity => "gccapacity",
            ReportMode::Old => "gcold",
            ReportMode::New => "gcnew",
            ReportMode::Summary => "gc",
        }
    }

    /// Command-line flag, e.g. `-gccapacity`.
    pub fn flag(self) -> String {
        format!("-{}", self.option())
    }

    /// Positional column mapping of this mode's data row.
    pub fn columns(self) -> ColumnMapping {
        match self {
            ReportMode::Capacity => GCCAPACITY,
            ReportMode::Old => GCOLD,
            ReportMode::New => GCNEW,
            ReportMode::Summary => GC,
        }
    }

    /// Metric names this mode exports, in column order.
    pub fn metric_names(self) -> impl Iterator<Item = &'static str> {
        self.columns().iter().filter_map(|c| *c)
    }
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option())
    }
}

impl FromStr for ReportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix('-').unwrap_or(s);
        ReportMode::ALL
            .into_iter()
            .find(|m| m.option().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!("unknown report mode '{s}' (expected gccapacity, gcold, gcnew or gc)")
            })
    }
}

/// Human-readable description of a column, used as gauge help text.
pub fn describe(metric: &str) -> &'static str {
    match metric {
        "ngcmn" => "Minimum new generation capacity (KB).",
        "ngcmx" => "Maximum new generation capacity (KB).",
        "ngc" => "Current new generation capacity (KB).",
        "s0c" => "Current survivor space 0 capacity (KB).",
        "s1c" => "Current survivor space 1 capacity (KB).",
        "s0u" => "Survivor space 0 utilization (KB).",
        "s1u" => "Survivor space 1 utilization (KB).",
        "ec" => "Current eden space capacity (KB).",
        "eu" => "Eden space utilization (KB).",
        "ogcmn" => "Minimum old generation capacity (KB).",
        "ogcmx" => "Maximum old generation capacity (KB).",
        "ogc" => "Current old generation capacity (KB).",
        "oc" => "Current old space capacity (KB).",
        "ou" => "Old space utilization (KB).",
        "mcmn" => "Minimum metaspace capacity (KB).",
        "mcmx" => "Maximum metaspace capacity (KB).",
        "mc" => "Metaspace capacity (KB).",
        "mu" => "Metaspace utilization (KB).",
        "ccsmn" => "Compressed class space minimum capacity (KB).",
        "ccsmx" => "Compressed class space maximum capacity (KB).",
        "ccsc" => "Compressed class space capacity (KB).",
        "ccsu" => "Compressed class space used (KB).",
        "tt" => "Tenuring threshold.",
        "mtt" => "Maximum tenuring threshold.",
        "dss" => "Desired survivor size (KB).",
        "ygc" => "Number of young generation garbage collection events.",
        "ygct" => "Young generation garbage collection time (seconds).",
        "fgc" => "Number of full GC events.",
        "fgct" => "Full garbage collection time (seconds).",
        "gct" => "Total garbage collection time (seconds).",
        _ => "jstat column.",
    }
}
