//! Extraction of named columns from `jstat` output.
//!
//! Pure functions over the captured text, testable with string inputs.
//! The header row is not interpreted: columns are picked by position.

use std::fmt;

use super::mode::ColumnMapping;

/// Line index of the data row. A single target yields one header line and one data line.
const DATA_ROW: usize = 1;

/// Error type for extraction failures.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Output has no line after the header.
    MissingDataRow,
    /// A mapped column lies past the last token of the data row.
    ColumnOutOfRange { column: usize, available: usize },
    /// A mapped column holds something that is not a number.
    MalformedField { column: usize, token: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingDataRow => write!(f, "no data row after header"),
            ParseError::ColumnOutOfRange { column, available } => write!(
                f,
                "column {} out of range: data row has {} fields",
                column, available
            ),
            ParseError::MalformedField { column, token } => {
                write!(f, "column {} is not a number: {:?}", column, token)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// A single extracted value.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub name: &'static str,
    pub value: f64,
}

/// Returns the data row of `jstat` output, if any.
pub fn data_row(content: &str) -> Option<&str> {
    content
        .split('\n')
        .nth(DATA_ROW)
        .map(|line| line.trim_end_matches('\r'))
}

/// Extracts every named column of `mapping` from `content`.
///
/// Ignored positions are never read, so a mapping may be longer than the row
/// as long as its trailing entries are ignored. Either every named field is
/// returned or an error is.
pub fn extract(content: &str, mapping: ColumnMapping) -> Result<Vec<Observation>, ParseError> {
    let row = data_row(content).ok_or(ParseError::MissingDataRow)?;
    let fields: Vec<&str> = row.split_whitespace().collect();

    let mut observations = Vec::with_capacity(mapping.len());
    for (column, name) in mapping.iter().enumerate() {
        let Some(name) = *name else {
            continue;
        };

        let token = fields.get(column).ok_or(ParseError::ColumnOutOfRange {
            column,
            available: fields.len(),
        })?;

        let value: f64 = token.parse().map_err(|_| ParseError::MalformedField {
            column,
            token: (*token).to_string(),
        })?;

        observations.push(Observation { name, value });
    }

    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::jstat::mode::ReportMode;

    fn value_of(obs: &[Observation], name: &str) -> Option<f64> {
        obs.iter().find(|o| o.name == name).map(|o| o.value)
    }

    #[test]
    fn test_extract_gccapacity() {
        let content = "\
 NGCMN    NGCMX     NGC     S0C   S1C       EC      OGCMN      OGCMX       OGC         OC       MCMN     MCMX      MC     CCSMN    CCSMX     CCSC    YGC    FGC
  1024.0   1024.0  8192.0  512.0 512.0  7168.0  20480.0  349568.0  20480.0  20480.0   0.0 1056768.0  4864.0   0.0 1048576.0  512.0      5     2
";
        let obs = extract(content, ReportMode::Capacity.columns()).unwrap();

        assert_eq!(obs.len(), 18);
        assert_eq!(value_of(&obs, "ngcmn"), Some(1024.0));
        assert_eq!(value_of(&obs, "ngcmx"), Some(1024.0));
        assert_eq!(value_of(&obs, "ngc"), Some(8192.0));
        assert_eq!(value_of(&obs, "s0c"), Some(512.0));
        assert_eq!(value_of(&obs, "ec"), Some(7168.0));
        assert_eq!(value_of(&obs, "ogcmx"), Some(349568.0));
        assert_eq!(value_of(&obs, "mcmx"), Some(1056768.0));
        assert_eq!(value_of(&obs, "ccsc"), Some(512.0));
        assert_eq!(value_of(&obs, "ygc"), Some(5.0));
        assert_eq!(value_of(&obs, "fgc"), Some(2.0));
    }

    #[test]
    fn test_extract_gcold_only_mapped_columns() {
        let content = "\
   MC       MU      CCSC     CCSU       OC          OU       YGC    FGC    FGCT     GCT
  4864.0   512.3    512.0    380.1     20480.0    900.7      5     2    0.041    0.083
";
        let obs = extract(content, ReportMode::Old.columns()).unwrap();

        assert_eq!(
            obs,
            vec![
                Observation {
                    name: "mu",
                    value: 512.3
                },
                Observation {
                    name: "ou",
                    value: 900.7
                },
            ]
        );
    }

    #[test]
    fn test_extract_gcnew() {
        let content = "\
 S0C    S1C    S0U    S1U   TT MTT  DSS      EC       EU     YGC     YGCT
 512.0  512.0    0.0  128.5 15  15  512.0   7168.0   3021.4      5    0.042
";
        let obs = extract(content, ReportMode::New.columns()).unwrap();

        assert_eq!(obs.len(), 6);
        assert_eq!(value_of(&obs, "s0u"), Some(0.0));
        assert_eq!(value_of(&obs, "s1u"), Some(128.5));
        assert_eq!(value_of(&obs, "tt"), Some(15.0));
        assert_eq!(value_of(&obs, "mtt"), Some(15.0));
        assert_eq!(value_of(&obs, "dss"), Some(512.0));
        assert_eq!(value_of(&obs, "eu"), Some(3021.4));
        assert_eq!(value_of(&obs, "ec"), None);
    }

    #[test]
    fn test_extract_summary_with_concurrent_gc_columns() {
        let content = "\
 S0C    S1C    S0U    S1U      EC       EU        OC         OU       MC     MU    CCSC   CCSU   YGC     YGCT    FGC    FGCT    CGC    CGCT     GCT
 0.0   2048.0  0.0   2048.0  18432.0   4096.0   14336.0    3512.2  6144.0 5823.9 640.0  553.6     3    0.012   0      0.000   2      0.003    0.015
";
        let obs = extract(content, ReportMode::Summary.columns()).unwrap();

        assert_eq!(obs.len(), 17);
        assert_eq!(value_of(&obs, "ygc"), Some(3.0));
        assert_eq!(value_of(&obs, "fgct"), Some(0.0));
        // Position 16 is CGC on JDK 11+; the layout is positional, not header-aware.
        assert_eq!(value_of(&obs, "gct"), Some(2.0));
    }

    #[test]
    fn test_extract_dash_in_mapped_column() {
        // jstat prints `-` for a column the running collector does not report.
        let content = "MC MU CCSC CCSU OC OU\n4864.0 - 512.0 380.1 20480.0 900.7\n";

        assert_eq!(
            extract(content, ReportMode::Old.columns()),
            Err(ParseError::MalformedField {
                column: 1,
                token: "-".to_string()
            })
        );
    }

    #[test]
    fn test_extract_dash_in_ignored_column() {
        let content = "MC MU CCSC CCSU OC OU\n- 512.3 - - 20480.0 900.7\n";
        let obs = extract(content, ReportMode::Old.columns()).unwrap();

        assert_eq!(value_of(&obs, "mu"), Some(512.3));
        assert_eq!(value_of(&obs, "ou"), Some(900.7));
    }

    #[test]
    fn test_extract_short_row() {
        let content = "MC MU CCSC CCSU OC OU\n4864.0 512.3 512.0\n";
        let err = extract(content, ReportMode::Old.columns()).unwrap_err();

        assert_eq!(
            err,
            ParseError::ColumnOutOfRange {
                column: 5,
                available: 3
            }
        );
    }

    #[test]
    fn test_extract_trailing_ignored_columns_not_required() {
        // gcold maps nothing past OU, so a six-field row is enough.
        let content = "MC MU CCSC CCSU OC OU\n4864.0 512.3 512.0 380.1 20480.0 900.7\n";
        let obs = extract(content, ReportMode::Old.columns()).unwrap();

        assert_eq!(obs.len(), 2);
    }

    #[test]
    fn test_extract_malformed_field() {
        let content = "MC MU CCSC CCSU OC OU\n4864.0 abc 512.0 380.1 20480.0 900.7\n";
        let err = extract(content, ReportMode::Old.columns()).unwrap_err();

        assert_eq!(
            err,
            ParseError::MalformedField {
                column: 1,
                token: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_extract_malformed_ignored_field_is_not_read() {
        let content = "MC MU CCSC CCSU OC OU\nbogus 512.3 x y z 900.7\n";
        let obs = extract(content, ReportMode::Old.columns()).unwrap();

        assert_eq!(value_of(&obs, "mu"), Some(512.3));
        assert_eq!(value_of(&obs, "ou"), Some(900.7));
    }

    #[test]
    fn test_extract_header_only() {
        let err = extract("S0C S1C\n", ReportMode::Summary.columns()).unwrap_err();
        assert_eq!(
            err,
            ParseError::ColumnOutOfRange {
                column: 0,
                available: 0
            }
        );

        let err = extract("S0C S1C", ReportMode::Summary.columns()).unwrap_err();
        assert_eq!(err, ParseError::MissingDataRow);

        let err = extract("", ReportMode::Summary.columns()).unwrap_err();
        assert_eq!(err, ParseError::MissingDataRow);
    }

    #[test]
    fn test_extract_reads_only_first_data_row() {
        let content = "MC MU CCSC CCSU OC OU\n1 2 3 4 5 6\n10 20 30 40 50 60\n";
        let obs = extract(content, ReportMode::Old.columns()).unwrap();

        assert_eq!(value_of(&obs, "mu"), Some(2.0));
        assert_eq!(value_of(&obs, "ou"), Some(6.0));
    }

    #[test]
    fn test_extract_crlf() {
        let content = "MC MU CCSC CCSU OC OU\r\n1 2 3 4 5 6\r\n";
        let obs = extract(content, ReportMode::Old.columns()).unwrap();

        assert_eq!(value_of(&obs, "ou"), Some(6.0));
    }

    #[test]
    fn test_extract_is_idempotent() {
        let content = "MC MU CCSC CCSU OC OU\n4864.0 512.3 512.0 380.1 20480.0 900.7\n";
        let first = extract(content, ReportMode::Old.columns()).unwrap();
        let second = extract(content, ReportMode::Old.columns()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::ColumnOutOfRange {
            column: 5,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "column 5 out of range: data row has 3 fields"
        );
    }
}
