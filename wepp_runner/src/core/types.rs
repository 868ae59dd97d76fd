//! Run identity and outcome types.

use std::fmt;
use std::time::Duration;

/// Line printed by WEPP after a successful hillslope (or flowpath) run.
pub const HILLSLOPE_SUCCESS: &str = "WEPP COMPLETED HILLSLOPE SIMULATION SUCCESSFULLY";
/// Line printed by WEPP after a successful watershed run.
pub const WATERSHED_SUCCESS: &str = "WEPP COMPLETED WATERSHED SIMULATION SUCCESSFULLY";

/// Identifies one simulation invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunKey {
    Hillslope {
        wepp_id: u32,
        ss_batch_id: Option<u32>,
    },
    Flowpath {
        fp_id: String,
    },
    Watershed {
        ss_batch_id: Option<u32>,
    },
}

impl RunKey {
    /// Literal WEPP prints on success for this kind of run.
    pub fn marker(&self) -> &'static str {
        match self {
            RunKey::Hillslope { .. } | RunKey::Flowpath { .. } => HILLSLOPE_SUCCESS,
            RunKey::Watershed { .. } => WATERSHED_SUCCESS,
        }
    }

    pub fn is_watershed(&self) -> bool {
        matches!(self, RunKey::Watershed { .. })
    }
}

impl fmt::Display for RunKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunKey::Hillslope {
                wepp_id,
                ss_batch_id: None,
            } => write!(f, "wepp_id {wepp_id}"),
            RunKey::Hillslope {
                wepp_id,
                ss_batch_id: Some(batch),
            } => write!(f, "wepp_id {wepp_id} (ss batch {batch})"),
            RunKey::Flowpath { fp_id } => write!(f, "{fp_id}"),
            RunKey::Watershed { ss_batch_id: None } => f.write_str("watershed"),
            RunKey::Watershed {
                ss_batch_id: Some(batch),
            } => write!(f, "watershed (ss batch {batch})"),
        }
    }
}

/// A run that printed its success marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub key: RunKey,
    /// Wall-clock time from the start of the call to process exit.
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flowpaths_use_the_hillslope_marker() {
        let key = RunKey::Flowpath {
            fp_id: "fp_12_3".to_string(),
        };
        assert_eq!(key.marker(), HILLSLOPE_SUCCESS);
        assert!(!key.is_watershed());
        assert_eq!(RunKey::Watershed { ss_batch_id: None }.marker(), WATERSHED_SUCCESS);
    }

    #[test]
    fn display_names_the_run() {
        let key = RunKey::Hillslope {
            wepp_id: 7,
            ss_batch_id: Some(2),
        };
        assert_eq!(key.to_string(), "wepp_id 7 (ss batch 2)");
    }
}
