//! Monthly dataset catalogue and the per-dataset post-processing rules.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::MetqueryError;
use crate::units::{c_to_f, mm_to_in, to_daily_average, to_monthly_total, units_mention};

/// Temperature-like sentinel, in °C. Values at or below it are missing.
pub const ABSOLUTE_ZERO_C: f64 = -273.15;

/// Missing-value rule for a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    /// Values `<= -273.15` are missing.
    Temperature,
    /// Values `< 0` are missing.
    Precipitation,
}

impl Sentinel {
    pub fn is_missing(self, value: f64) -> bool {
        match self {
            Sentinel::Temperature => value <= ABSOLUTE_ZERO_C,
            Sentinel::Precipitation => value < 0.0,
        }
    }
}

/// How the units string changes the values returned by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    /// Service values are returned as-is.
    None,
    /// `in` converts millimetres to inches.
    Inches,
    /// `f` converts Celsius to Fahrenheit.
    Fahrenheit,
    /// `in` converts to inches, then `daily` divides monthly totals by days.
    InchesThenDailyAverage,
    /// `in` converts to inches, then any units without `daily` multiply
    /// daily means by days to get monthly totals.
    InchesThenMonthlyTotal,
}

/// Interpolation method requested from the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Method {
    Nearest,
    Linear,
    #[default]
    Cubic,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Nearest => "nearest",
            Method::Linear => "linear",
            Method::Cubic => "cubic",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monthly datasets served by metquery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    DaymetPrcpMean,
    DaymetPrcpStd,
    DaymetPrcpSkew,
    DaymetPrcpPww,
    DaymetPrcpPwd,
    DaymetSrldMean,
    PrismTmean,
    PrismTdmean,
    PrismTmin,
    PrismTmax,
    PrismPpt,
    EobsTmin,
    EobsTmax,
    EobsPpt,
    AgdcTmin,
    AgdcTmax,
    AgdcPpt,
}

impl Dataset {
    pub const ALL: [Dataset; 17] = [
        Dataset::DaymetPrcpMean,
        Dataset::DaymetPrcpStd,
        Dataset::DaymetPrcpSkew,
        Dataset::DaymetPrcpPww,
        Dataset::DaymetPrcpPwd,
        Dataset::DaymetSrldMean,
        Dataset::PrismTmean,
        Dataset::PrismTdmean,
        Dataset::PrismTmin,
        Dataset::PrismTmax,
        Dataset::PrismPpt,
        Dataset::EobsTmin,
        Dataset::EobsTmax,
        Dataset::EobsPpt,
        Dataset::AgdcTmin,
        Dataset::AgdcTmax,
        Dataset::AgdcPpt,
    ];

    /// Service-side dataset identifier.
    pub fn id(self) -> &'static str {
        match self {
            Dataset::DaymetPrcpMean => "daymet/prcp/mean",
            Dataset::DaymetPrcpStd => "daymet/prcp/std",
            Dataset::DaymetPrcpSkew => "daymet/prcp/skew",
            Dataset::DaymetPrcpPww => "daymet/prcp/pww",
            Dataset::DaymetPrcpPwd => "daymet/prcp/pwd",
            Dataset::DaymetSrldMean => "daymet/srld/mean",
            Dataset::PrismTmean => "prism/tmean",
            Dataset::PrismTdmean => "prism/tdmean",
            Dataset::PrismTmin => "prism/tmin",
            Dataset::PrismTmax => "prism/tmax",
            Dataset::PrismPpt => "prism/ppt",
            Dataset::EobsTmin => "eu/e-obs/tn/mean",
            Dataset::EobsTmax => "eu/e-obs/tx/mean",
            Dataset::EobsPpt => "eu/e-obs/rr/mean",
            Dataset::AgdcTmin => "au/agdc/monthlies/tmin",
            Dataset::AgdcTmax => "au/agdc/monthlies/tmax",
            Dataset::AgdcPpt => "au/agdc/monthlies/rain",
        }
    }

    pub fn sentinel(self) -> Sentinel {
        match self {
            Dataset::PrismPpt | Dataset::EobsPpt | Dataset::AgdcPpt => Sentinel::Precipitation,
            _ => Sentinel::Temperature,
        }
    }

    /// Units assumed when the caller passes none.
    pub fn default_units(self) -> Option<&'static str> {
        match self {
            Dataset::DaymetPrcpMean | Dataset::DaymetPrcpStd | Dataset::DaymetPrcpSkew => {
                Some("mm/day")
            }
            Dataset::PrismTmean | Dataset::PrismTdmean => Some("f"),
            Dataset::PrismTmin
            | Dataset::PrismTmax
            | Dataset::EobsTmin
            | Dataset::EobsTmax
            | Dataset::AgdcTmin
            | Dataset::AgdcTmax => Some("c"),
            Dataset::DaymetPrcpPww
            | Dataset::DaymetPrcpPwd
            | Dataset::DaymetSrldMean
            | Dataset::PrismPpt
            | Dataset::EobsPpt
            | Dataset::AgdcPpt => None,
        }
    }

    fn conversion(self) -> Conversion {
        match self {
            Dataset::DaymetPrcpMean
            | Dataset::DaymetPrcpStd
            | Dataset::DaymetPrcpSkew
            | Dataset::AgdcPpt => Conversion::Inches,
            Dataset::DaymetPrcpPww | Dataset::DaymetPrcpPwd | Dataset::DaymetSrldMean => {
                Conversion::None
            }
            Dataset::PrismTmean
            | Dataset::PrismTdmean
            | Dataset::PrismTmin
            | Dataset::PrismTmax
            | Dataset::EobsTmin
            | Dataset::EobsTmax
            | Dataset::AgdcTmin
            | Dataset::AgdcTmax => Conversion::Fahrenheit,
            Dataset::PrismPpt => Conversion::InchesThenDailyAverage,
            Dataset::EobsPpt => Conversion::InchesThenMonthlyTotal,
        }
    }

    /// Replace values beyond the dataset's sentinel with NaN.
    pub fn apply_sentinel(self, values: [f64; 12]) -> [f64; 12] {
        let sentinel = self.sentinel();
        values.map(|v| if sentinel.is_missing(v) { f64::NAN } else { v })
    }

    /// Apply the dataset's unit conversion for `units`.
    ///
    /// `None` means the caller asked for no conversion, which is distinct
    /// from the dataset default; see [`Dataset::default_units`].
    pub fn convert_units(self, values: [f64; 12], units: Option<&str>) -> [f64; 12] {
        let Some(units) = units else {
            return values;
        };
        match self.conversion() {
            Conversion::None => values,
            Conversion::Inches => {
                if units_mention(units, "in") {
                    mm_to_in(values)
                } else {
                    values
                }
            }
            Conversion::Fahrenheit => {
                if units_mention(units, "f") {
                    c_to_f(values)
                } else {
                    values
                }
            }
            Conversion::InchesThenDailyAverage => {
                let mut out = values;
                if units_mention(units, "in") {
                    out = mm_to_in(out);
                }
                if units_mention(units, "daily") {
                    out = to_daily_average(out);
                }
                out
            }
            Conversion::InchesThenMonthlyTotal => {
                let mut out = values;
                if units_mention(units, "in") {
                    out = mm_to_in(out);
                }
                if !units_mention(units, "daily") {
                    out = to_monthly_total(out);
                }
                out
            }
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Dataset {
    type Err = MetqueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dataset::ALL
            .into_iter()
            .find(|dataset| dataset.id() == s)
            .ok_or_else(|| MetqueryError::UnknownDataset(s.to_string()))
    }
}

/// Twelve monthly values, January first. Missing months are NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlySeries(pub [f64; 12]);

impl MonthlySeries {
    pub fn values(&self) -> &[f64; 12] {
        &self.0
    }

    pub fn missing_months(&self) -> usize {
        self.0.iter().filter(|v| v.is_nan()).count()
    }
}

/// Serializes as a JSON array with missing months as `null`.
impl Serialize for MonthlySeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let values: Vec<Option<f64>> = self
            .0
            .iter()
            .map(|v| if v.is_nan() { None } else { Some(*v) })
            .collect();
        values.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::DAYS_PER_MONTH;

    #[test]
    fn temperature_sentinel_includes_absolute_zero() {
        let mut values = [12.5; 12];
        values[0] = -273.15;
        values[5] = -9999.0;
        values[11] = -273.14;

        for dataset in Dataset::ALL
            .into_iter()
            .filter(|d| d.sentinel() == Sentinel::Temperature)
        {
            let out = dataset.apply_sentinel(values);
            assert!(out[0].is_nan(), "{dataset}: -273.15 is missing");
            assert!(out[5].is_nan(), "{dataset}: -9999 is missing");
            assert_eq!(out[11], -273.14, "{dataset}");
            for month in [1, 2, 3, 4, 6, 7, 8, 9, 10] {
                assert_eq!(out[month], 12.5, "{dataset}");
            }
        }
    }

    #[test]
    fn precipitation_sentinel_rejects_negatives_only() {
        let mut values = [3.0; 12];
        values[2] = -0.01;
        values[7] = 0.0;

        for dataset in [Dataset::PrismPpt, Dataset::EobsPpt, Dataset::AgdcPpt] {
            let out = dataset.apply_sentinel(values);
            assert!(out[2].is_nan());
            assert_eq!(out[7], 0.0);
            assert_eq!(out.iter().filter(|v| v.is_nan()).count(), 1);
        }
    }

    #[test]
    fn prism_ppt_dailyin_converts_then_divides() {
        let values = [100.0; 12];
        let out = Dataset::PrismPpt.convert_units(values, Some("dailyin"));
        for (month, days) in DAYS_PER_MONTH.iter().enumerate() {
            assert!((out[month] - 100.0 * 0.0393701 / days).abs() < 1e-12);
        }
    }

    #[test]
    fn prism_ppt_without_units_is_untouched() {
        let values = [42.0; 12];
        assert_eq!(Dataset::PrismPpt.convert_units(values, None), values);
    }

    #[test]
    fn eobs_ppt_multiplies_unless_daily() {
        let values = [2.0; 12];
        let monthly = Dataset::EobsPpt.convert_units(values, Some("mm"));
        assert_eq!(monthly[1], 2.0 * 28.25);
        let daily = Dataset::EobsPpt.convert_units(values, Some("daily mm"));
        assert_eq!(daily, values);
        assert_eq!(Dataset::EobsPpt.convert_units(values, None), values);
    }

    #[test]
    fn temperature_converts_only_when_fahrenheit_requested() {
        let values = [10.0; 12];
        assert_eq!(Dataset::PrismTmax.convert_units(values, Some("c")), values);
        assert_eq!(Dataset::PrismTmax.convert_units(values, Some("F"))[0], 50.0);
        assert_eq!(
            Dataset::PrismTmean.convert_units(values, Dataset::PrismTmean.default_units())[0],
            50.0
        );
    }

    #[test]
    fn probability_datasets_ignore_units() {
        let values = [0.25; 12];
        assert_eq!(Dataset::DaymetPrcpPww.convert_units(values, Some("in")), values);
    }

    #[test]
    fn dataset_ids_parse_back() {
        for dataset in Dataset::ALL {
            assert_eq!(dataset.id().parse::<Dataset>().expect("parse"), dataset);
        }
        let err = "prism/nope".parse::<Dataset>().unwrap_err();
        assert!(err.to_string().contains("prism/nope"));
    }

    #[test]
    fn series_serializes_missing_as_null() {
        let mut values = [1.5; 12];
        values[3] = f64::NAN;
        let json = serde_json::to_string(&MonthlySeries(values)).expect("serialize");
        assert!(json.starts_with("[1.5,1.5,1.5,null,1.5"));
    }
}
