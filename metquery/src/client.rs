//! Blocking HTTP client for the metquery `monthly` and `daily` endpoints.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::config::MetqueryConfig;
use crate::dataset::{Dataset, Method, MonthlySeries};
use crate::error::MetqueryError;

/// JSON field holding the 12 monthly values.
pub const MONTHLY_FIELD: &str = "MonthlyValues";

/// Geographic bounding box in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

/// Formats as `west,south,east,north`, the form the service expects.
impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}

impl FromStr for BoundingBox {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [west, south, east, north] = parts.as_slice() else {
            return Err(anyhow!("bbox must be west,south,east,north: {s:?}"));
        };
        let parse = |v: &str| -> Result<f64> {
            v.parse::<f64>()
                .with_context(|| format!("parse bbox coordinate {v:?}"))
        };
        Ok(Self {
            west: parse(*west)?,
            south: parse(*south)?,
            east: parse(*east)?,
            north: parse(*north)?,
        })
    }
}

/// Parameters for a daily-data download.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyQuery {
    pub dataset: String,
    pub bbox: BoundingBox,
    pub year: Option<i32>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

/// Build the `monthly` URL. Query parameters are ordered `lat, lng, dataset, method`.
pub fn monthly_url(base: &Url, dataset_id: &str, lng: f64, lat: f64, method: Method) -> Result<Url> {
    let mut url = base
        .join("monthly")
        .with_context(|| format!("join monthly onto {base}"))?;
    url.query_pairs_mut()
        .append_pair("lat", &lat.to_string())
        .append_pair("lng", &lng.to_string())
        .append_pair("dataset", dataset_id)
        .append_pair("method", method.as_str());
    Ok(url)
}

/// Build the `daily` URL. Year filters are appended only when present.
pub fn daily_url(base: &Url, query: &DailyQuery) -> Result<Url> {
    let mut url = base
        .join("daily")
        .with_context(|| format!("join daily onto {base}"))?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("bbox", &query.bbox.to_string())
            .append_pair("dataset", &query.dataset);
        if let Some(year) = query.year {
            pairs.append_pair("year", &year.to_string());
        }
        if let Some(start_year) = query.start_year {
            pairs.append_pair("start_year", &start_year.to_string());
        }
        if let Some(end_year) = query.end_year {
            pairs.append_pair("end_year", &end_year.to_string());
        }
    }
    Ok(url)
}

/// Pull exactly 12 numbers out of `json[field]`. JSON `null` becomes NaN.
pub fn extract_monthly(json: &Value, field: &str) -> Result<[f64; 12], MetqueryError> {
    let array = json
        .get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| MetqueryError::MissingField {
            field: field.to_string(),
        })?;
    if array.len() != 12 {
        return Err(MetqueryError::Shape { len: array.len() });
    }

    let mut values = [f64::NAN; 12];
    for (index, (slot, item)) in values.iter_mut().zip(array).enumerate() {
        *slot = match item {
            Value::Null => f64::NAN,
            other => other.as_f64().ok_or_else(|| MetqueryError::NonNumeric {
                field: field.to_string(),
                index,
            })?,
        };
    }
    Ok(values)
}

/// Blocking metquery client. One network call per operation.
#[derive(Debug, Clone)]
pub struct MetqueryClient {
    base: Url,
    http: Client,
}

impl MetqueryClient {
    pub fn new(config: &MetqueryConfig) -> Result<Self> {
        // `None` also lifts the blocking client's 30 s default.
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("build http client")?;
        Self::with_http_client(config, http)
    }

    /// Use a preconfigured `reqwest` client (proxies, TLS roots, ...).
    pub fn with_http_client(config: &MetqueryConfig, http: Client) -> Result<Self> {
        config.validate()?;
        let base = Url::parse(&config.base_url)
            .with_context(|| format!("parse base_url {}", config.base_url))?;
        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Fetch the raw JSON document for a monthly query.
    #[instrument(skip(self), fields(base = %self.base))]
    pub fn retrieve_monthly(
        &self,
        dataset_id: &str,
        lng: f64,
        lat: f64,
        method: Method,
    ) -> Result<Value> {
        let url = monthly_url(&self.base, dataset_id, lng, lat, method)?;
        debug!(%url, "requesting monthly values");
        let response = self
            .http
            .get(url.clone())
            .send()
            .with_context(|| format!("GET {url}"))?;
        let status = response.status();
        let body = response
            .text()
            .with_context(|| format!("read response body from {url}"))?;

        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "metquery request failed");
            return Err(MetqueryError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        match serde_json::from_str(&body) {
            Ok(json) => Ok(json),
            Err(err) => {
                debug!(err = %err, "response body is not json");
                Err(MetqueryError::Parse { body }.into())
            }
        }
    }

    /// Monthly series for `dataset` at a point, after sentinel and unit handling.
    ///
    /// `units = None` applies the dataset's default units.
    #[instrument(skip(self), fields(dataset = %dataset))]
    pub fn monthly(
        &self,
        dataset: Dataset,
        lng: f64,
        lat: f64,
        method: Method,
        units: Option<&str>,
    ) -> Result<MonthlySeries> {
        let json = self.retrieve_monthly(dataset.id(), lng, lat, method)?;
        let raw = extract_monthly(&json, MONTHLY_FIELD)?;
        let values = dataset.apply_sentinel(raw);
        let units = units.or(dataset.default_units());
        let series = MonthlySeries(dataset.convert_units(values, units));
        debug!(
            units = units.unwrap_or(""),
            missing = series.missing_months(),
            "monthly values ready"
        );
        Ok(series)
    }

    /// Stream the daily-data response body into `dst`.
    ///
    /// The body is staged in a temporary file next to `dst` and renamed into
    /// place once complete, so a failed call never leaves a partial file.
    /// Returns the number of bytes written. Status 418 is the service's rate
    /// limit and surfaces as [`MetqueryError::RateLimited`].
    #[instrument(skip(self, query), fields(dataset = %query.dataset, dst = %dst.display()))]
    pub fn download_daily(&self, query: &DailyQuery, dst: &Path) -> Result<u64> {
        let url = daily_url(&self.base, query)?;
        info!(%url, "requesting daily data");
        let mut response = self
            .http
            .get(url.clone())
            .send()
            .with_context(|| format!("GET {url}"))?;

        let status = response.status();
        if status == StatusCode::IM_A_TEAPOT {
            let body = response
                .text()
                .with_context(|| format!("read rate-limit body from {url}"))?;
            warn!("metquery rate limit reached");
            return Err(MetqueryError::RateLimited { body }.into());
        }
        if status != StatusCode::OK {
            let body = response
                .text()
                .with_context(|| format!("read error body from {url}"))?;
            warn!(status = status.as_u16(), "metquery daily request failed");
            return Err(MetqueryError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let parent = dst
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;

        // `dst` only appears once the whole body has arrived.
        let mut partial = NamedTempFile::new_in(parent)
            .with_context(|| format!("create temporary file in {}", parent.display()))?;
        let written = response
            .copy_to(partial.as_file_mut())
            .with_context(|| format!("write daily data for {}", dst.display()))?;
        partial
            .persist(dst)
            .with_context(|| format!("move daily data into {}", dst.display()))?;
        debug!(bytes = written, "daily data written");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> Url {
        Url::parse("https://wepp.cloud/webservices/metquery/").expect("url")
    }

    #[test]
    fn monthly_url_orders_query_parameters() {
        let url = monthly_url(&base(), "prism/ppt", -115.67, 45.27, Method::Cubic).expect("url");
        assert_eq!(url.path(), "/webservices/metquery/monthly");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["lat", "lng", "dataset", "method"]);
        assert_eq!(pairs[0].1, "45.27");
        assert_eq!(pairs[1].1, "-115.67");
        assert_eq!(pairs[2].1, "prism/ppt");
        assert_eq!(pairs[3].1, "cubic");
    }

    #[test]
    fn daily_url_appends_only_present_years() {
        let query = DailyQuery {
            dataset: "daymet/prcp".to_string(),
            bbox: "-117,39,-116.9,39.1".parse().expect("bbox"),
            year: None,
            start_year: Some(1980),
            end_year: Some(1990),
        };
        let url = daily_url(&base(), &query).expect("url");
        let keys: Vec<String> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
        assert_eq!(keys, ["bbox", "dataset", "start_year", "end_year"]);
        let bbox = url
            .query_pairs()
            .find(|(k, _)| k == "bbox")
            .map(|(_, v)| v.into_owned());
        assert_eq!(bbox.as_deref(), Some("-117,39,-116.9,39.1"));
    }

    #[test]
    fn bbox_requires_four_numbers() {
        assert!("1,2,3".parse::<BoundingBox>().is_err());
        assert!("1,2,x,4".parse::<BoundingBox>().is_err());
        let bbox: BoundingBox = " -117, 39 ,-116.9,39.1".parse().expect("bbox");
        assert_eq!(bbox.north, 39.1);
    }

    #[test]
    fn extract_rejects_wrong_length() {
        let doc = json!({ "MonthlyValues": [1.0, 2.0, 3.0] });
        let err = extract_monthly(&doc, MONTHLY_FIELD).unwrap_err();
        assert!(matches!(err, MetqueryError::Shape { len: 3 }));
    }

    #[test]
    fn extract_reports_missing_field_and_bad_values() {
        let err = extract_monthly(&json!({ "Values": [] }), MONTHLY_FIELD).unwrap_err();
        assert!(matches!(err, MetqueryError::MissingField { .. }));

        let mut values: Vec<Value> = (0..12).map(|v| json!(v)).collect();
        values[4] = json!("n/a");
        let err = extract_monthly(&json!({ "MonthlyValues": values }), MONTHLY_FIELD).unwrap_err();
        assert!(matches!(err, MetqueryError::NonNumeric { index: 4, .. }));
    }

    #[test]
    fn extract_maps_null_to_nan() {
        let mut values: Vec<Value> = (0..12).map(|v| json!(v)).collect();
        values[0] = Value::Null;
        let out = extract_monthly(&json!({ "MonthlyValues": values }), MONTHLY_FIELD).expect("ok");
        assert!(out[0].is_nan());
        assert_eq!(out[11], 11.0);
    }
}
