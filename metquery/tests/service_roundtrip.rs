//! Client tests against a canned loopback HTTP responder.
//!
//! Each test serves one response and checks both the request the client sent
//! and how it classified the reply.

use std::fs;

use metquery::test_support::{CannedServer, monthly_body};
use metquery::units::{DAYS_PER_MONTH, INCHES_PER_MM};
use metquery::{BoundingBox, DailyQuery, Dataset, Method, MetqueryError};

#[test]
fn prism_ppt_dailyin_marks_negative_missing_and_converts() {
    let raw = [
        81.0, 64.0, 70.0, -9999.0, 48.0, 33.0, 12.0, 15.0, 22.0, 41.0, 77.0, 90.0,
    ];
    let server = CannedServer::start(200, monthly_body(&raw));
    let client = server.client();

    let series = client
        .monthly(Dataset::PrismPpt, -115.67, 45.27, Method::Cubic, Some("dailyin"))
        .expect("monthly");

    let request = server.request_line();
    assert!(request.starts_with("GET /metquery/monthly?"), "{request}");
    assert!(request.contains("lat=45.27&lng=-115.67&dataset=prism%2Fppt&method=cubic"));

    let values = series.values();
    assert!(values[3].is_nan());
    assert_eq!(series.missing_months(), 1);
    for month in (0..12).filter(|m| *m != 3) {
        let expected = raw[month] * INCHES_PER_MM / DAYS_PER_MONTH[month];
        assert!(
            (values[month] - expected).abs() < 1e-12,
            "month {month}: {} != {expected}",
            values[month]
        );
    }
}

#[test]
fn temperature_defaults_to_dataset_units() {
    let raw = [-273.15, 0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 20.0, 15.0, 10.0, 5.0, 0.0];
    let server = CannedServer::start(200, monthly_body(&raw));

    let series = server
        .client()
        .monthly(Dataset::PrismTmean, -115.67, 45.27, Method::Linear, None)
        .expect("monthly");

    assert!(series.values()[0].is_nan());
    assert_eq!(series.values()[1], 32.0);
    assert_eq!(series.values()[6], 77.0);
    assert!(server.request_line().contains("method=linear"));
}

#[test]
fn non_200_carries_response_body() {
    let server = CannedServer::start(500, "grid not loaded");
    let err = server
        .client()
        .retrieve_monthly("prism/tmin", 1.0, 2.0, Method::Cubic)
        .unwrap_err();

    match err.downcast_ref::<MetqueryError>() {
        Some(MetqueryError::Status { status, body }) => {
            assert_eq!(*status, 500);
            assert_eq!(body, "grid not loaded");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn unparsable_body_is_a_parse_error() {
    let server = CannedServer::start(200, "<html>oops</html>");
    let err = server
        .client()
        .monthly(Dataset::AgdcPpt, 145.7, -37.77, Method::Cubic, None)
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MetqueryError>(),
        Some(MetqueryError::Parse { body }) if body.contains("oops")
    ));
}

#[test]
fn short_array_is_a_shape_error() {
    let server = CannedServer::start(200, monthly_body(&[1.0; 11]));
    let err = server
        .client()
        .monthly(Dataset::DaymetPrcpMean, -117.0, 39.0, Method::Cubic, Some("in"))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MetqueryError>(),
        Some(MetqueryError::Shape { len: 11 })
    ));
}

fn daily_query() -> DailyQuery {
    DailyQuery {
        dataset: "daymet/prcp".to_string(),
        bbox: BoundingBox {
            west: -117.0,
            south: 39.0,
            east: -116.9,
            north: 39.1,
        },
        year: Some(1980),
        start_year: None,
        end_year: None,
    }
}

#[test]
fn daily_download_writes_body_to_destination() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dst = temp.path().join("nested").join("daymet_prcp_1980_ws.nc4");
    let payload: Vec<u8> = (0u8..=255).cycle().take(4096).collect();
    let server = CannedServer::start(200, payload.clone());

    let written = server
        .client()
        .download_daily(&daily_query(), &dst)
        .expect("download");

    assert_eq!(written, 4096);
    assert_eq!(fs::read(&dst).expect("read dst"), payload);
    let request = server.request_line();
    assert!(request.contains("/metquery/daily?bbox="), "{request}");
    assert!(request.contains("&year=1980"));
}

#[test]
fn daily_rate_limit_is_distinguished() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dst = temp.path().join("out.nc4");
    let server = CannedServer::start(418, "slow down");

    let err = server
        .client()
        .download_daily(&daily_query(), &dst)
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<MetqueryError>(),
        Some(MetqueryError::RateLimited { body }) if body == "slow down"
    ));
    assert!(!dst.exists());
}

#[test]
fn daily_other_status_is_a_status_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dst = temp.path().join("out.nc4");
    let server = CannedServer::start(404, "no such dataset");

    let err = server
        .client()
        .download_daily(&daily_query(), &dst)
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<MetqueryError>(),
        Some(MetqueryError::Status { status: 404, .. })
    ));
    assert!(err.to_string().contains("no such dataset"));
    assert!(!dst.exists());
}

#[test]
fn interrupted_daily_download_leaves_no_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let out_dir = temp.path().join("climate");
    let dst = out_dir.join("daymet_prcp_1980_ws.nc4");
    let server = CannedServer::start_truncated(200, vec![7u8; 1000], 100_000);

    let result = server.client().download_daily(&daily_query(), &dst);
    server.request_line();

    assert!(result.is_err());
    assert!(!dst.exists());
    let leftovers: Vec<_> = fs::read_dir(&out_dir).expect("read out dir").collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
}

#[test]
fn completed_daily_download_replaces_previous_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dst = temp.path().join("out.nc4");
    fs::write(&dst, "stale and longer than the new payload").expect("write stale");
    let server = CannedServer::start(200, "fresh");

    let written = server
        .client()
        .download_daily(&daily_query(), &dst)
        .expect("download");

    assert_eq!(written, 5);
    assert_eq!(fs::read_to_string(&dst).expect("read dst"), "fresh");
}

#[test]
fn unreadable_rate_limit_body_is_reported() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dst = temp.path().join("out.nc4");
    let server = CannedServer::start_truncated(418, "slow", 4096);

    let err = server
        .client()
        .download_daily(&daily_query(), &dst)
        .unwrap_err();
    server.request_line();

    assert!(format!("{err:#}").contains("read rate-limit body"), "{err:#}");
    assert!(err.downcast_ref::<MetqueryError>().is_none());
    assert!(!dst.exists());
}
