use chrono::NaiveDate;

use crate::boundary::{boundary_url, get_boundary, inclusive_urls, Boundary};

#[test]
fn test_full_date_boundary() {
    let boundary = get_boundary(Some("2014-06-17"));
    assert_eq!(boundary.parts, 3);
    assert_eq!(boundary.date, NaiveDate::from_ymd_opt(2014, 6, 17));
}

#[test]
fn test_year_month_boundary() {
    let boundary = get_boundary(Some("2014-06"));
    assert_eq!(boundary.parts, 2);
    assert_eq!(boundary.date, NaiveDate::from_ymd_opt(2014, 6, 1));
}

#[test]
fn test_year_boundary() {
    let boundary = get_boundary(Some("2014"));
    assert_eq!(boundary.parts, 1);
    assert_eq!(boundary.date, NaiveDate::from_ymd_opt(2014, 1, 1));
}

#[test]
fn test_absent_boundary() {
    assert_eq!(get_boundary(None), Boundary::UNBOUNDED);
}

#[test]
fn test_invalid_boundary() {
    for input in ["opening day", "2014-13", "2014-02-30", "2014-06-17-01", ""] {
        assert_eq!(get_boundary(Some(input)), Boundary::UNBOUNDED, "{}", input);
    }
}

#[test]
fn test_boundary_url_precision() {
    let date = NaiveDate::from_ymd_opt(2014, 6, 17).unwrap();
    assert_eq!(boundary_url(date, 3), "year_2014/month_06/day_17/");
    assert_eq!(boundary_url(date, 2), "year_2014/month_06/");
    assert_eq!(boundary_url(date, 1), "year_2014/");
}

fn urls(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|url| url.to_string()).collect()
}

#[test]
fn test_inclusive_urls_spans_stop() {
    let candidates = urls(&["a/1", "a/1/x", "a/2", "a/3"]);
    let kept: Vec<String> =
        inclusive_urls(candidates, "a/1".to_string(), "a/2".to_string()).collect();
    assert_eq!(kept, urls(&["a/1", "a/1/x", "a/2"]));
}

#[test]
fn test_inclusive_urls_withholds_until_start() {
    let candidates = urls(&["a/0", "a/1", "a/2"]);
    let kept: Vec<String> =
        inclusive_urls(candidates, "a/1".to_string(), "a/2".to_string()).collect();
    assert_eq!(kept, urls(&["a/1", "a/2"]));
}

#[test]
fn test_inclusive_urls_deeper_candidate_matches_boundary() {
    // A day-level boundary keeps the game pages nested under that day.
    let candidates = urls(&[
        "http://gd/year_2014/month_06/day_17/gid_2014_06_17_minmlb_bosmlb_1/",
        "http://gd/year_2014/month_06/day_18/",
    ]);
    let start = "http://gd/year_2014/month_06/day_17/".to_string();
    let stop = "http://gd/year_2014/month_06/day_17/".to_string();
    let kept: Vec<String> = inclusive_urls(candidates.clone(), start, stop).collect();
    assert_eq!(kept, candidates[..1].to_vec());
}

#[test]
fn test_inclusive_urls_stop_without_start_yields_nothing() {
    let candidates = urls(&["a/1", "a/2", "a/3"]);
    let kept: Vec<String> =
        inclusive_urls(candidates, "a/9".to_string(), "a/2".to_string()).collect();
    assert!(kept.is_empty());
}
