/// End-to-end report tests: CSV feed in, assembled report out.
use adlytics_aggregate::{BucketBy, GroupBy};
use adlytics_cli::report::{build_report, Report};
use adlytics_core::{partition_test, Classifier, ContractTerms, DeliveryRecord, RoasBasis};
use adlytics_ingest::{read_delivery_csv, read_terms_csv};
use chrono::NaiveDate;

/// August 2025 feed: Acme delivers 8/5-8/20 with a dark day on 8/7,
/// Harvest delivers 8/14-8/20, plus one test campaign and the trailing
/// Totals row.
fn feed() -> String {
    let mut feed =
        String::from("DATE,CAMPAIGN ORDER NAME,IMPRESSIONS,CLICKS,TRANSACTIONS,REVENUE,SPEND\n");
    for day in 5..=20 {
        if day == 7 {
            continue;
        }
        feed.push_str(&format!(
            "8/{day}/2025,2001567: MJ: Acme-Fall Video,\"1,000\",10,1,$200.00,$100.00\n"
        ));
    }
    for day in 14..=20 {
        feed.push_str(&format!(
            "8/{day}/2025,2001568: GR: Harvest-Spring Audio,500,5,0,$0.00,$50.00\n"
        ));
    }
    feed.push_str("8/20/2025,2001570: QA: Smoke-Test Display,99999,999,0,$0.00,$999.00\n");
    feed.push_str("Totals,,\"99,999\",999,0,$0.00,$999.00\n");
    feed
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid")
}

fn setup() -> (Vec<DeliveryRecord>, Classifier) {
    let classifier = Classifier::with_defaults().expect("default classifier");
    let summary = read_delivery_csv(feed().as_bytes()).expect("readable feed");
    assert_eq!(summary.skipped_rows, 1, "only the Totals row is skipped");
    let (production, test) = partition_test(summary.records, &classifier);
    assert_eq!(test.len(), 1, "the QA smoke campaign is test traffic");
    (production, classifier)
}

fn production_report(terms: &[ContractTerms]) -> Report {
    let (records, classifier) = setup();
    build_report(
        &records,
        &classifier,
        GroupBy::Campaign,
        BucketBy::Total,
        RoasBasis::Spend,
        terms,
    )
    .expect("report builds")
}

// ============================================================
// Report carries every section, anchored at the data's end
// ============================================================
#[test]
fn test_report_sections_and_anchor() {
    let report = production_report(&[]);

    assert_eq!(report.as_of, Some(date(2025, 8, 20)));
    assert_eq!(report.buckets.len(), 2, "one total bucket per campaign");
    assert_eq!(report.series.len(), 2, "one daily series per campaign");
    assert_eq!(report.rolling.weekly.len(), 1, "two full weeks pair once");
    assert!(
        report.rolling.monthly.is_empty(),
        "16 days cannot fill a 30-day window"
    );
    assert_eq!(report.pacing.len(), 2, "derived terms cover both campaigns");
}

// ============================================================
// Bucket totals reconcile with the raw feed
// ============================================================
#[test]
fn test_bucket_totals_reconcile() {
    let report = production_report(&[]);

    let bucket_spend: f64 = report.buckets.iter().map(|b| b.metrics.spend).sum();
    // 15 Acme days at $100 plus 7 Harvest days at $50.
    assert!((bucket_spend - 1850.0).abs() < 1e-9);

    let acme = report
        .buckets
        .iter()
        .find(|b| b.group_key.contains("Acme"))
        .expect("Acme bucket");
    assert_eq!(acme.metrics.impressions, 15_000);
    assert!((acme.roas - 2.0).abs() < 1e-9, "1500 spend, 3000 revenue");
}

// ============================================================
// Dark days become filler points with null ratios
// ============================================================
#[test]
fn test_gap_days_filled_with_null_ratios() {
    let report = production_report(&[]);

    let acme = report
        .series
        .iter()
        .find(|s| s.group_key.contains("Acme"))
        .expect("Acme series");
    assert_eq!(acme.points.len(), 16, "8/5 through 8/20 inclusive");

    let dark = acme
        .points
        .iter()
        .find(|p| p.raw_date == Some(date(2025, 8, 7)))
        .expect("filler for 8/7");
    assert_eq!(dark.impressions, 0);
    assert_eq!(dark.ctr, None, "no delivery is not a zero rate");
    assert_eq!(dark.roas, None);

    let observed = acme
        .points
        .iter()
        .find(|p| p.raw_date == Some(date(2025, 8, 6)))
        .expect("observed 8/6");
    assert_eq!(observed.impressions, 1000);
    assert!((observed.ctr.expect("ctr") - 1.0).abs() < 1e-9);
}

// ============================================================
// Each series is bounded to its own delivery span
// ============================================================
#[test]
fn test_series_bounded_to_entity_span() {
    let report = production_report(&[]);

    let harvest = report
        .series
        .iter()
        .find(|s| s.group_key.contains("Harvest"))
        .expect("Harvest series");
    assert_eq!(harvest.points.len(), 7, "8/14 through 8/20 only");
    assert_eq!(harvest.points[0].raw_date, Some(date(2025, 8, 14)));
    assert_eq!(
        harvest.points.last().expect("last").raw_date,
        Some(date(2025, 8, 20))
    );
}

// ============================================================
// Weekly comparison pairs the two full weeks
// ============================================================
#[test]
fn test_weekly_comparison_math() {
    let report = production_report(&[]);

    let weekly = &report.rolling.weekly[0];
    assert_eq!(weekly.current.period_start, date(2025, 8, 14));
    assert_eq!(weekly.current.period_end, date(2025, 8, 20));
    assert_eq!(weekly.previous.period_start, date(2025, 8, 7));
    assert_eq!(weekly.previous.period_end, date(2025, 8, 13));
    // Current week: 7 Acme + 7 Harvest rows = 10,500 impressions.
    // Previous week: 6 Acme rows = 6,000.
    assert_eq!(weekly.current.metrics.impressions, 10_500);
    assert_eq!(weekly.previous.metrics.impressions, 6_000);
    assert!((weekly.impressions_change_pct - 75.0).abs() < 1e-9);
    assert!((weekly.spend_change_pct - 75.0).abs() < 1e-9);
}

// ============================================================
// Month-end forecast projects at the period-to-date rate
// ============================================================
#[test]
fn test_spend_forecast_projection() {
    let report = production_report(&[]);

    let forecast = &report.spend_forecast;
    assert!((forecast.period_to_date_total - 1850.0).abs() < 1e-9);
    // As of the 20th: 1850 / 20 per day, 11 days left in August.
    assert!((forecast.trailing_rate - 92.5).abs() < 1e-9);
    assert_eq!(forecast.remaining_days, 11);
    assert!((forecast.projected_total - 2867.5).abs() < 1e-9);
}

// ============================================================
// Pacing: explicit terms by name, derived terms otherwise
// ============================================================
#[test]
fn test_pacing_explicit_and_derived() {
    let terms_csv = "\
Name,Start Date,End Date,Budget,CPM
2001567: MJ: Acme-Fall Video,8/1/2025,8/31/2025,\"$3,100.00\",$5.00
";
    let terms = read_terms_csv(terms_csv.as_bytes()).expect("readable terms");
    let report = production_report(&terms);

    let acme = report
        .pacing
        .iter()
        .find(|p| p.name.contains("Acme"))
        .expect("Acme pacing");
    assert_eq!(acme.flight_days, 31);
    assert_eq!(acme.elapsed_days, 20);
    assert!((acme.expected_to_date - 2000.0).abs() < 1e-9);
    assert!((acme.actual_to_date - 1500.0).abs() < 1e-9);
    assert!((acme.pacing_pct - 75.0).abs() < 1e-9);

    // Harvest has no explicit terms; its derived flight is fully elapsed.
    let harvest = report
        .pacing
        .iter()
        .find(|p| p.name.contains("Harvest"))
        .expect("Harvest pacing");
    assert_eq!(harvest.flight_days, 7);
    assert!((harvest.pacing_pct - 100.0).abs() < 1e-9);
}

// ============================================================
// Empty input produces an empty, well-formed report
// ============================================================
#[test]
fn test_empty_feed_builds_empty_report() {
    let classifier = Classifier::with_defaults().expect("default classifier");
    let report = build_report(
        &[],
        &classifier,
        GroupBy::Campaign,
        BucketBy::Daily,
        RoasBasis::Spend,
        &[],
    )
    .expect("report builds");

    assert_eq!(report.as_of, None);
    assert!(report.buckets.is_empty());
    assert!(report.series.is_empty());
    assert!(report.rolling.weekly.is_empty());
    assert_eq!(report.spend_forecast.projected_total, 0.0);
    assert!(report.pacing.is_empty());
}

// ============================================================
// Report JSON shape: labels, flattened metrics, omitted as_of
// ============================================================
#[test]
fn test_report_serializes_labels_and_flat_metrics() {
    let report = production_report(&[]);
    let json = serde_json::to_value(&report).expect("serializes");

    assert_eq!(json["group_by"], "campaign");
    assert_eq!(json["roas_basis"], "spend");
    assert_eq!(json["as_of"], "2025-08-20");
    let bucket = &json["buckets"][0];
    assert_eq!(bucket["time_key"], "total");
    assert!(bucket["impressions"].is_i64(), "metrics flatten into the bucket");

    let gap_point = json["series"]
        .as_array()
        .and_then(|series| {
            series.iter().find_map(|s| {
                s["points"]
                    .as_array()?
                    .iter()
                    .find(|p| p["raw_date"] == "2025-08-07")
                    .cloned()
            })
        })
        .expect("gap point present");
    assert!(gap_point["ctr"].is_null());
}
