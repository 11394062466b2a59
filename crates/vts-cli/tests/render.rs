use vts_cli::render::{format_signed, format_value, report_csv, report_text};
use vts_core::build_report;
use vts_model::{
    CultureId, IndicatorKey, Participant, ParticipantId, ReportFilter, ResultRecord, SiteId, Trial,
    TrialId, VarietyId, VarietyMetadata,
};
use vts_store::{MemoryStore, SiteCatalog, SiteEntry};

fn variety(id: &str, name: &str) -> VarietyMetadata {
    VarietyMetadata {
        culture_id: Some(CultureId::new("wheat").unwrap()),
        maturity_group: Some("mid".to_string()),
        ..VarietyMetadata::new(VarietyId::new(id).unwrap(), name)
    }
}

fn trial(id: &str, year: i32) -> Trial {
    let trial_id = TrialId::new(id).unwrap();
    let participant = |variety: &str, standard: bool| Participant {
        id: ParticipantId::new(format!("{id}-{variety}")).unwrap(),
        trial_id: trial_id.clone(),
        variety_id: VarietyId::new(variety).unwrap(),
        variety_name: variety.to_string(),
        is_standard: standard,
    };
    Trial {
        id: trial_id.clone(),
        year,
        culture_id: CultureId::new("wheat").unwrap(),
        location_id: SiteId::new("north-a").unwrap(),
        predecessor: None,
        trial_type: None,
        participants: vec![participant("var-a", true), participant("var-b", false)],
    }
}

fn plots(trial: &str, variety: &str, yields: &[&str]) -> Vec<ResultRecord> {
    yields
        .iter()
        .enumerate()
        .map(|(index, value)| {
            ResultRecord::new(
                ParticipantId::new(format!("{trial}-{variety}")).unwrap(),
                IndicatorKey::new(format!("yield_plot{}", index + 1)).unwrap(),
                *value,
            )
        })
        .collect()
}

fn store() -> MemoryStore {
    let sites = SiteCatalog::from_entries(vec![SiteEntry {
        oblast_id: "north".to_string(),
        oblast_name: "North Oblast".to_string(),
        site_id: "north-a".to_string(),
        site_name: "Alpha GSU".to_string(),
    }]);
    MemoryStore::new()
        .with_sites(sites)
        .with_variety(variety("var-a", "Alpha"))
        .with_variety(variety("var-b", "Beta"))
        .with_trial(trial("t1", 2023))
        .with_trial(trial("t2", 2024))
        .with_results(plots("t1", "var-a", &["30", "30", "30", "30"]))
        .with_results(plots("t1", "var-b", &["33", "33", "33", "33"]))
        .with_results(plots("t2", "var-a", &["40", "40", "40", "40"]))
        .with_results(plots("t2", "var-b", &["41", "41", "41"]))
}

fn filter() -> ReportFilter {
    ReportFilter::new(CultureId::new("wheat").unwrap(), [2023, 2024])
}

#[test]
fn report_csv_has_one_line_per_variety() {
    let tree = build_report(&store(), &filter());
    let csv = report_csv(&tree).unwrap();
    insta::assert_snapshot!(csv, @r"
    region,site_id,site_name,maturity_group,variety_id,variety_name,default_standard,yield_2023,yield_2024,average
    North Oblast,north-a,Alpha GSU,mid,var-a,Alpha,true,30.00,40.00,35.00
    North Oblast,north-a,Alpha GSU,mid,var-b,Beta,false,33.00,,33.00
    ");
}

#[test]
fn scaffold_report_echoes_filter() {
    let filter = ReportFilter::new(CultureId::new("barley").unwrap(), [2024])
        .with_region("North Oblast");
    let tree = build_report(&store(), &filter);
    insta::assert_json_snapshot!(tree, @r#"
    {
      "filter": {
        "cultureId": "barley",
        "years": [
          2024
        ],
        "region": "North Oblast"
      },
      "regions": [
        {
          "region": "North Oblast",
          "years": [
            2024
          ],
          "sites": []
        }
      ]
    }
    "#);
}

#[test]
fn report_text_marks_the_default_standard() {
    let text = report_text(&build_report(&store(), &filter()));
    assert!(text.starts_with("Region: North Oblast\n"));
    assert!(text.contains("Site: Alpha GSU [north-a]"));
    assert!(text.contains("Alpha (st)"));
    assert!(text.contains("-2.0"));
}

#[test]
fn empty_report_text_says_so() {
    let filter = ReportFilter::new(CultureId::new("barley").unwrap(), [2024]);
    let text = report_text(&build_report(&store(), &filter));
    assert_eq!(text, "No trials match the filter.\n");
}

#[test]
fn absent_numbers_render_as_placeholder() {
    assert_eq!(format_value(None, 2), "-");
    assert_eq!(format_value(Some(31.25), 1), "31.2");
    assert_eq!(format_signed(Some(1.5), 2), "+1.50");
    assert_eq!(format_signed(Some(-0.5), 1), "-0.5");
}
