use bevy::math::Vec2;
use chrono::NaiveDate;

use super::*;
use crate::error::LoadError;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ====================================================================
// Water history
// ====================================================================

#[test]
fn test_water_history_drops_incomplete_rows_before_indexing() {
    let csv = "Year,Water_Production_AF,Population\n\
               1990,100,1000\n\
               1991,,1100\n\
               1992,120,1200\n";
    let history = WaterHistory::transform(csv).unwrap();
    assert_eq!(history.years(), vec![1990.0, 1992.0]);
    let water: Vec<f64> = history.records.iter().map(|r| r.water_index).collect();
    assert_eq!(water, vec![100.0, 120.0]);
    let pop: Vec<f64> = history.records.iter().map(|r| r.population_index).collect();
    assert_eq!(pop, vec![100.0, 120.0]);
}

#[test]
fn test_water_history_per_capita() {
    let history = WaterHistory::transform("year,af,pop\n2000,500,250000\n").unwrap();
    let per_k = history.records[0].af_per_thousand().unwrap();
    assert!(close(per_k, 2.0));
}

#[test]
fn test_water_history_index_axis_floor() {
    let csv = "year,water,pop\n1990,100,100\n2000,50,160\n";
    let history = WaterHistory::transform(csv).unwrap();
    let scale = history.index_scale((0.0, 100.0));
    // min index is 50, so the floor of 80 applies before nicing
    assert!(scale.domain.0 >= 80.0);
    assert!(scale.domain.1 >= 168.0);
}

#[test]
fn test_water_history_missing_columns_aborts() {
    let err = WaterHistory::transform("year,flow\n1990,1\n").unwrap_err();
    assert!(matches!(err, LoadError::MissingColumns { .. }));
    assert!(err.aborts_silently());
}

#[test]
fn test_water_history_all_rows_invalid_is_empty() {
    let err = WaterHistory::transform("year,water,pop\nx,1,2\n").unwrap_err();
    assert!(matches!(err, LoadError::Empty { .. }));
}

// ====================================================================
// Projections
// ====================================================================

#[test]
fn test_projections_keyword_columns_and_ceiling() {
    let csv = "Year,Low_Series,Reference,High_Series\n\
               2015,1.5,1.6,1.7\n\
               2040,1.9,2.2,2.6\n\
               2065,2.0,2.5,3.0\n";
    let p = Projections::transform(csv).unwrap();
    assert_eq!(p.years(), vec![2015.0, 2040.0, 2065.0]);
    assert!(close(p.records[1].value(Scenario::Medium), 2.2));
    assert!(close(p.value_ceiling(), 3.0 * 1.05));
}

#[test]
fn test_projections_rows_need_every_scenario() {
    let csv = "year,low,medium,high\n2015,1,2,3\n2020,1,,3\nnope,1,2,3\n";
    let p = Projections::transform(csv).unwrap();
    assert_eq!(p.records.len(), 1);
}

// ====================================================================
// Natural flow
// ====================================================================

fn river_rows(years: std::ops::RangeInclusive<u32>, flow_af: impl Fn(u32) -> String) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = (0..6).map(|i| vec![format!("preamble {i}")]).collect();
    for year in years {
        let mut row = vec![String::new(); 23];
        row[2] = year.to_string();
        row[22] = flow_af(year);
        rows.push(row);
    }
    rows
}

#[test]
fn test_natural_flow_average_spans_dropped_years() {
    let rows = river_rows(1906..=1930, |y| ((y - 1900) as f64 * 1_000_000.0).to_string());
    let flow = NaturalFlow::from_rows(&rows).unwrap();

    assert_eq!(flow.records.first().unwrap().year, 1916.0);
    assert_eq!(flow.records.len(), 15);
    let first = flow.records[0];
    assert!(close(first.flow, 16.0));
    // 1907..=1916 -> 7..=16 MAF
    assert!(close(first.moving_average.unwrap(), 11.5));
    assert!(first.in_deficit());

    let last = flow.records.last().unwrap();
    // 1921..=1930 -> 21..=30 MAF
    assert!(close(last.moving_average.unwrap(), 25.5));
    assert!(!last.in_deficit());
}

#[test]
fn test_natural_flow_drops_non_numeric_flow() {
    let rows = river_rows(1916..=1920, |y| {
        if y == 1918 {
            "n/a".to_string()
        } else {
            "15000000".to_string()
        }
    });
    let flow = NaturalFlow::from_rows(&rows).unwrap();
    let years: Vec<f64> = flow.records.iter().map(|r| r.year).collect();
    assert_eq!(years, vec![1916.0, 1917.0, 1919.0, 1920.0]);
    // too few rows for any average
    assert_eq!(flow.averaged().count(), 0);
}

#[test]
fn test_natural_flow_only_preamble_is_empty() {
    let rows = river_rows(1900..=1915, |_| "1".to_string());
    assert!(matches!(
        NaturalFlow::from_rows(&rows),
        Err(LoadError::Empty { .. })
    ));
}

#[test]
fn test_natural_flow_blank_preamble_line_keeps_first_year() {
    let mut text = String::from("title\n\nsource\nunits\nnotes\nheader\n");
    for year in 1917..=1918 {
        let mut fields = vec![String::new(); 23];
        fields[2] = year.to_string();
        fields[22] = "15000000".to_string();
        text.push_str(&fields.join(","));
        text.push('\n');
    }
    let flow = NaturalFlow::transform(&text).unwrap();
    let years: Vec<f64> = flow.records.iter().map(|r| r.year).collect();
    assert_eq!(years, vec![1917.0, 1918.0]);
}

// ====================================================================
// Reservoirs
// ====================================================================

#[test]
fn test_mead_storage_bands() {
    let max = 28_000_000.0;
    assert_eq!(StorageBand::classify(25_000_000.0, max), Some(StorageBand::Comfort));
    assert_eq!(StorageBand::classify(20_000_000.0, max), Some(StorageBand::Comfort));
    assert_eq!(StorageBand::classify(17_500_000.0, max), Some(StorageBand::Warning));
    assert_eq!(StorageBand::classify(15_000_000.0, max), Some(StorageBand::Warning));
    assert_eq!(StorageBand::classify(9_000_000.0, max), Some(StorageBand::ShortageRisk));
    assert_eq!(StorageBand::classify(-1.0, max), None);
}

#[test]
fn test_mead_transform_and_scale() {
    let csv = "Year,Storage_AF\n1980,\"26,000,000\"\n2000,24000000\n2022,7000000\n";
    let mead = LakeMead::transform(csv).unwrap();
    assert_eq!(mead.years(), vec![1980.0, 2000.0, 2022.0]);
    assert!(close(mead.max_storage(), 26_000_000.0));
    let scale = mead.storage_scale((300.0, 0.0));
    assert_eq!(scale.domain.0, 0.0);
    assert!(scale.domain.1 >= 28_600_000.0);
    assert_eq!(mead.band_of(&mead.records[2]), Some(StorageBand::ShortageRisk));
}

#[test]
fn test_powell_sorts_by_date_and_bisects() {
    let csv = "datetime,storage\n\
               2021-07-01,6000000\n\
               2020-01-01,12000000\n\
               2021-01-01,9000000\n";
    let powell = LakePowell::transform(csv).unwrap();
    let dates: Vec<NaiveDate> = powell.records.iter().map(|r| r.date).collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 7, 1).unwrap(),
        ]
    );

    let probe = powell.records[0].x() + 10.0;
    let hit = powell.record_at_or_after(probe).unwrap();
    assert_eq!(hit.month_label(), "January 2021");
    assert!(powell.record_at_or_after(powell.records[2].x() + 1.0).is_none());
}

// ====================================================================
// Groundwater
// ====================================================================

fn gw_row(name: &str, value: &str) -> Vec<String> {
    vec![name.to_string(), "x".to_string(), value.to_string()]
}

#[test]
fn test_groundwater_filters_and_takes_top_ten() {
    let mut rows = vec![
        vec!["short".to_string(), "row".to_string()],
        gw_row("", "500"),
        gw_row("Tiny aquifer", "10"),
        gw_row("Bad value", "lots"),
    ];
    for i in 0..12 {
        rows.push(gw_row(&format!("Aquifer {i}"), &format!("{}", 20 + i * 10)));
    }
    rows.push(gw_row("Central Arizona", "95"));

    let gw = Groundwater::from_rows(&rows).unwrap();
    assert_eq!(gw.depletions.len(), 10);
    assert_eq!(gw.depletions[0].name, "Aquifer 11");
    assert!(close(gw.max_km3(), 130.0));
    assert!(gw
        .depletions
        .windows(2)
        .all(|w| w[0].km3 >= w[1].km3));
    assert!(gw.depletions.iter().all(|d| d.km3 > 10.0));
    assert!(gw.depletions.iter().any(Depletion::is_arizona));
}

#[test]
fn test_depletion_unit_conversion() {
    let d = Depletion {
        name: "High Plains".into(),
        km3: 100.0,
    };
    assert!(close(d.maf(), 81.07));
    assert!(!d.is_arizona());
}

// ====================================================================
// Water sources
// ====================================================================

fn portfolio_layout() -> SankeyLayout {
    SankeyGraph::phoenix_portfolio().layout(Vec2::new(600.0, 260.0), 14.0, 18.0)
}

#[test]
fn test_sankey_node_values_conserve_flow() {
    let graph = SankeyGraph::phoenix_portfolio();
    let layout = portfolio_layout();
    for node in &layout.nodes {
        let inflow: f64 = graph.links.iter().filter(|l| l.1 == node.index).map(|l| l.2).sum();
        let outflow: f64 = graph.links.iter().filter(|l| l.0 == node.index).map(|l| l.2).sum();
        assert!(close(node.value, inflow.max(outflow)), "{}", node.name);
    }
    let sources: f64 = layout.nodes.iter().filter(|n| n.depth == 0).map(|n| n.value).sum();
    let sinks: f64 = layout.nodes.iter().filter(|n| n.depth == 1).map(|n| n.value).sum();
    assert!(close(sources, 100.0));
    assert!(close(sinks, 100.0));
}

#[test]
fn test_sankey_columns_share_scale() {
    let layout = portfolio_layout();
    // four sources need more padding than three sinks, so they bound ky
    assert!((layout.ky - (260.0 - 3.0 * 18.0) / 100.0).abs() < 1e-4);

    for node in &layout.nodes {
        assert!(((node.y1 - node.y0) - node.value as f32 * layout.ky).abs() < 1e-3);
        assert!(node.y0 >= -1e-3 && node.y1 <= 260.0 + 1e-3);
    }
    assert_eq!(layout.nodes[0].x0, 0.0);
    assert_eq!(layout.nodes[4].x1, 600.0);
}

#[test]
fn test_sankey_bands_fill_their_nodes() {
    let layout = portfolio_layout();
    for node in &layout.nodes {
        let out: f32 = layout.links.iter().filter(|l| l.source == node.index).map(|l| l.width).sum();
        let inc: f32 = layout.links.iter().filter(|l| l.target == node.index).map(|l| l.width).sum();
        let h = node.y1 - node.y0;
        assert!(out.max(inc) - h < 1e-3, "{}", node.name);
        for l in layout.links.iter().filter(|l| l.source == node.index) {
            assert!(l.y0 - l.width / 2.0 >= node.y0 - 1e-3);
            assert!(l.y0 + l.width / 2.0 <= node.y1 + 1e-3);
        }
    }
}

#[test]
fn test_sankey_hit_testing() {
    let layout = portfolio_layout();
    let srp = &layout.nodes[0];
    let centre = Vec2::new((srp.x0 + srp.x1) / 2.0, srp.center_y());
    assert_eq!(layout.hit(centre), Highlight::Node(0));

    let link = &layout.links[0];
    let [start, _, _, end] = layout.link_curve(link);
    let mid_x = (start.x + end.x) / 2.0;
    let mid_y = layout.link_y_at(link, mid_x).unwrap();
    assert!((mid_y - (link.y0 + link.y1) / 2.0).abs() < 0.1);
    assert_eq!(layout.hit(Vec2::new(mid_x, mid_y)), Highlight::Link(0));

    assert_eq!(layout.hit(Vec2::new(-50.0, -50.0)), Highlight::None);
}

#[test]
fn test_highlight_opacity() {
    let layout = portfolio_layout();
    let link = &layout.links[3]; // CAP -> City taps
    assert_eq!(Highlight::None.link_opacity(link), 0.65);
    assert_eq!(Highlight::Node(1).link_opacity(link), 0.65);
    assert_eq!(Highlight::Node(2).link_opacity(link), 0.12);
    assert_eq!(Highlight::Link(3).link_opacity(link), 0.65);
    assert_eq!(Highlight::Link(4).link_opacity(link), 0.12);

    assert_eq!(Highlight::Link(3).node_opacity(1, &layout), 1.0);
    assert_eq!(Highlight::Link(3).node_opacity(4, &layout), 1.0);
    assert_eq!(Highlight::Link(3).node_opacity(0, &layout), 0.45);
    assert_eq!(Highlight::Node(0).node_opacity(0, &layout), 1.0);
}

#[test]
fn test_sankey_descriptions() {
    let layout = portfolio_layout();
    let (title, body) = layout.describe(Highlight::Link(0)).unwrap();
    assert_eq!(title, "SRP → City taps");
    assert!(body.contains("Roughly 36%"));
    let (title, body) = layout.describe(Highlight::Node(1)).unwrap();
    assert_eq!(title, "CAP");
    assert!(body.contains("Central Arizona Project"));
    assert!(layout.describe(Highlight::None).is_none());
}

#[test]
fn test_water_sources_is_builtin() {
    assert!(WaterSources::path(&crate::config::StoryConfig::default()).is_none());
    let data = WaterSources::builtin().unwrap();
    assert_eq!(data.graph.nodes.len(), 7);
    assert_eq!(data.graph.links.len(), 10);
}
