//! Colorado River allocation map: drought-tier table, eager data load, and
//! the interactive view state (tier slider, region focus, overlay toggles).

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use bevy::prelude::*;

use crate::config::{StoryConfig, Timings, MEXICO_REGIONS, MEXICO_ROW};
use crate::dataset::{parse_number, Dataset};
use crate::error::LoadError;
use crate::fetch::FetchBatch;
use crate::geo::FeatureCollection;
use crate::region_select::{RegionSelection, SelectionTransition};
use crate::renderer::RendererHandle;
use crate::transform::percentage_of;
use crate::tween::{Easing, Tween};
use crate::StorySet;

/// Regions drawn on the map but never labeled (the Sonora label covers it).
pub const UNLABELED_REGION: &str = "Baja California";
const UNLABELED_POSTAL: &str = "BC";

// ---------------------------------------------------------------------------
// Tier table
// ---------------------------------------------------------------------------

/// Water a region is entitled to and what it receives under one tier, in MAF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionAllocation {
    pub allotment: f64,
    pub allocation: f64,
}

impl RegionAllocation {
    /// `allocation / allotment * 100`, unclamped.
    pub fn fill_percentage(&self) -> f64 {
        percentage_of(self.allocation, self.allotment)
    }
}

/// `""` (no drought) first, then numeric order. Non-numeric keys sort last
/// in text order.
pub fn compare_tier_keys(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Slider label for a tier key.
pub fn tier_label(key: &str) -> String {
    if key.is_empty() {
        "No Drought".to_string()
    } else {
        format!("Tier {key}")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DroughtTierTable {
    keys: Vec<String>,
    tiers: HashMap<String, BTreeMap<String, RegionAllocation>>,
}

impl DroughtTierTable {
    /// Build from rows of `Drought_Tier, State, Allotment, Allocation`.
    ///
    /// Rows without numeric amounts are skipped. The `Mexico` row is also
    /// stored under each Mexican state so both are filled from it.
    pub fn from_dataset(dataset: &Dataset) -> Result<Self, LoadError> {
        let [tier_col, state_col, allotment_col, allocation_col] = dataset.require_columns([
            &["drought_tier", "tier"][..],
            &["state"][..],
            &["allotment"][..],
            &["allocation"][..],
        ])?;

        let mut tiers: HashMap<String, BTreeMap<String, RegionAllocation>> = HashMap::new();
        for record in dataset.records() {
            let Some(state) = record.get(&state_col).filter(|s| !s.is_empty()) else {
                continue;
            };
            let (Some(allotment), Some(allocation)) = (
                record.get(&allotment_col).and_then(parse_number),
                record.get(&allocation_col).and_then(parse_number),
            ) else {
                continue;
            };
            let tier = record.get(&tier_col).unwrap_or("").to_string();
            let value = RegionAllocation {
                allotment,
                allocation,
            };
            let regions = tiers.entry(tier).or_default();
            regions.insert(state.to_string(), value);
            if state == MEXICO_ROW {
                for region in MEXICO_REGIONS {
                    regions.insert(region.to_string(), value);
                }
            }
        }

        if tiers.is_empty() {
            return Err(LoadError::Empty {
                what: "allocation rows",
            });
        }
        let mut keys: Vec<String> = tiers.keys().cloned().collect();
        keys.sort_by(|a, b| compare_tier_keys(a, b));
        Ok(Self { keys, tiers })
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn tier_count(&self) -> usize {
        self.keys.len()
    }

    /// Key at `index`, clamped to the available tiers.
    pub fn key(&self, index: usize) -> Option<&str> {
        let last = self.keys.len().checked_sub(1)?;
        self.keys.get(index.min(last)).map(String::as_str)
    }

    /// Regions of the tier at `index`.
    pub fn regions(&self, index: usize) -> Option<&BTreeMap<String, RegionAllocation>> {
        self.tiers.get(self.key(index)?)
    }

    /// Look a region up by name, falling back to its postal code.
    pub fn lookup(&self, index: usize, name: &str, postal: Option<&str>) -> Option<RegionAllocation> {
        let regions = self.regions(index)?;
        regions
            .get(name)
            .or_else(|| postal.and_then(|p| regions.get(p)))
            .copied()
    }
}

/// Whether a region gets an allocation label.
pub fn is_labeled(name: &str, postal: Option<&str>) -> bool {
    name != UNLABELED_REGION && postal != Some(UNLABELED_POSTAL)
}

/// Detail-panel text for a region.
pub fn region_description(name: &str) -> &'static str {
    match name {
        "Arizona" => "In the event of a shortage, Arizona's allocation may be reduced by up to 21% depending on the drought tier. These cuts affect CAP first, which supplies water to Phoenix and Tucson.",
        "California" => "California has senior water rights to the Colorado River, which means it has priority over other lower basin states in times of shortage. The shortage falls mostly on Arizona, which takes the majority of the cuts.",
        "Nevada" => "Nevada's allocation from the Colorado River is small compared to other states, but it is crucial for supplying water to Las Vegas and the surrounding area.",
        "New Mexico" => "New Mexico's allocation from the Colorado River is small compared to other states, but it supplies agriculture and communities in the northwest part of the state.",
        "Colorado" | "Utah" | "Wyoming" => "As an upper basin state, it is not directly cut by the drought tiers. It still plays a central role in managing the river and meeting the interstate compact.",
        "Sonora" | "Baja California" => "Mexico relies on its Colorado River allocation for agricultural and municipal use. In a shortage, Mexico's allocation is reduced in step with the drought tier.",
        _ => "Information about this region's water use and allocation.",
    }
}

// ---------------------------------------------------------------------------
// Slider selection
// ---------------------------------------------------------------------------

/// Index of the selected drought tier, always within the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierSelection {
    index: usize,
}

impl TierSelection {
    /// Select `index`, clamped to `[0, tier_count - 1]`. Returns whether the
    /// selection changed.
    pub fn set(&mut self, index: usize, tier_count: usize) -> bool {
        let clamped = index.min(tier_count.saturating_sub(1));
        let changed = clamped != self.index;
        self.index = clamped;
        changed
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

// ---------------------------------------------------------------------------
// Loaded data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationMap {
    pub states: FeatureCollection,
    pub basin_upper: FeatureCollection,
    pub basin_lower: FeatureCollection,
    pub river_main: FeatureCollection,
    pub river_tributaries: FeatureCollection,
    pub table: DroughtTierTable,
}

impl AllocationMap {
    /// Fetch order used by [`begin_map_load`].
    pub fn paths(config: &StoryConfig) -> Vec<String> {
        let p = &config.paths;
        [
            &p.states,
            &p.basin_upper,
            &p.basin_lower,
            &p.river_main,
            &p.river_tributaries,
            &p.allocation,
        ]
        .into_iter()
        .map(|path| config.resolve(path))
        .collect()
    }

    /// Parse texts delivered in [`paths`](Self::paths) order.
    pub fn from_texts(texts: &[String]) -> Result<Self, LoadError> {
        let [states, upper, lower, main, tributaries, allocation] = texts else {
            return Err(LoadError::Empty {
                what: "map sources",
            });
        };
        Ok(Self {
            states: FeatureCollection::from_json(states)?,
            basin_upper: FeatureCollection::from_json(upper)?,
            basin_lower: FeatureCollection::from_json(lower)?,
            river_main: FeatureCollection::from_json(main)?,
            river_tributaries: FeatureCollection::from_json(tributaries)?,
            table: DroughtTierTable::from_dataset(&Dataset::parse(allocation)?)?,
        })
    }
}

/// Eagerly loaded map data and its load status.
#[derive(Resource, Debug, Default)]
pub struct AllocationMapSlot {
    pending: Option<FetchBatch>,
    data: Option<AllocationMap>,
    handle: RendererHandle,
}

impl AllocationMapSlot {
    pub fn data(&self) -> Option<&AllocationMap> {
        self.data.as_ref()
    }

    pub fn handle(&self) -> &RendererHandle {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut RendererHandle {
        &mut self.handle
    }
}

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

/// Interactive state of the map, advanced with the frame clock (seconds).
#[derive(Resource, Debug, Clone)]
pub struct MapView {
    pub tier: TierSelection,
    selection: RegionSelection,
    basins_visible: bool,
    rivers_visible: bool,
    /// 0 at rest, 1 when fully moved to the focal point.
    focus: HashMap<String, Tween>,
    panel: Tween,
    labels: HashMap<String, Tween>,
    fills: HashMap<String, Tween>,
    timings: Timings,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            tier: TierSelection::default(),
            selection: RegionSelection::None,
            basins_visible: true,
            rivers_visible: true,
            focus: HashMap::new(),
            panel: Tween::settled(0.0),
            labels: HashMap::new(),
            fills: HashMap::new(),
            timings: Timings::default(),
        }
    }
}

impl MapView {
    pub fn with_timings(timings: Timings) -> Self {
        Self {
            timings,
            ..Default::default()
        }
    }

    /// Snap labels and fills to the selected tier without animating.
    pub fn reset_values(&mut self, table: &DroughtTierTable) {
        self.labels.clear();
        self.fills.clear();
        if let Some(regions) = table.regions(self.tier.index()) {
            for (name, value) in regions {
                self.labels
                    .insert(name.clone(), Tween::settled(value.allocation));
                self.fills
                    .insert(name.clone(), Tween::settled(value.fill_percentage()));
            }
        }
    }

    /// Move the slider. Labels and fills of regions present in the new tier
    /// animate from their displayed values. Returns whether the tier changed.
    pub fn select_tier(&mut self, index: usize, table: &DroughtTierTable, now: f64) -> bool {
        if !self.tier.set(index, table.tier_count()) {
            return false;
        }
        let duration = self.timings.tier_transition;
        if let Some(regions) = table.regions(self.tier.index()) {
            for (name, value) in regions {
                self.labels
                    .entry(name.clone())
                    .or_insert_with(|| Tween::settled(0.0))
                    .retarget(value.allocation, now, duration, Easing::CubicInOut);
                self.fills
                    .entry(name.clone())
                    .or_insert_with(|| Tween::settled(0.0))
                    .retarget(value.fill_percentage(), now, duration, Easing::CubicInOut);
            }
        }
        true
    }

    pub fn label_value(&self, region: &str, now: f64) -> Option<f64> {
        self.labels.get(region).map(|t| t.value_at(now))
    }

    pub fn fill_percentage(&self, region: &str, now: f64) -> Option<f64> {
        self.fills.get(region).map(|t| t.value_at(now))
    }

    /// Click on a region. Returns the selection transitions applied.
    pub fn click_region(&mut self, region: &str, now: f64) -> Vec<SelectionTransition> {
        let transitions = self.selection.click(region);
        for transition in &transitions {
            self.apply_transition(transition, now);
        }
        transitions
    }

    /// Detail-panel close button.
    pub fn close_selection(&mut self, now: f64) -> Option<SelectionTransition> {
        let transition = self.selection.close()?;
        self.apply_transition(&transition, now);
        Some(transition)
    }

    fn apply_transition(&mut self, transition: &SelectionTransition, now: f64) {
        let duration = self.timings.focus_transition;
        match transition {
            SelectionTransition::Open(region) => {
                self.focus
                    .entry(region.clone())
                    .or_insert_with(|| Tween::settled(0.0))
                    .retarget(1.0, now, duration, Easing::CubicOut);
            }
            SelectionTransition::Close(region) => {
                if let Some(focus) = self.focus.get_mut(region) {
                    focus.retarget(0.0, now, duration, Easing::CubicInOut);
                }
                self.panel
                    .retarget(0.0, now, self.timings.panel_fade, Easing::Linear);
            }
        }
    }

    /// Per-frame bookkeeping: opens the detail panel once the selected
    /// region has reached the focal point, and forgets finished tweens.
    pub fn advance(&mut self, now: f64) {
        if let Some(region) = self.selection.selected() {
            let arrived = self.focus.get(region).is_some_and(|t| t.is_finished(now));
            if arrived && self.panel.to < 1.0 {
                self.panel
                    .retarget(1.0, now, self.timings.panel_fade, Easing::Linear);
            }
        }
        self.focus
            .retain(|_, t| !(t.to == 0.0 && t.is_finished(now)));
    }

    pub fn selection(&self) -> &RegionSelection {
        &self.selection
    }

    /// Eased focus progress of `region` in `[0, 1]`.
    pub fn focus_progress(&self, region: &str, now: f64) -> f64 {
        self.focus.get(region).map_or(0.0, |t| t.value_at(now))
    }

    pub fn panel_opacity(&self, now: f64) -> f64 {
        self.panel.value_at(now)
    }

    /// Regions other than the selected one are hidden during a selection.
    pub fn region_visible(&self, region: &str) -> bool {
        match self.selection.selected() {
            Some(selected) => selected == region,
            None => true,
        }
    }

    pub fn hover_enabled(&self) -> bool {
        self.selection.hover_enabled()
    }

    pub fn toggle_basins(&mut self) {
        self.basins_visible = !self.basins_visible;
    }

    pub fn toggle_rivers(&mut self) {
        self.rivers_visible = !self.rivers_visible;
    }

    /// Toggle state, independent of any selection.
    pub fn basins_toggled_on(&self) -> bool {
        self.basins_visible
    }

    pub fn rivers_toggled_on(&self) -> bool {
        self.rivers_visible
    }

    /// Overlays are hidden while a region is selected and restored to their
    /// toggled visibility afterwards.
    pub fn basins_shown(&self) -> bool {
        self.basins_visible && self.selection.selected().is_none()
    }

    pub fn rivers_shown(&self) -> bool {
        self.rivers_visible && self.selection.selected().is_none()
    }
}

/// Screen transform of a focused region: `p' = p * scale + translate`.
///
/// At full progress the region's bounds center sits on `target`, scaled 1.5.
pub fn focus_transform(center: Vec2, target: Vec2, progress: f32) -> (Vec2, f32) {
    const FOCUS_SCALE: f32 = 1.5;
    let scale = 1.0 + (FOCUS_SCALE - 1.0) * progress;
    let translate = (target - center * FOCUS_SCALE) * progress;
    (translate, scale)
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

pub fn begin_map_load(config: Res<StoryConfig>, mut slot: ResMut<AllocationMapSlot>) {
    if !slot.handle.begin_load() {
        return;
    }
    let paths = AllocationMap::paths(&config);
    info!("Loading allocation map ({} sources)", paths.len());
    slot.pending = Some(FetchBatch::spawn(paths));
}

pub fn collect_map_load(mut slot: ResMut<AllocationMapSlot>, mut view: ResMut<MapView>) {
    let Some(result) = slot.pending.as_mut().and_then(FetchBatch::poll) else {
        return;
    };
    slot.pending = None;

    match result.and_then(|texts| AllocationMap::from_texts(&texts)) {
        Ok(map) => {
            info!(
                "Allocation map ready: {} regions, tiers {:?}",
                map.states.features.len(),
                map.table.keys()
            );
            view.reset_values(&map.table);
            slot.data = Some(map);
            slot.handle.finish_load(Ok(()));
        }
        Err(e) => {
            error!("Error loading allocation map: {}", e);
            slot.handle.fail_load(&e);
        }
    }
}

fn init_map_view(config: Res<StoryConfig>, mut commands: Commands) {
    commands.insert_resource(MapView::with_timings(config.timings.clone()));
}

// ---- Plugin ----

pub struct AllocationPlugin;

impl Plugin for AllocationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AllocationMapSlot>()
            .init_resource::<MapView>()
            .add_systems(Startup, (init_map_view, begin_map_load).chain())
            .add_systems(Update, collect_map_load.in_set(StorySet::Collect));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
Drought_Tier,State,Allotment,Allocation
,Arizona,2.8,2.8
,Mexico,1.5,1.5
,Nevada,0.3,0.3
1,Arizona,2.8,2.288
1,Mexico,1.5,1.45
2.5,Arizona,2.8,2.208
2,Arizona,2.8,2.208
0,Arizona,2.8,2.608
3,Arizona,2.8,2.08
4,Arizona,2.8,2.0
4,Nevada,0.3,n/a
";

    fn table() -> DroughtTierTable {
        DroughtTierTable::from_dataset(&Dataset::parse(TABLE).unwrap()).unwrap()
    }

    #[test]
    fn test_tier_key_order() {
        let t = table();
        assert_eq!(t.keys(), ["", "0", "1", "2", "2.5", "3", "4"]);
    }

    #[test]
    fn test_compare_tier_keys_non_numeric_last() {
        let mut keys = vec!["x", "2", "", "10", "1.5"];
        keys.sort_by(|a, b| compare_tier_keys(a, b));
        assert_eq!(keys, vec!["", "1.5", "2", "10", "x"]);
    }

    #[test]
    fn test_tier_labels() {
        assert_eq!(tier_label(""), "No Drought");
        assert_eq!(tier_label("2.5"), "Tier 2.5");
    }

    #[test]
    fn test_mexico_duplicated_into_both_states() {
        let t = table();
        for region in MEXICO_REGIONS {
            let v = t.lookup(2, region, None).unwrap();
            assert_eq!(v.allocation, 1.45);
            assert_eq!(v.allotment, 1.5);
        }
        assert_eq!(t.lookup(2, "Mexico", None).unwrap().allocation, 1.45);
    }

    #[test]
    fn test_lookup_by_postal_and_missing() {
        let t = table();
        assert!(t.lookup(0, "Nowhere", Some("Arizona")).is_some());
        assert!(t.lookup(0, "Utah", Some("UT")).is_none());
        // non-numeric row skipped
        assert!(t.lookup(6, "Nevada", None).is_none());
    }

    #[test]
    fn test_fill_percentage_unclamped() {
        let over = RegionAllocation {
            allotment: 2.0,
            allocation: 3.0,
        };
        assert!((over.fill_percentage() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_slider_clamped() {
        let mut sel = TierSelection::default();
        assert!(sel.set(3, 7));
        assert_eq!(sel.index(), 3);
        assert!(sel.set(99, 7));
        assert_eq!(sel.index(), 6);
        assert!(!sel.set(6, 7));
        sel.set(5, 0);
        assert_eq!(sel.index(), 0);
    }

    #[test]
    fn test_key_clamped() {
        let t = table();
        assert_eq!(t.key(100), Some("4"));
        assert_eq!(DroughtTierTable::default().key(0), None);
    }

    #[test]
    fn test_empty_table_is_error() {
        let ds = Dataset::parse("Drought_Tier,State,Allotment,Allocation\n,Arizona,x,y\n").unwrap();
        assert!(matches!(
            DroughtTierTable::from_dataset(&ds),
            Err(LoadError::Empty { .. })
        ));
    }

    #[test]
    fn test_labels() {
        assert!(is_labeled("Sonora", Some("SO")));
        assert!(!is_labeled("Baja California", None));
        assert!(!is_labeled("Baja", Some("BC")));
    }

    #[test]
    fn test_tier_change_tweens_labels() {
        let t = table();
        let mut view = MapView::default();
        view.reset_values(&t);
        assert_eq!(view.label_value("Arizona", 0.0), Some(2.8));

        assert!(view.select_tier(2, &t, 10.0));
        assert_eq!(view.label_value("Arizona", 10.0), Some(2.8));
        let mid = view.label_value("Arizona", 10.4).unwrap();
        assert!(mid < 2.8 && mid > 2.288);
        assert!((view.label_value("Arizona", 11.0).unwrap() - 2.288).abs() < 1e-9);
        // Nevada has no tier-1 row and keeps its displayed value
        assert_eq!(view.label_value("Nevada", 11.0), Some(0.3));

        assert!(!view.select_tier(2, &t, 12.0));
    }

    #[test]
    fn test_selection_hides_overlays_and_opens_panel() {
        let mut view = MapView::default();
        view.toggle_rivers();
        view.click_region("Arizona", 0.0);
        assert!(!view.basins_shown());
        assert!(!view.region_visible("Nevada"));
        assert!(view.region_visible("Arizona"));
        assert!(!view.hover_enabled());

        view.advance(0.3);
        assert_eq!(view.panel_opacity(0.3), 0.0);
        view.advance(0.6);
        assert_eq!(view.panel_opacity(0.9), 1.0);
        assert_eq!(view.focus_progress("Arizona", 0.6), 1.0);

        view.close_selection(1.0);
        assert!(view.basins_shown());
        assert!(!view.rivers_shown());
        assert!(view.region_visible("Nevada"));
        assert_eq!(view.panel_opacity(1.3), 0.0);
        assert_eq!(view.focus_progress("Arizona", 1.6), 0.0);
    }

    #[test]
    fn test_switching_regions_animates_both() {
        let mut view = MapView::default();
        view.click_region("Nevada", 0.0);
        let transitions = view.click_region("Utah", 1.0);
        assert_eq!(
            transitions,
            vec![
                SelectionTransition::Close("Nevada".into()),
                SelectionTransition::Open("Utah".into()),
            ]
        );
        let nevada = view.focus_progress("Nevada", 1.3);
        assert!(nevada > 0.0 && nevada < 1.0);
        assert_eq!(view.focus_progress("Utah", 1.6), 1.0);
        assert!(!view.region_visible("Nevada"));
    }

    #[test]
    fn test_focus_transform_endpoints() {
        let center = Vec2::new(400.0, 300.0);
        let target = Vec2::new(150.0, 200.0);
        let (t0, s0) = focus_transform(center, target, 0.0);
        assert_eq!((t0, s0), (Vec2::ZERO, 1.0));
        let (t1, s1) = focus_transform(center, target, 1.0);
        assert_eq!(center * s1 + t1, target);
    }

    #[test]
    fn test_from_texts_requires_all_sources() {
        assert!(matches!(
            AllocationMap::from_texts(&["{}".to_string()]),
            Err(LoadError::Empty { .. })
        ));
        let texts = vec![
            r#"{"type":"FeatureCollection","features":[]}"#.to_string(),
            "{}".into(),
            "{}".into(),
            "{}".into(),
            "{}".into(),
            TABLE.into(),
        ];
        let map = AllocationMap::from_texts(&texts).unwrap();
        assert_eq!(map.table.tier_count(), 7);
    }
}
