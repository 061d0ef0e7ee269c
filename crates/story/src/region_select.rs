//! Selection state machine for the allocation map.
//!
//! At most one region is selected. Clicking the selected region closes it;
//! clicking another while one is selected closes the first before opening
//! the second, so observers always see a `Close` before the next `Open`.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RegionSelection {
    #[default]
    None,
    Selected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionTransition {
    Open(String),
    Close(String),
}

impl RegionSelection {
    /// Handle a click on `region`, returning the transitions in the order
    /// they happen.
    pub fn click(&mut self, region: &str) -> Vec<SelectionTransition> {
        match std::mem::take(self) {
            RegionSelection::Selected(current) if current == region => {
                vec![SelectionTransition::Close(current)]
            }
            RegionSelection::Selected(current) => {
                *self = RegionSelection::Selected(region.to_string());
                vec![
                    SelectionTransition::Close(current),
                    SelectionTransition::Open(region.to_string()),
                ]
            }
            RegionSelection::None => {
                *self = RegionSelection::Selected(region.to_string());
                vec![SelectionTransition::Open(region.to_string())]
            }
        }
    }

    /// Close button: back to no selection.
    pub fn close(&mut self) -> Option<SelectionTransition> {
        match std::mem::take(self) {
            RegionSelection::Selected(current) => Some(SelectionTransition::Close(current)),
            RegionSelection::None => None,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        match self {
            RegionSelection::Selected(region) => Some(region),
            RegionSelection::None => None,
        }
    }

    /// Hover highlighting is suppressed while a region is selected.
    pub fn hover_enabled(&self) -> bool {
        matches!(self, RegionSelection::None)
    }
}
