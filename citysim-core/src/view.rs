//! Map overlay view selection.
//!
//! Views are grouped in a two-level menu: top-level categories, some of
//! which open a submenu of specific views. Choosing a view publishes it on
//! [`OverlayViewSelector::on_select`]; drawing the overlay is up to the
//! listener.

use crate::building::Building;
use crate::signal::Signal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayView {
    Nothing,
    Water,
    Risk,
    RiskFire,
    RiskDamage,
    RiskCrime,
    RiskAborigen,
    RiskTroubles,
    Entertainment,
    EntertainmentAll,
    EntertainmentTheatres,
    EntertainmentAmphitheatres,
    EntertainmentColosseum,
    EntertainmentHippodrome,
    Education,
    EducationAll,
    EducationSchool,
    EducationLibrary,
    EducationAcademy,
    Health,
    HealthBarber,
    HealthBath,
    HealthClinic,
    HealthHospital,
    Commerce,
    CommerceTax,
    CommerceFood,
    CommercePrestige,
    Religion,
}

impl OverlayView {
    /// Top-level menu entries, in display order.
    pub const CATEGORIES: [OverlayView; 8] = [
        OverlayView::Nothing,
        OverlayView::Water,
        OverlayView::Risk,
        OverlayView::Entertainment,
        OverlayView::Education,
        OverlayView::Health,
        OverlayView::Commerce,
        OverlayView::Religion,
    ];

    /// Entries of the submenu a category opens. Leaf views and categories
    /// without a submenu return an empty slice.
    pub fn submenu(self) -> &'static [OverlayView] {
        use OverlayView::*;
        match self {
            Risk => &[RiskFire, RiskDamage, RiskCrime, RiskAborigen, RiskTroubles],
            Entertainment => &[
                EntertainmentAll,
                EntertainmentTheatres,
                EntertainmentAmphitheatres,
                EntertainmentColosseum,
                EntertainmentHippodrome,
            ],
            Education => &[
                EducationAll,
                EducationSchool,
                EducationLibrary,
                EducationAcademy,
            ],
            Health => &[HealthBarber, HealthBath, HealthClinic, HealthHospital],
            Commerce => &[CommerceTax, CommerceFood, CommercePrestige],
            _ => &[],
        }
    }

    pub fn is_category(self) -> bool {
        Self::CATEGORIES.contains(&self)
    }

    /// Localization key of the menu entry.
    pub fn label(self) -> &'static str {
        use OverlayView::*;
        match self {
            Nothing => "##ovrm_nothing##",
            Water => "##ovrm_water##",
            Risk => "##ovrm_risk##",
            RiskFire => "##ovrm_fire##",
            RiskDamage => "##ovrm_damage##",
            RiskCrime => "##ovrm_crime##",
            RiskAborigen => "##ovrm_aborigen##",
            RiskTroubles => "##ovrm_troubles##",
            Entertainment => "##ovrm_entertainment##",
            EntertainmentAll => "##ovrm_entr_all##",
            EntertainmentTheatres => "##ovrm_theatres##",
            EntertainmentAmphitheatres => "##ovrm_amtheatres##",
            EntertainmentColosseum => "##ovrm_colliseum##",
            EntertainmentHippodrome => "##ovrm_hpdrome##",
            Education => "##ovrm_education##",
            EducationAll => "##ovrm_edct_all##",
            EducationSchool => "##ovrm_school##",
            EducationLibrary => "##ovrm_library##",
            EducationAcademy => "##ovrm_academy##",
            Health => "##ovrm_health##",
            HealthBarber => "##ovrm_barber##",
            HealthBath => "##ovrm_bath##",
            HealthClinic => "##ovrm_clinic##",
            HealthHospital => "##ovrm_hospital##",
            Commerce => "##ovrm_commerce##",
            CommerceTax => "##ovrm_tax##",
            CommerceFood => "##ovrm_food##",
            CommercePrestige => "##ovrm_prestige##",
            Religion => "##ovrm_religion##",
        }
    }

    /// Per-building value shown by risk views.
    pub fn risk_level(self, building: &Building) -> Option<f32> {
        match self {
            OverlayView::RiskFire => Some(building.fire_level()),
            OverlayView::RiskDamage => Some(building.damage_level()),
            _ => None,
        }
    }
}

/// Menu state: the submenu currently open and the last chosen view.
#[derive(Debug)]
pub struct OverlayViewSelector {
    current: OverlayView,
    open: Option<OverlayView>,
    on_select: Signal<OverlayView>,
}

impl Default for OverlayViewSelector {
    fn default() -> Self {
        Self {
            current: OverlayView::Nothing,
            open: None,
            on_select: Signal::new(),
        }
    }
}

impl OverlayViewSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> OverlayView {
        self.current
    }

    pub fn open_submenu(&self) -> Option<OverlayView> {
        self.open
    }

    /// Hovering a category opens its submenu, or closes any open one.
    pub fn hover(&mut self, category: OverlayView) -> &'static [OverlayView] {
        let items = category.submenu();
        self.open = (!items.is_empty()).then_some(category);
        items
    }

    /// Choose a view: closes the submenu and notifies listeners.
    pub fn select(&mut self, view: OverlayView) {
        self.open = None;
        self.current = view;
        log::debug!("Overlay view selected: {:?}", view);
        self.on_select.emit(&view);
    }

    pub fn on_select(&mut self) -> &mut Signal<OverlayView> {
        &mut self.on_select
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_submenus() {
        assert_eq!(OverlayView::Risk.submenu().len(), 5);
        assert_eq!(OverlayView::Commerce.submenu()[2], OverlayView::CommercePrestige);
        assert!(OverlayView::Water.submenu().is_empty());
        assert!(OverlayView::RiskFire.submenu().is_empty());
        assert!(OverlayView::Religion.is_category());
        assert!(!OverlayView::HealthBath.is_category());
    }

    #[test]
    fn test_hover_opens_and_closes() {
        let mut selector = OverlayViewSelector::new();
        assert_eq!(selector.hover(OverlayView::Health).len(), 4);
        assert_eq!(selector.open_submenu(), Some(OverlayView::Health));
        assert!(selector.hover(OverlayView::Water).is_empty());
        assert_eq!(selector.open_submenu(), None);
    }

    #[test]
    fn test_select_emits_once() {
        let chosen = Rc::new(RefCell::new(Vec::new()));
        let sink = chosen.clone();
        let mut selector = OverlayViewSelector::new();
        selector
            .on_select()
            .connect(move |v: &OverlayView| sink.borrow_mut().push(*v));

        selector.hover(OverlayView::Risk);
        selector.select(OverlayView::RiskFire);
        assert_eq!(*chosen.borrow(), vec![OverlayView::RiskFire]);
        assert_eq!(selector.current(), OverlayView::RiskFire);
        assert_eq!(selector.open_submenu(), None);
    }
}
