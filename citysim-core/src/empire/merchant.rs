use super::{CityId, RouteId};
use crate::geometry::PointF;
use crate::goods::SimpleGoodStore;
use serde::{Deserialize, Serialize};

/// Merchant id, unique within its route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MerchantId(pub u32);

impl std::fmt::Display for MerchantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "merchant#{}", self.0)
    }
}

/// One leg of a merchant's journey.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Leg {
    pub from_city: CityId,
    pub to_city: CityId,
    pub location: PointF,
    pub destination: PointF,
}

/// A caravan travelling between the two ends of a trade route.
#[derive(Debug, Clone, PartialEq)]
pub struct EmpireMerchant {
    id: MerchantId,
    route: RouteId,
    goods: SimpleGoodStore,
    from_city: CityId,
    to_city: CityId,
    origin: PointF,
    location: PointF,
    destination: PointF,
    arrived: bool,
    retired: bool,
}

impl EmpireMerchant {
    pub(crate) fn new(id: MerchantId, route: RouteId, goods: SimpleGoodStore, leg: Leg) -> Self {
        Self {
            id,
            route,
            goods,
            from_city: leg.from_city,
            to_city: leg.to_city,
            origin: leg.location,
            location: leg.location,
            destination: leg.destination,
            arrived: false,
            retired: false,
        }
    }

    pub fn id(&self) -> MerchantId {
        self.id
    }

    /// Route this merchant travels on.
    pub fn route(&self) -> RouteId {
        self.route
    }

    pub fn goods(&self) -> &SimpleGoodStore {
        &self.goods
    }

    pub fn goods_mut(&mut self) -> &mut SimpleGoodStore {
        &mut self.goods
    }

    pub fn location(&self) -> PointF {
        self.location
    }

    pub fn destination(&self) -> PointF {
        self.destination
    }

    /// City the merchant is heading to.
    pub fn destination_city(&self) -> CityId {
        self.to_city
    }

    pub fn origin_city(&self) -> CityId {
        self.from_city
    }

    pub fn is_arrived(&self) -> bool {
        self.arrived
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    /// Head back to where this leg started. Re-arms arrival detection.
    pub fn reverse(&mut self) {
        std::mem::swap(&mut self.from_city, &mut self.to_city);
        std::mem::swap(&mut self.origin, &mut self.destination);
        self.arrived = false;
    }

    /// Schedule removal. The route drops retired merchants on its next update.
    pub fn retire(&mut self) {
        self.retired = true;
    }

    /// Move `1 / travel_steps` of the remaining distance toward the destination.
    ///
    /// Returns true on the update that first brings the merchant within
    /// `arrival_distance`; later updates keep converging but stay silent.
    pub fn update(&mut self, travel_steps: f32, arrival_distance: f32) -> bool {
        if self.retired {
            return false;
        }
        let delta = (self.destination - self.location) / travel_steps;
        self.location += delta;

        if !self.arrived && self.destination.distance_to(self.location) < arrival_distance {
            self.arrived = true;
            return true;
        }
        false
    }
}
