use super::merchant::{EmpireMerchant, Leg, MerchantId};
use super::trading::{MerchantArrival, TradeConfig};
use super::{CityId, CityRegistry, RouteId};
use crate::geometry::PointF;
use crate::goods::SimpleGoodStore;

/// Registry key for a route: the two city names in canonical order, so a
/// route and its mirror share one key while distinct pairs never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    first: String,
    second: String,
}

impl RouteKey {
    pub fn new(a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first: first.to_string(),
            second: second.to_string(),
        }
    }
}

/// What one route update produced.
#[derive(Debug, Default)]
pub struct RouteUpdate {
    pub spawned: Option<MerchantId>,
    pub retired: usize,
    pub arrivals: Vec<MerchantArrival>,
}

/// Path between two cities and the merchants travelling it, in transit order.
#[derive(Debug, Clone)]
pub struct EmpireTradeRoute {
    id: RouteId,
    begin: CityId,
    end: CityId,
    merchants: Vec<EmpireMerchant>,
    next_merchant: u32,
}

impl EmpireTradeRoute {
    pub(crate) fn new(id: RouteId, begin: CityId, end: CityId) -> Self {
        Self {
            id,
            begin,
            end,
            merchants: Vec::new(),
            next_merchant: 0,
        }
    }

    pub fn id(&self) -> RouteId {
        self.id
    }

    pub fn begin_city(&self) -> CityId {
        self.begin
    }

    pub fn end_city(&self) -> CityId {
        self.end
    }

    pub fn merchants(&self) -> &[EmpireMerchant] {
        &self.merchants
    }

    pub fn merchants_mut(&mut self) -> &mut [EmpireMerchant] {
        &mut self.merchants
    }

    /// Merchant at `index` in transit order.
    pub fn merchant(&self, index: usize) -> Option<&EmpireMerchant> {
        let merchant = self.merchants.get(index);
        if merchant.is_none() {
            log::debug!(
                "Route {} has no merchant at index {} ({} in transit)",
                self.id,
                index,
                self.merchants.len()
            );
        }
        merchant
    }

    pub fn merchant_by_id(&mut self, id: MerchantId) -> Option<&mut EmpireMerchant> {
        self.merchants.iter_mut().find(|m| m.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.merchants.is_empty()
    }

    /// Put a merchant on the road on behalf of `start`.
    ///
    /// A merchant started from the route's begin city sets off at the end
    /// city and heads for the begin city; one started from the end city
    /// travels the other way.
    pub fn add_merchant(
        &mut self,
        start: CityId,
        goods: SimpleGoodStore,
        cities: &CityRegistry,
    ) -> MerchantId {
        let (from_city, to_city) = if start == self.begin {
            (self.end, self.begin)
        } else {
            (self.begin, self.end)
        };
        let id = MerchantId(self.next_merchant);
        self.next_merchant += 1;

        let leg = Leg {
            from_city,
            to_city,
            location: location_of(cities, from_city),
            destination: location_of(cities, to_city),
        };
        log::debug!(
            "Route {}: {} sets off from {} toward {}",
            self.id,
            id,
            leg.location.round(),
            leg.destination.round()
        );
        self.merchants
            .push(EmpireMerchant::new(id, self.id, goods, leg));
        id
    }

    /// Drop retired merchants, spawn an empty-handed one from the begin city
    /// if nobody is on the road, then advance everyone.
    pub fn update(&mut self, time: u64, cities: &CityRegistry, config: &TradeConfig) -> RouteUpdate {
        let before = self.merchants.len();
        self.merchants.retain(|m| !m.is_retired());
        let mut report = RouteUpdate {
            retired: before - self.merchants.len(),
            ..Default::default()
        };

        if self.merchants.is_empty() {
            report.spawned = Some(self.add_merchant(self.begin, SimpleGoodStore::new(), cities));
        }

        for merchant in &mut self.merchants {
            if merchant.update(config.travel_steps, config.arrival_distance) {
                report.arrivals.push(MerchantArrival {
                    tick: time,
                    route: self.id,
                    merchant: merchant.id(),
                    city: merchant.destination_city(),
                    location: merchant.location(),
                });
            }
        }
        report
    }
}

fn location_of(cities: &CityRegistry, id: CityId) -> PointF {
    match cities.get(id) {
        Some(city) => city.location().into(),
        None => {
            log::warn!("Trade route endpoint {} not found", id);
            PointF::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::empire::EmpireCity;
    use crate::geometry::Point;
    use crate::goods::GoodStore;

    fn two_cities() -> (CityRegistry, CityId, CityId) {
        let mut cities = CityRegistry::default();
        let a = cities.add(EmpireCity::new("Roma").with_location(Point::new(100, 100)));
        let b = cities.add(EmpireCity::new("Capua").with_location(Point::new(400, 100)));
        (cities, a, b)
    }

    #[test]
    fn test_route_key_is_unordered() {
        assert_eq!(RouteKey::new("Roma", "Capua"), RouteKey::new("Capua", "Roma"));
        // An additive hash would let these alias
        assert_ne!(RouteKey::new("ab", "c"), RouteKey::new("a", "bc"));
    }

    #[test]
    fn test_empty_route_spawns_toward_begin() {
        let (cities, a, b) = two_cities();
        let mut route = EmpireTradeRoute::new(RouteId(0), a, b);
        let report = route.update(1, &cities, &TradeConfig::default());

        assert_eq!(report.spawned, Some(MerchantId(0)));
        assert_eq!(route.merchants().len(), 1);
        let m = &route.merchants()[0];
        // First step already taken from the end city
        assert_eq!(m.location(), PointF::new(390.0, 100.0));
        assert_eq!(m.destination(), PointF::new(100.0, 100.0));
        assert_eq!(m.destination_city(), a);
        assert!(m.goods().is_empty());
    }

    #[test]
    fn test_non_empty_route_does_not_spawn() {
        let (cities, a, b) = two_cities();
        let mut route = EmpireTradeRoute::new(RouteId(0), a, b);
        route.add_merchant(b, SimpleGoodStore::new(), &cities);
        let report = route.update(1, &cities, &TradeConfig::default());
        assert!(report.spawned.is_none());
        assert_eq!(route.merchants().len(), 1);
        assert_eq!(route.merchants()[0].destination_city(), b);
    }

    #[test]
    fn test_merchant_index_out_of_range() {
        let (cities, a, b) = two_cities();
        let mut route = EmpireTradeRoute::new(RouteId(0), a, b);
        route.add_merchant(a, SimpleGoodStore::new(), &cities);
        assert!(route.merchant(0).is_some());
        assert!(route.merchant(1).is_none());
    }

    #[test]
    fn test_retired_merchant_swept_on_update() {
        let (cities, a, b) = two_cities();
        let mut route = EmpireTradeRoute::new(RouteId(0), a, b);
        let first = route.add_merchant(a, SimpleGoodStore::new(), &cities);
        let second = route.add_merchant(b, SimpleGoodStore::new(), &cities);
        route.merchant_by_id(first).unwrap().retire();

        let report = route.update(1, &cities, &TradeConfig::default());
        assert_eq!(report.retired, 1);
        assert_eq!(route.merchants().len(), 1);
        assert_eq!(route.merchants()[0].id(), second);
    }

    #[test]
    fn test_arrival_reported_with_destination() {
        let (cities, a, b) = two_cities();
        let mut route = EmpireTradeRoute::new(RouteId(3), a, b);
        let config = TradeConfig::default();
        let mut arrivals = Vec::new();
        for t in 0..200 {
            arrivals.extend(route.update(t, &cities, &config).arrivals);
        }
        assert_eq!(arrivals.len(), 1);
        assert_eq!(arrivals[0].route, RouteId(3));
        assert_eq!(arrivals[0].city, a);
    }
}
