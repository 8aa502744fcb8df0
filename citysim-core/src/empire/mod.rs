//! Empire map: cities, trade routes and the merchants travelling them.
//!
//! ```text
//! Empire
//!  ├── CityRegistry ── EmpireCity (name, location, buys/sells)
//!  └── EmpireTrading
//!        └── EmpireTradeRoute (begin, end)
//!              └── EmpireMerchant (location -> destination)
//! ```
//!
//! Cities live for the whole session, so [`CityId`] is a plain index. Routes
//! refer to their endpoints by id and never own them.

mod city;
mod merchant;
mod route;
mod trading;

pub use city::EmpireCity;
pub use merchant::{EmpireMerchant, MerchantId};
pub use route::{EmpireTradeRoute, RouteKey, RouteUpdate};
pub use trading::{EmpireTrading, MerchantArrival, TradeConfig, TradeUpdate};

use crate::config::SimConfig;
use crate::goods::SimpleGoodStore;
use crate::persist::{self, Persist, PersistError, VariantMap};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CityId(pub u32);

impl std::fmt::Display for CityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "city#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RouteId(pub u32);

impl std::fmt::Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "route#{}", self.0)
    }
}

/// Cities in registration order, with a name index.
#[derive(Debug, Clone, Default)]
pub struct CityRegistry {
    cities: Vec<EmpireCity>,
    by_name: FxHashMap<String, CityId>,
}

impl CityRegistry {
    /// Register a city. A duplicate name returns the existing id unchanged.
    pub fn add(&mut self, city: EmpireCity) -> CityId {
        if let Some(id) = self.by_name.get(city.name()) {
            log::warn!("City '{}' already registered as {}", city.name(), id);
            return *id;
        }
        let id = CityId(self.cities.len() as u32);
        self.by_name.insert(city.name().to_string(), id);
        self.cities.push(city);
        id
    }

    pub fn get(&self, id: CityId) -> Option<&EmpireCity> {
        self.cities.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: CityId) -> Option<&mut EmpireCity> {
        self.cities.get_mut(id.0 as usize)
    }

    pub fn find(&self, name: &str) -> Option<CityId> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CityId, &EmpireCity)> + '_ {
        self.cities
            .iter()
            .enumerate()
            .map(|(i, c)| (CityId(i as u32), c))
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

/// Owner of the empire map state.
#[derive(Debug, Default)]
pub struct Empire {
    cities: CityRegistry,
    trading: EmpireTrading,
}

impl Empire {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            cities: CityRegistry::default(),
            trading: EmpireTrading::new(TradeConfig::from(config)),
        }
    }

    pub fn add_city(&mut self, city: EmpireCity) -> CityId {
        self.cities.add(city)
    }

    pub fn city(&self, id: CityId) -> Option<&EmpireCity> {
        self.cities.get(id)
    }

    pub fn city_mut(&mut self, id: CityId) -> Option<&mut EmpireCity> {
        self.cities.get_mut(id)
    }

    pub fn city_by_name(&self, name: &str) -> Option<&EmpireCity> {
        let city = self.cities.find(name).and_then(|id| self.cities.get(id));
        if city.is_none() {
            log::debug!("Empire has no city named '{}'", name);
        }
        city
    }

    pub fn cities(&self) -> &CityRegistry {
        &self.cities
    }

    pub fn trading(&self) -> &EmpireTrading {
        &self.trading
    }

    pub fn trading_mut(&mut self) -> &mut EmpireTrading {
        &mut self.trading
    }

    pub fn create_route(&mut self, begin: &str, end: &str) -> Option<RouteId> {
        self.trading.create_route(begin, end, &self.cities)
    }

    pub fn send_merchant(
        &mut self,
        begin: &str,
        end: &str,
        goods: &SimpleGoodStore,
    ) -> Option<MerchantId> {
        self.trading.send_merchant(begin, end, goods, &self.cities)
    }

    #[instrument(skip_all, name = "empire")]
    pub fn update(&mut self, time: u64) -> Option<TradeUpdate> {
        self.trading.update(time, &self.cities)
    }
}

impl Persist for Empire {
    /// Cities in full; routes as `[begin, end]` name pairs. Merchants are
    /// transient and respawn on the next trade tick.
    fn save(&self, stream: &mut VariantMap) -> Result<(), PersistError> {
        let mut cities = Vec::with_capacity(self.cities.len());
        for (_, city) in self.cities.iter() {
            let mut map = VariantMap::new();
            city.save(&mut map)?;
            cities.push(Value::Object(map));
        }
        persist::put(stream, "cities", &cities)?;

        let names = |id: CityId| self.cities.get(id).map(|c| c.name().to_string());
        let routes: Vec<[String; 2]> = self
            .trading
            .routes()
            .iter()
            .filter_map(|r| Some([names(r.begin_city())?, names(r.end_city())?]))
            .collect();
        persist::put(stream, "routes", &routes)?;
        Ok(())
    }

    fn load(&mut self, stream: &VariantMap) -> Result<(), PersistError> {
        let cities: Vec<VariantMap> = persist::get(stream, "cities")?;
        let routes: Vec<[String; 2]> = persist::get_or(stream, "routes", Vec::new())?;

        self.cities = CityRegistry::default();
        self.trading.clear_routes();
        for map in &cities {
            let mut city = EmpireCity::new("");
            city.load(map)?;
            self.cities.add(city);
        }
        for [begin, end] in &routes {
            self.trading.create_route(begin, end, &self.cities);
        }
        Ok(())
    }
}
