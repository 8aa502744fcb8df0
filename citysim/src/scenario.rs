//! JSON scenario files: the starting map, empire and building layout.
//!
//! ```json
//! {
//!   "map": { "width": 32, "height": 32, "road_rows": [5] },
//!   "cities": [
//!     { "name": "Roma", "location": { "x": 0, "y": 0 } },
//!     { "name": "Capua", "location": { "x": 300, "y": 0 }, "sells": { "wine": 200 } }
//!   ],
//!   "routes": [["Roma", "Capua"]],
//!   "buildings": [{ "kind": "prefecture", "pos": { "i": 3, "j": 4 } }],
//!   "config": { "trade_update_interval": 10 }
//! }
//! ```

use anyhow::{bail, Context, Result};
use citysim_core::testing::{CityBuilder, EmpireBuilder};
use citysim_core::{
    BuildingType, EmpireCity, GoodStock, GoodStore, GoodType, Point, SimConfig, Simulation,
    SimpleGoodStore, TilePos, MAX_MAP_SIDE,
};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub map: MapSpec,
    #[serde(default)]
    pub cities: Vec<CitySpec>,
    /// `[begin, end]` city name pairs
    #[serde(default)]
    pub routes: Vec<[String; 2]>,
    #[serde(default)]
    pub buildings: Vec<PlacementSpec>,
    #[serde(default)]
    pub config: SimConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapSpec {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub roads: Vec<TilePos>,
    /// Rows paved end to end
    #[serde(default)]
    pub road_rows: Vec<i32>,
    #[serde(default)]
    pub blocked: Vec<TilePos>,
    #[serde(default)]
    pub water: Vec<TilePos>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CitySpec {
    pub name: String,
    #[serde(default)]
    pub location: Point,
    #[serde(default)]
    pub distant: bool,
    #[serde(default)]
    pub trade_active: bool,
    /// Goods on offer, with the quantity in stock
    #[serde(default)]
    pub sells: BTreeMap<GoodType, u32>,
    /// Goods wanted, with the quantity the city will take
    #[serde(default)]
    pub buys: BTreeMap<GoodType, u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlacementSpec {
    pub kind: BuildingType,
    pub pos: TilePos,
}

/// Read and parse a scenario file.
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    log::info!("Loading scenario from {:?}", path);
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario {}", path.display()))?;
    let scenario: Scenario = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse scenario {}", path.display()))?;
    log::info!(
        "Scenario: {}x{} map, {} cities, {} routes, {} buildings",
        scenario.map.width,
        scenario.map.height,
        scenario.cities.len(),
        scenario.routes.len(),
        scenario.buildings.len()
    );
    Ok(scenario)
}

impl CitySpec {
    fn to_city(&self) -> EmpireCity {
        let mut city = EmpireCity::new(self.name.as_str())
            .with_location(self.location)
            .with_distant(self.distant);
        if self.trade_active {
            city.open_trade();
        }
        fill_store(city.sells_mut(), &self.sells, true);
        fill_store(city.buys_mut(), &self.buys, false);
        city
    }
}

/// Sold goods are stocked; bought goods only get capacity.
fn fill_store(store: &mut SimpleGoodStore, goods: &BTreeMap<GoodType, u32>, stocked: bool) {
    for (&kind, &qty) in goods {
        store.set_capacity(kind, qty);
        if stocked {
            store.store(&mut GoodStock::of(kind, qty), None);
        }
    }
}

impl Scenario {
    /// Check cross references the JSON schema cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.map.width == 0 || self.map.height == 0 {
            bail!(
                "Map must be at least 1x1, got {}x{}",
                self.map.width,
                self.map.height
            );
        }
        if self.map.width > MAX_MAP_SIDE || self.map.height > MAX_MAP_SIDE {
            bail!(
                "Map {}x{} is too large, at most {} tiles per side",
                self.map.width,
                self.map.height,
                MAX_MAP_SIDE
            );
        }
        let names: BTreeSet<&str> = self.cities.iter().map(|c| c.name.as_str()).collect();
        if names.len() != self.cities.len() {
            bail!("Duplicate city name in scenario");
        }
        for [begin, end] in &self.routes {
            for name in [begin, end] {
                if !names.contains(name.as_str()) {
                    bail!("Route {} -> {} names unknown city '{}'", begin, end, name);
                }
            }
        }
        Ok(())
    }

    /// Construct the simulation described by this scenario.
    pub fn build(&self) -> Result<Simulation> {
        self.validate()?;

        let mut city = CityBuilder::new(self.map.width, self.map.height)
            .with_config(self.config.clone());
        for &pos in &self.map.roads {
            city = city.with_road(pos);
        }
        for &row in &self.map.road_rows {
            city = city.with_road_row(row);
        }
        for &pos in &self.map.blocked {
            city = city.with_blocked(pos);
        }
        for &pos in &self.map.water {
            city = city.with_water(pos);
        }
        let mut city = city.build();

        for placement in &self.buildings {
            city.build(placement.kind, placement.pos).with_context(|| {
                format!("Failed to place {} at {}", placement.kind, placement.pos)
            })?;
        }

        let mut empire = EmpireBuilder::new().with_config(self.config.clone());
        for entry in &self.cities {
            empire = empire.with_empire_city(entry.to_city());
        }
        for [begin, end] in &self.routes {
            empire = empire.with_route(begin, end);
        }

        Ok(Simulation::new(city, empire.build(), self.config.clone()))
    }
}
