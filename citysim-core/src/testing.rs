use crate::city::City;
use crate::config::SimConfig;
use crate::empire::{Empire, EmpireCity};
use crate::geometry::{Point, TilePos};
use crate::grid::Tilemap;

pub struct CityBuilder {
    map: Tilemap,
    config: SimConfig,
}

impl CityBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            map: Tilemap::new(width, height),
            config: SimConfig::default(),
        }
    }

    pub fn with_road(mut self, pos: TilePos) -> Self {
        self.map.set_road(pos, true);
        self
    }

    /// Road along the whole row `j`.
    pub fn with_road_row(mut self, j: i32) -> Self {
        for i in 0..self.map.width() as i32 {
            self.map.set_road(TilePos::new(i, j), true);
        }
        self
    }

    pub fn with_blocked(mut self, pos: TilePos) -> Self {
        self.map.set_blocked(pos, true);
        self
    }

    pub fn with_water(mut self, pos: TilePos) -> Self {
        self.map.set_water(pos, true);
        self
    }

    pub fn with_config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> City {
        City::new(self.map, &self.config)
    }
}

pub struct EmpireBuilder {
    cities: Vec<EmpireCity>,
    routes: Vec<(String, String)>,
    config: SimConfig,
}

impl EmpireBuilder {
    pub fn new() -> Self {
        Self {
            cities: Vec::new(),
            routes: Vec::new(),
            config: SimConfig::default(),
        }
    }

    pub fn with_city(mut self, name: &str, x: i32, y: i32) -> Self {
        self.cities
            .push(EmpireCity::new(name).with_location(Point::new(x, y)));
        self
    }

    pub fn with_empire_city(mut self, city: EmpireCity) -> Self {
        self.cities.push(city);
        self
    }

    pub fn with_route(mut self, begin: &str, end: &str) -> Self {
        self.routes.push((begin.to_string(), end.to_string()));
        self
    }

    pub fn with_config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Empire {
        let mut empire = Empire::new(&self.config);
        for city in self.cities {
            empire.add_city(city);
        }
        for (begin, end) in &self.routes {
            empire.create_route(begin, end);
        }
        empire
    }
}

impl Default for EmpireBuilder {
    fn default() -> Self {
        Self::new()
    }
}
