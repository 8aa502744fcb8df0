//! Building catalogue: type tags and the per-type policy table.
//!
//! Every behavior that differs between building kinds (footprint, road
//! access rules, desirability influence, decay rates, staffing, storage,
//! tick specialization) is data in [`BuildingPolicy`], looked up with
//! [`policy`]. The overlay code never branches on a concrete kind.

use serde::{Deserialize, Serialize};

/// Concrete building kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingType {
    SmallStatue,
    MediumStatue,
    BigStatue,
    Shipyard,
    TriumphalArch,
    Dock,
    Prefecture,
    EngineerPost,
    Theater,
    Amphitheater,
    Colosseum,
    Hippodrome,
    ActorColony,
    GladiatorSchool,
    LionHouse,
    ChariotMaker,
    Warehouse,
    Granary,
    Market,
    Senate,
    Temple,
    WheatFarm,
    ClayPit,
}

impl BuildingType {
    pub const ALL: [BuildingType; 23] = [
        BuildingType::SmallStatue,
        BuildingType::MediumStatue,
        BuildingType::BigStatue,
        BuildingType::Shipyard,
        BuildingType::TriumphalArch,
        BuildingType::Dock,
        BuildingType::Prefecture,
        BuildingType::EngineerPost,
        BuildingType::Theater,
        BuildingType::Amphitheater,
        BuildingType::Colosseum,
        BuildingType::Hippodrome,
        BuildingType::ActorColony,
        BuildingType::GladiatorSchool,
        BuildingType::LionHouse,
        BuildingType::ChariotMaker,
        BuildingType::Warehouse,
        BuildingType::Granary,
        BuildingType::Market,
        BuildingType::Senate,
        BuildingType::Temple,
        BuildingType::WheatFarm,
        BuildingType::ClayPit,
    ];

    /// Class derived from the type tag.
    pub fn class(&self) -> BuildingClass {
        policy(*self).class
    }

    pub fn name(&self) -> &'static str {
        policy(*self).picture
    }
}

impl std::fmt::Display for BuildingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Broad grouping used by overlay views and advisors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingClass {
    Decoration,
    Industry,
    Food,
    Waterside,
    Security,
    Engineering,
    Entertainment,
    Training,
    Commerce,
    Administration,
    Religion,
}

/// Services a walker can deliver to a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Well,
    Fountain,
    Religion,
    Engineer,
    Prefect,
    Theater,
    Amphitheater,
    Colosseum,
    Hippodrome,
    Doctor,
    Barber,
    Baths,
    Hospital,
    School,
    Library,
    College,
    Market,
    Forum,
    Senate,
}

/// Staff a training building sends to an entertainment venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraineeType {
    Actor,
    Gladiator,
    Tamer,
    Charioteer,
}

/// Desirability a building radiates onto surrounding tiles.
///
/// Footprint tiles receive `influence`; ring `r` (1..=range) receives
/// `influence + step * (r - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Desirability {
    pub influence: i32,
    pub range: u32,
    pub step: i32,
}

impl Desirability {
    pub const NONE: Desirability = Desirability {
        influence: 0,
        range: 0,
        step: 0,
    };

    const fn new(influence: i32, range: u32, step: i32) -> Self {
        Self {
            influence,
            range,
            step,
        }
    }

    pub fn is_none(&self) -> bool {
        self.influence == 0 && self.step == 0
    }
}

/// Per-tick specialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickBehavior {
    /// Accumulate damage and fire only.
    Standard,
    /// Also cycle the animation through `frames` pictures.
    Animated { frames: u32 },
}

/// Goods storage attached to a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoragePolicy {
    pub capacity: u32,
    pub food_only: bool,
}

/// Table row describing one building kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingPolicy {
    pub class: BuildingClass,
    pub width: u32,
    pub height: u32,
    pub needs_road_access: bool,
    pub max_distance_to_road: u32,
    pub desirability: Desirability,
    pub walkable: bool,
    pub damage_increment: f32,
    pub fire_increment: f32,
    pub trainees: &'static [TraineeType],
    /// Working ceiling for every employed trainee kind (`None` = unbounded).
    pub trainee_capacity: Option<i32>,
    pub storage: Option<StoragePolicy>,
    pub tick: TickBehavior,
    pub picture: &'static str,
}

const BASE: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Industry,
    width: 1,
    height: 1,
    needs_road_access: true,
    max_distance_to_road: 1,
    desirability: Desirability::NONE,
    walkable: false,
    damage_increment: 1.0,
    fire_increment: 1.0,
    trainees: &[],
    trainee_capacity: None,
    storage: None,
    tick: TickBehavior::Standard,
    picture: "building",
};

const fn square(side: u32, base: BuildingPolicy) -> BuildingPolicy {
    BuildingPolicy {
        width: side,
        height: side,
        ..base
    }
}

const VENUE_CAPACITY: Option<i32> = Some(200);

/// Look up the policy row for a building kind.
pub fn policy(kind: BuildingType) -> &'static BuildingPolicy {
    match kind {
        BuildingType::SmallStatue => &SMALL_STATUE,
        BuildingType::MediumStatue => &MEDIUM_STATUE,
        BuildingType::BigStatue => &BIG_STATUE,
        BuildingType::Shipyard => &SHIPYARD,
        BuildingType::TriumphalArch => &TRIUMPHAL_ARCH,
        BuildingType::Dock => &DOCK,
        BuildingType::Prefecture => &PREFECTURE,
        BuildingType::EngineerPost => &ENGINEER_POST,
        BuildingType::Theater => &THEATER,
        BuildingType::Amphitheater => &AMPHITHEATER,
        BuildingType::Colosseum => &COLOSSEUM,
        BuildingType::Hippodrome => &HIPPODROME,
        BuildingType::ActorColony => &ACTOR_COLONY,
        BuildingType::GladiatorSchool => &GLADIATOR_SCHOOL,
        BuildingType::LionHouse => &LION_HOUSE,
        BuildingType::ChariotMaker => &CHARIOT_MAKER,
        BuildingType::Warehouse => &WAREHOUSE,
        BuildingType::Granary => &GRANARY,
        BuildingType::Market => &MARKET,
        BuildingType::Senate => &SENATE,
        BuildingType::Temple => &TEMPLE,
        BuildingType::WheatFarm => &WHEAT_FARM,
        BuildingType::ClayPit => &CLAY_PIT,
    }
}

// Statues never need a road and never burn or crumble.
const STATUE: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Decoration,
    needs_road_access: false,
    damage_increment: 0.0,
    fire_increment: 0.0,
    ..BASE
};

static SMALL_STATUE: BuildingPolicy = BuildingPolicy {
    desirability: Desirability::new(3, 3, -1),
    picture: "statue_small",
    ..square(1, STATUE)
};

static MEDIUM_STATUE: BuildingPolicy = BuildingPolicy {
    desirability: Desirability::new(10, 4, -2),
    picture: "statue_middle",
    ..square(2, STATUE)
};

static BIG_STATUE: BuildingPolicy = BuildingPolicy {
    desirability: Desirability::new(14, 5, -2),
    picture: "statue_big",
    ..square(3, STATUE)
};

static SHIPYARD: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Waterside,
    desirability: Desirability::new(-8, 2, 2),
    picture: "shipyard",
    ..square(2, BASE)
};

static TRIUMPHAL_ARCH: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Decoration,
    desirability: Desirability::new(18, 5, -3),
    walkable: true,
    damage_increment: 0.0,
    fire_increment: 0.0,
    picture: "triumphal_arch",
    ..square(3, BASE)
};

static DOCK: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Waterside,
    desirability: Desirability::new(-12, 2, 2),
    fire_increment: 0.0,
    tick: TickBehavior::Animated { frames: 12 },
    picture: "dock",
    ..square(3, BASE)
};

static PREFECTURE: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Security,
    desirability: Desirability::new(-2, 2, 1),
    picture: "prefecture",
    ..BASE
};

static ENGINEER_POST: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Engineering,
    picture: "engineer_post",
    ..BASE
};

static THEATER: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Entertainment,
    desirability: Desirability::new(2, 2, -1),
    trainees: &[TraineeType::Actor],
    trainee_capacity: VENUE_CAPACITY,
    picture: "theater",
    ..square(2, BASE)
};

static AMPHITHEATER: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Entertainment,
    desirability: Desirability::new(4, 3, -1),
    trainees: &[TraineeType::Actor, TraineeType::Gladiator],
    trainee_capacity: VENUE_CAPACITY,
    picture: "amphitheater",
    ..square(3, BASE)
};

static COLOSSEUM: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Entertainment,
    desirability: Desirability::new(-3, 3, 1),
    trainees: &[TraineeType::Gladiator, TraineeType::Tamer],
    trainee_capacity: VENUE_CAPACITY,
    picture: "colosseum",
    ..square(5, BASE)
};

static HIPPODROME: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Entertainment,
    width: 15,
    height: 5,
    desirability: Desirability::new(-3, 3, 1),
    trainees: &[TraineeType::Charioteer],
    trainee_capacity: VENUE_CAPACITY,
    picture: "hippodrome",
    ..BASE
};

static ACTOR_COLONY: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Training,
    desirability: Desirability::new(2, 1, -1),
    picture: "actor_colony",
    ..square(3, BASE)
};

static GLADIATOR_SCHOOL: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Training,
    desirability: Desirability::new(-3, 3, 1),
    picture: "gladiator_school",
    ..square(3, BASE)
};

static LION_HOUSE: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Training,
    desirability: Desirability::new(-3, 3, 1),
    picture: "lion_house",
    ..square(3, BASE)
};

static CHARIOT_MAKER: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Training,
    desirability: Desirability::new(-3, 3, 1),
    picture: "chariot_maker",
    ..square(3, BASE)
};

static WAREHOUSE: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Commerce,
    desirability: Desirability::new(-5, 2, 2),
    storage: Some(StoragePolicy {
        capacity: 3200,
        food_only: false,
    }),
    picture: "warehouse",
    ..square(3, BASE)
};

static GRANARY: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Food,
    desirability: Desirability::new(-4, 2, 2),
    storage: Some(StoragePolicy {
        capacity: 2400,
        food_only: true,
    }),
    picture: "granary",
    ..square(3, BASE)
};

static MARKET: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Commerce,
    desirability: Desirability::new(-2, 2, 1),
    picture: "market",
    ..square(2, BASE)
};

static SENATE: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Administration,
    desirability: Desirability::new(8, 4, -2),
    picture: "senate",
    ..square(5, BASE)
};

static TEMPLE: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Religion,
    desirability: Desirability::new(4, 2, -2),
    picture: "temple",
    ..square(2, BASE)
};

static WHEAT_FARM: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Food,
    desirability: Desirability::new(-2, 1, 1),
    max_distance_to_road: 2,
    picture: "wheat_farm",
    ..square(3, BASE)
};

static CLAY_PIT: BuildingPolicy = BuildingPolicy {
    class: BuildingClass::Industry,
    desirability: Desirability::new(-3, 2, 1),
    picture: "clay_pit",
    ..square(2, BASE)
};
