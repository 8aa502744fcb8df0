use crate::geometry::Point;
use crate::goods::SimpleGoodStore;
use crate::persist::{self, Persist, PersistError, VariantMap};

/// A settlement on the empire map.
///
/// Created once at empire setup and never destroyed during a session.
#[derive(Debug, Clone, PartialEq)]
pub struct EmpireCity {
    name: String,
    location: Point,
    distant: bool,
    trade_active: bool,
    sells: SimpleGoodStore,
    buys: SimpleGoodStore,
}

impl EmpireCity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: Point::default(),
            distant: false,
            trade_active: false,
            sells: SimpleGoodStore::new(),
            buys: SimpleGoodStore::new(),
        }
    }

    pub fn with_location(mut self, location: Point) -> Self {
        self.location = location;
        self
    }

    pub fn with_distant(mut self, distant: bool) -> Self {
        self.distant = distant;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> Point {
        self.location
    }

    pub fn set_location(&mut self, location: Point) {
        self.location = location;
    }

    pub fn is_distant(&self) -> bool {
        self.distant
    }

    pub fn is_trade_active(&self) -> bool {
        self.trade_active
    }

    pub fn open_trade(&mut self) {
        self.trade_active = true;
    }

    pub fn sells(&self) -> &SimpleGoodStore {
        &self.sells
    }

    pub fn sells_mut(&mut self) -> &mut SimpleGoodStore {
        &mut self.sells
    }

    pub fn buys(&self) -> &SimpleGoodStore {
        &self.buys
    }

    pub fn buys_mut(&mut self) -> &mut SimpleGoodStore {
        &mut self.buys
    }
}

impl Persist for EmpireCity {
    fn save(&self, stream: &mut VariantMap) -> Result<(), PersistError> {
        persist::put(stream, "name", &self.name)?;
        persist::put(stream, "location", &self.location)?;
        persist::put(stream, "distant", &self.distant)?;
        persist::put(stream, "available", &self.trade_active)?;
        persist::put(stream, "sells", &self.sells)?;
        persist::put(stream, "buys", &self.buys)?;
        Ok(())
    }

    fn load(&mut self, stream: &VariantMap) -> Result<(), PersistError> {
        self.name = persist::get(stream, "name")?;
        self.location = persist::get(stream, "location")?;
        self.distant = persist::get_or(stream, "distant", false)?;
        self.trade_active = persist::get_or(stream, "available", false)?;
        self.sells = persist::get_or(stream, "sells", SimpleGoodStore::new())?;
        self.buys = persist::get_or(stream, "buys", SimpleGoodStore::new())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goods::{GoodStock, GoodStore, GoodType};

    #[test]
    fn test_open_trade() {
        let mut city = EmpireCity::new("Capua");
        assert!(!city.is_trade_active());
        city.open_trade();
        assert!(city.is_trade_active());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut city = EmpireCity::new("Tarentum")
            .with_location(Point::new(420, 310))
            .with_distant(true);
        city.open_trade();
        city.sells_mut().set_capacity(GoodType::Wine, 25);
        city.sells_mut()
            .store(&mut GoodStock::of(GoodType::Wine, 15), None);
        city.buys_mut().set_capacity(GoodType::Pottery, 40);

        let mut stream = VariantMap::new();
        city.save(&mut stream).unwrap();

        let mut restored = EmpireCity::new("");
        restored.load(&stream).unwrap();
        assert_eq!(restored, city);
        assert_eq!(restored.sells().quantity(GoodType::Wine), 15);
    }

    #[test]
    fn test_load_requires_name() {
        let mut stream = VariantMap::new();
        persist::put(&mut stream, "location", &Point::new(1, 2)).unwrap();
        let mut city = EmpireCity::new("x");
        assert!(matches!(
            city.load(&stream),
            Err(PersistError::MissingField("name"))
        ));
    }
}
