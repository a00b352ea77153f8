use crate::color::{Color, Rgb, WeightedColor};
use crate::error::InventoryError;
use std::collections::{BTreeMap, HashMap};

/// Remaining pigment stock for one painting run.
///
/// Owned by the caller and mutated through `&mut`, so there is only ever one writer.
/// Keys are kept ordered so nearest-color ties resolve to the lowest packed value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColorInventory {
    colors: BTreeMap<Color, WeightedColor>,
}

impl ColorInventory {
    pub fn load<I>(snapshot: I) -> ColorInventory
    where
        I: IntoIterator<Item = (Color, u64)>,
    {
        let colors = snapshot
            .into_iter()
            .map(|(color, amount)| (color, WeightedColor::new(color.rgb(), 1) * amount))
            .collect();
        ColorInventory { colors }
    }

    /// Builds the inventory from a `colors/list` response, whose keys are packed
    /// colors rendered as decimal strings.
    pub fn from_wire(snapshot: &HashMap<String, u64>) -> anyhow::Result<ColorInventory> {
        let mut entries = Vec::with_capacity(snapshot.len());
        for (key, amount) in snapshot {
            let color: Color = key.parse()?;
            entries.push((color, *amount));
        }
        Ok(ColorInventory::load(entries))
    }

    /// Closest color that still has stock. Fails with `Empty` when every color has
    /// run out.
    pub fn nearest_color(&self, target: Rgb) -> Result<Color, InventoryError> {
        let mut best: Option<(Color, f64)> = None;
        for (color, stock) in &self.colors {
            if stock.amount == 0 {
                continue;
            }
            let distance = target.distance(stock.rgb);
            match best {
                Some((_, best_distance)) if best_distance <= distance => {}
                _ => best = Some((*color, distance)),
            }
        }
        best.map(|(color, _)| color).ok_or(InventoryError::Empty)
    }

    pub fn decrement(&mut self, color: Color, units: u64) -> Result<u64, InventoryError> {
        let depleted = |remaining| InventoryError::Depleted {
            color,
            requested: units,
            remaining,
        };
        let stock = self.colors.get_mut(&color).ok_or_else(|| depleted(0))?;
        let before = stock.amount;
        stock.take(units).ok_or_else(|| depleted(before))
    }

    pub fn remaining(&self, color: Color) -> Option<u64> {
        self.colors.get(&color).map(|stock| stock.amount)
    }

    pub fn total_units(&self) -> u64 {
        self.colors
            .values()
            .fold(0u64, |total, stock| total.saturating_add(stock.amount))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Color, &WeightedColor)> {
        self.colors.iter().map(|(color, stock)| (*color, stock))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn color(packed: u32) -> Color {
        Color::from_packed(packed).unwrap()
    }

    #[test]
    fn test_nearest() {
        let inventory = ColorInventory::load([
            (color(0xff0000), 5),
            (color(0x00ff00), 5),
            (color(0x0000ff), 5),
        ]);
        assert_eq!(
            inventory.nearest_color(Rgb::new(200, 30, 30)),
            Ok(color(0xff0000))
        );
        assert_eq!(
            inventory.nearest_color(Rgb::new(10, 20, 250)),
            Ok(color(0x0000ff))
        );
    }

    #[test]
    fn test_nearest_tie_prefers_lowest_key() {
        // Both candidates are exactly 10 away from the target.
        let inventory = ColorInventory::load([(color(0x14_0000), 1), (color(0x00_0000), 1)]);
        assert_eq!(
            inventory.nearest_color(Rgb::new(10, 0, 0)),
            Ok(color(0x00_0000))
        );
    }

    #[test]
    fn test_nearest_empty() {
        let inventory = ColorInventory::default();
        assert_eq!(
            inventory.nearest_color(Rgb::new(1, 2, 3)),
            Err(InventoryError::Empty)
        );
    }

    #[test]
    fn test_nearest_skips_depleted() {
        let black = color(0x000000);
        let grey = color(0x101010);
        let mut inventory = ColorInventory::load([(black, 1), (grey, 5)]);
        assert_eq!(inventory.nearest_color(Rgb::new(0, 0, 0)), Ok(black));
        inventory.decrement(black, 1).unwrap();
        assert_eq!(inventory.nearest_color(Rgb::new(0, 0, 0)), Ok(grey));

        let inventory = ColorInventory::load([(black, 0), (grey, 0)]);
        assert_eq!(
            inventory.nearest_color(Rgb::new(0, 0, 0)),
            Err(InventoryError::Empty)
        );
    }

    #[test]
    fn test_total_units_saturates() {
        let inventory = ColorInventory::load([(color(1), u64::MAX), (color(2), 1)]);
        assert_eq!(inventory.total_units(), u64::MAX);
    }

    #[test]
    fn test_decrement_exhausts() {
        let red = color(0xff0000);
        let mut inventory = ColorInventory::load([(red, 3)]);
        for expected in [2, 1, 0] {
            assert_eq!(inventory.decrement(red, 1), Ok(expected));
        }
        assert_eq!(
            inventory.decrement(red, 1),
            Err(InventoryError::Depleted {
                color: red,
                requested: 1,
                remaining: 0
            })
        );
        assert_eq!(inventory.remaining(red), Some(0));
    }

    #[test]
    fn test_decrement_too_many() {
        let red = color(0xff0000);
        let mut inventory = ColorInventory::load([(red, 2)]);
        assert!(inventory.decrement(red, 3).is_err());
        assert_eq!(inventory.remaining(red), Some(2));
    }

    #[test]
    fn test_decrement_unknown() {
        let mut inventory = ColorInventory::load([(color(1), 2)]);
        assert!(matches!(
            inventory.decrement(color(2), 1),
            Err(InventoryError::Depleted { remaining: 0, .. })
        ));
    }

    #[test]
    fn test_from_wire() {
        let mut snapshot = HashMap::new();
        snapshot.insert("16711680".to_string(), 4);
        snapshot.insert("255".to_string(), 6);
        let inventory = ColorInventory::from_wire(&snapshot).unwrap();
        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory.total_units(), 10);
        assert_eq!(inventory.remaining(color(255)), Some(6));

        snapshot.insert("not a color".to_string(), 1);
        assert!(ColorInventory::from_wire(&snapshot).is_err());
    }
}
