pub mod boss;
pub mod item;
pub mod loader;
pub mod loadout;
pub mod lookup;
pub mod params;
pub mod special;
pub mod validate;

pub use boss::Boss;
pub use item::{CombatStats, Item, ItemId, MagicDamage, OtherBonuses};
pub use loadout::{EquipmentProjection, Loadout, Slot};
pub use lookup::{ItemLookup, ItemResolutionError, StaticItemLookup};
pub use params::{keys, CalculationParameters, CombatStyle};
pub use special::SpecialAttack;
