//! Records of the newer dialect, keyed by form id.

mod alchemy;
mod ammunition;
mod apparatus;
mod book;
mod camera_shot;
mod faction;
mod flora;
mod game_setting;
mod global;
mod header;
mod ingredient;
mod key;
mod magic_effect;
mod misc;
mod scroll;
mod soul_gem;
mod spell;
mod weapon;

pub use alchemy::{AlchemyPotion, PotionData};
pub use ammunition::{Ammunition, AmmunitionData};
pub use apparatus::Apparatus;
pub use book::{Book, BookData};
pub use camera_shot::{CameraShot, CameraShotData};
pub use faction::{CrimeGold, Faction, FactionRank, Relation, VendorValues};
pub use flora::Flora;
pub use game_setting::{GameSetting, SettingValue};
pub use global::Global;
pub use header::Tes4FileHeader;
pub use ingredient::Ingredient;
pub use key::Key;
pub use magic_effect::{MagicEffect, MagicEffectData, SoundPair};
pub use misc::MiscObject;
pub use scroll::Scroll;
pub use soul_gem::{SoulGem, SoulSize};
pub use spell::{Spell, SpellData};
pub use weapon::{Weapon, WeaponData};

use crate::record::{Record, RecordKind, Tes4Header};

/// The form id of a record, unless it is zero
pub(crate) fn form_key<T>(record: &Record<T>) -> Option<u32>
where
    T: RecordKind<Header = Tes4Header>,
{
    Some(record.header.form_id).filter(|&x| x != 0)
}
