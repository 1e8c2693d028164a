//! Keyed, insertion ordered stores of decoded records.
//!
//! A [`Registry`] holds the latest version of every record of one type, keyed
//! by [`RecordKind::key`]. Registries belong to the caller; a scan borrows a
//! set of them mutably.
//!
//! ```
//! use tesfile::{record::{Record, Tes3Header}, registry::{Registry, Upsert}};
//! use tesfile::records::tes3::{GameSetting, GameSettingValue};
//! use tesfile::Tag;
//!
//! let setting = |x: i32| Record::new(Tes3Header::new(Tag::GMST), GameSetting {
//!     name: String::from("iMaxLevel"),
//!     value: Some(GameSettingValue::Int(x)),
//! });
//!
//! let mut registry = Registry::new();
//! assert_eq!(registry.upsert(setting(100))?, Upsert::Inserted);
//! assert_eq!(registry.upsert(setting(100))?, Upsert::Unchanged);
//! assert_eq!(registry.upsert(setting(50))?, Upsert::Updated);
//! assert_eq!(registry.count(), 1);
//! # Ok::<(), tesfile::Error>(())
//! ```

use crate::{
    errors::{Error, ErrorKind},
    record::{decode_record, DecodeOptions, Record, RecordHeader, RecordKind},
    records::{tes3, tes4},
    subrecord::{SubRecordReader, SubRecordWriter},
    Tag,
};
use indexmap::{map::Entry, IndexMap};
use std::{fmt, io::Write};

/// The outcome of storing a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// No record with the key existed
    Inserted,

    /// A different record with the key was replaced
    Updated,

    /// An equal record with the key was already stored
    Unchanged,
}

impl Upsert {
    /// Number of records this upsert changed: zero or one
    pub fn changed(self) -> usize {
        match self {
            Upsert::Unchanged => 0,
            Upsert::Inserted | Upsert::Updated => 1,
        }
    }
}

/// Records of one type keyed by their identifier
#[derive(Debug, Clone, Default)]
pub struct Registry<T: RecordKind> {
    entries: IndexMap<T::Key, Record<T>>,
}

impl<T: RecordKind> Registry<T> {
    pub fn new() -> Self {
        Registry {
            entries: IndexMap::new(),
        }
    }

    /// Store a record under its key
    ///
    /// Equality ignores the size stored in the header, since that is
    /// recomputed on every encode.
    pub fn upsert(&mut self, record: Record<T>) -> Result<Upsert, Error> {
        let key = record.key().ok_or_else(|| {
            Error::new(ErrorKind::EmptyIdentifier {
                record: T::SCHEMA.record,
            })
        })?;

        let result = match self.entries.entry(key) {
            Entry::Occupied(mut entry) => {
                if same_record(entry.get(), &record) {
                    Upsert::Unchanged
                } else {
                    entry.insert(record);
                    Upsert::Updated
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(record);
                Upsert::Inserted
            }
        };

        tracing::trace!(record = %T::SCHEMA.record, ?result, "upsert");
        Ok(result)
    }

    /// Decode the next record from the reader and store it, returning how
    /// many records changed
    ///
    /// A record that fails to decode leaves the registry untouched.
    pub fn decode_and_upsert(
        &mut self,
        reader: &mut SubRecordReader,
        options: &DecodeOptions,
    ) -> Result<usize, Error> {
        self.decode_and_upsert_status(reader, options)
            .map(Upsert::changed)
    }

    /// Like [`Registry::decode_and_upsert`] but reports the exact outcome
    pub fn decode_and_upsert_status(
        &mut self,
        reader: &mut SubRecordReader,
        options: &DecodeOptions,
    ) -> Result<Upsert, Error> {
        let record = decode_record::<T>(reader, options)?;
        self.upsert(record)
    }

    pub fn get(&self, key: &T::Key) -> Option<&Record<T>> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &T::Key) -> Option<&mut Record<T>> {
        self.entries.get_mut(key)
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.entries.contains_key(key)
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&T::Key, &Record<T>)> {
        self.entries.iter()
    }

    pub fn records(&self) -> impl Iterator<Item = &Record<T>> {
        self.entries.values()
    }

    /// Remove a record, keeping the order of the rest
    pub fn remove(&mut self, key: &T::Key) -> Option<Record<T>> {
        self.entries.shift_remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Encode every record in iteration order, returning how many were
    /// written. Stops at the first error.
    pub fn save_all_to_stream<W: Write>(&self, writer: W) -> Result<usize, Error> {
        let mut writer = SubRecordWriter::new(writer, T::Header::DIALECT);
        for record in self.entries.values() {
            record.encode(&mut writer)?;
        }

        tracing::debug!(
            record = %T::SCHEMA.record,
            count = self.entries.len(),
            bytes = writer.position(),
            "saved registry"
        );
        Ok(self.entries.len())
    }
}

/// Payloads are compared by their encoding so that floats compare bitwise: a
/// `NaN` equals itself and `-0.0` differs from `0.0`.
fn same_record<T: RecordKind>(stored: &Record<T>, incoming: &Record<T>) -> bool {
    let same_payload = match (&stored.payload, &incoming.payload) {
        (Some(a), Some(b)) => match (canonical(a), canonical(b)) {
            (Ok(x), Ok(y)) => x == y,
            _ => a == b,
        },
        (None, None) => true,
        _ => false,
    };

    if !same_payload {
        return false;
    }

    let mut header = incoming.header.clone();
    header.set_size(stored.header.size());
    header == stored.header
}

fn canonical<T: RecordKind>(payload: &T) -> Result<Vec<u8>, Error> {
    let mut writer = SubRecordWriter::new(Vec::new(), T::Header::DIALECT);
    payload.encode_fields(&mut writer)?;
    Ok(writer.into_inner())
}

impl<'a, T: RecordKind> IntoIterator for &'a Registry<T> {
    type Item = (&'a T::Key, &'a Record<T>);
    type IntoIter = indexmap::map::Iter<'a, T::Key, Record<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Decodes the record at a reader into one registry of a set
pub type DecodeFn<R> =
    fn(&mut R, &mut SubRecordReader, &DecodeOptions) -> Result<Upsert, Error>;

/// The registry of a set that takes records of one tag
pub struct Route<R: 'static> {
    pub tag: Tag,
    pub decode: DecodeFn<R>,
}

impl<R: 'static> fmt::Debug for Route<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route").field("tag", &self.tag).finish()
    }
}

/// A group of registries that a scan fills, with a static table routing each
/// record tag to its registry
pub trait RegistrySet: Sized + 'static {
    /// One route per registry, tagged with its record type's
    /// [`Schema::record`](crate::schema::Schema)
    const ROUTES: &'static [Route<Self>];

    fn route(tag: Tag) -> Option<&'static Route<Self>> {
        Self::ROUTES.iter().find(|x| x.tag == tag)
    }

    /// Whether some registry in the set takes records of this tag
    fn accepts(tag: Tag) -> bool {
        Self::route(tag).is_some()
    }
}

macro_rules! registry_set {
    ($(#[$meta:meta])* $name:ident { $($field:ident: $kind:ty,)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            $(pub $field: Registry<$kind>,)*
        }

        impl $name {
            pub fn new() -> Self {
                $name::default()
            }

            pub fn clear_all(&mut self) {
                $(self.$field.clear();)*
            }

            /// Number of records across every registry
            pub fn total(&self) -> usize {
                0 $(+ self.$field.count())*
            }

            /// Encode every registry in declaration order, returning how
            /// many records were written
            pub fn save_all_to_stream<W: Write>(&self, mut writer: W) -> Result<usize, Error> {
                let mut count = 0;
                $(count += self.$field.save_all_to_stream(&mut writer)?;)*
                Ok(count)
            }
        }

        impl RegistrySet for $name {
            const ROUTES: &'static [Route<Self>] = &[$(
                Route {
                    tag: <$kind as RecordKind>::SCHEMA.record,
                    decode: {
                        fn decode(
                            set: &mut $name,
                            reader: &mut SubRecordReader,
                            options: &DecodeOptions,
                        ) -> Result<Upsert, Error> {
                            set.$field.decode_and_upsert_status(reader, options)
                        }
                        decode
                    },
                },
            )*];
        }
    };
}

registry_set! {
    /// Every registry a newer dialect scan fills
    Tes4Registries {
        alchemy: tes4::AlchemyPotion,
        ammunition: tes4::Ammunition,
        apparatus: tes4::Apparatus,
        books: tes4::Book,
        camera_shots: tes4::CameraShot,
        factions: tes4::Faction,
        flora: tes4::Flora,
        game_settings: tes4::GameSetting,
        globals: tes4::Global,
        ingredients: tes4::Ingredient,
        keys: tes4::Key,
        magic_effects: tes4::MagicEffect,
        misc: tes4::MiscObject,
        scrolls: tes4::Scroll,
        soul_gems: tes4::SoulGem,
        spells: tes4::Spell,
        weapons: tes4::Weapon,
    }
}

registry_set! {
    /// Every registry a legacy dialect scan fills
    Tes3Registries {
        game_settings: tes3::GameSetting,
        globals: tes3::Tes3Global,
        magic_effects: tes3::Tes3MagicEffect,
        spells: tes3::Tes3Spell,
        enchantments: tes3::Tes3Enchantment,
        apparatus: tes3::Tes3Apparatus,
        misc: tes3::Tes3MiscItem,
        ingredients: tes3::Tes3Ingredient,
        probes: tes3::Tes3Probe,
        repair_items: tes3::Tes3RepairItem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        record::{Tes3Header, Tes4Header},
        records::tes3::{GameSetting, GameSettingValue},
        records::tes4::Apparatus,
        Dialect, Tag,
    };

    fn setting(name: &str, value: i32) -> Record<GameSetting> {
        Record::new(
            Tes3Header::new(Tag::GMST),
            GameSetting {
                name: String::from(name),
                value: Some(GameSettingValue::Int(value)),
            },
        )
    }

    #[test]
    fn test_upsert_outcomes() {
        let mut registry = Registry::new();
        assert_eq!(registry.upsert(setting("iA", 1)).unwrap(), Upsert::Inserted);
        assert_eq!(registry.upsert(setting("iB", 2)).unwrap(), Upsert::Inserted);
        assert_eq!(registry.upsert(setting("iA", 1)).unwrap(), Upsert::Unchanged);
        assert_eq!(registry.upsert(setting("iA", 3)).unwrap(), Upsert::Updated);
        assert_eq!(registry.count(), 2);

        let value = &registry.get(&String::from("iA")).unwrap().payload;
        assert_eq!(value.as_ref().unwrap().value, Some(GameSettingValue::Int(3)));

        let keys: Vec<&str> = registry.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["iA", "iB"]);
    }

    #[test]
    fn test_header_size_is_not_compared() {
        let mut registry = Registry::new();
        let mut record = setting("iA", 1);
        registry.upsert(record.clone()).unwrap();
        record.header.size = 17;
        assert_eq!(registry.upsert(record).unwrap(), Upsert::Unchanged);
    }

    fn float_setting(value: f32) -> Record<GameSetting> {
        Record::new(
            Tes3Header::new(Tag::GMST),
            GameSetting {
                name: String::from("fX"),
                value: Some(GameSettingValue::Float(value)),
            },
        )
    }

    #[test]
    fn test_floats_compare_bitwise() {
        let mut registry = Registry::new();
        assert_eq!(registry.upsert(float_setting(f32::NAN)).unwrap(), Upsert::Inserted);
        assert_eq!(registry.upsert(float_setting(f32::NAN)).unwrap(), Upsert::Unchanged);
        assert_eq!(registry.upsert(float_setting(0.0)).unwrap(), Upsert::Updated);
        assert_eq!(registry.upsert(float_setting(-0.0)).unwrap(), Upsert::Updated);
        assert_eq!(registry.upsert(float_setting(-0.0)).unwrap(), Upsert::Unchanged);
    }

    #[test]
    fn test_empty_identifier() {
        let mut registry = Registry::new();
        let err = registry.upsert(setting("", 1)).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::EmptyIdentifier { record: Tag::GMST }
        ));

        let mut forms = Registry::<Apparatus>::new();
        let record = Record::new(Tes4Header::new(Tag::APPA, 0), Apparatus::default());
        assert!(forms.upsert(record).is_err());
        assert!(forms.is_empty());
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut registry = Registry::new();
        for (i, name) in ["iA", "iB", "iC"].iter().enumerate() {
            registry.upsert(setting(name, i as i32)).unwrap();
        }

        assert!(registry.remove(&String::from("iB")).is_some());
        assert!(!registry.contains(&String::from("iB")));
        let keys: Vec<&str> = registry.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["iA", "iC"]);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_decode_and_upsert() {
        let data = b"GMST\x1D\0\0\0\0\0\0\0\0\0\0\0NAME\x09\0\0\0iMaxLevelINTV\x04\0\0\0\x64\0\0\0";
        let mut registry = Registry::<GameSetting>::new();
        let options = DecodeOptions::new();

        let mut reader = SubRecordReader::new(&data[..], Dialect::Tes3);
        assert_eq!(registry.decode_and_upsert(&mut reader, &options).unwrap(), 1);
        let mut reader = SubRecordReader::new(&data[..], Dialect::Tes3);
        assert_eq!(registry.decode_and_upsert(&mut reader, &options).unwrap(), 0);

        let mut reader = SubRecordReader::new(&data[..20], Dialect::Tes3);
        assert!(registry.decode_and_upsert(&mut reader, &options).is_err());
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_save_all_to_stream() {
        let mut registry = Registry::new();
        registry.upsert(setting("iA", 1)).unwrap();
        registry.upsert(setting("iB", 2)).unwrap();

        let mut out = Vec::new();
        assert_eq!(registry.save_all_to_stream(&mut out).unwrap(), 2);
        assert_eq!(out.len(), 2 * (16 + 10 + 12));

        let mut copy = Registry::<GameSetting>::new();
        let mut reader = SubRecordReader::new(&out, Dialect::Tes3);
        while !reader.is_empty() {
            copy.decode_and_upsert(&mut reader, &DecodeOptions::new())
                .unwrap();
        }
        assert_eq!(copy.count(), 2);
        assert!(copy.iter().zip(registry.iter()).all(|(a, b)| a.0 == b.0));
    }

    #[test]
    fn test_registry_sets() {
        let mut registries = Tes3Registries::new();
        registries.game_settings.upsert(setting("iA", 1)).unwrap();
        registries.game_settings.upsert(setting("iB", 2)).unwrap();
        assert_eq!(registries.total(), 2);

        let mut out = Vec::new();
        assert_eq!(registries.save_all_to_stream(&mut out).unwrap(), 2);
        assert_eq!(out.len(), 2 * (16 + 10 + 12));

        registries.clear_all();
        assert_eq!(registries.total(), 0);
        assert_eq!(Tes4Registries::new().total(), 0);
    }

    fn unique_tags<R: RegistrySet>() -> bool {
        let mut tags: Vec<Tag> = R::ROUTES.iter().map(|x| x.tag).collect();
        tags.sort();
        tags.dedup();
        tags.len() == R::ROUTES.len()
    }

    #[test]
    fn test_route_tags_are_unique() {
        assert!(unique_tags::<Tes3Registries>());
        assert!(unique_tags::<Tes4Registries>());
        assert_eq!(Tes3Registries::ROUTES.len(), 10);
        assert_eq!(Tes4Registries::ROUTES.len(), 17);
    }

    #[test]
    fn test_routes_follow_record_tags() {
        assert!(Tes3Registries::accepts(Tag::PROB));
        assert!(!Tes3Registries::accepts(Tag::KEYM));
        assert!(Tes4Registries::accepts(Tag::KEYM));
        assert!(!Tes4Registries::accepts(Tag::new(b"STAT")));
        assert!(!Tes4Registries::accepts(Tag::TES4));
    }

    #[test]
    fn test_route_decodes_into_its_registry() {
        let data = b"GMST\x1D\0\0\0\0\0\0\0\0\0\0\0NAME\x09\0\0\0iMaxLevelINTV\x04\0\0\0\x64\0\0\0";
        let mut registries = Tes3Registries::new();
        let route = Tes3Registries::route(Tag::GMST).unwrap();

        let mut reader = SubRecordReader::new(&data[..], Dialect::Tes3);
        let result = (route.decode)(&mut registries, &mut reader, &DecodeOptions::new());
        assert_eq!(result.unwrap(), Upsert::Inserted);
        assert_eq!(registries.game_settings.count(), 1);
        assert_eq!(registries.total(), 1);

        let key = Record::new(
            Tes4Header::new(Tag::KEYM, 0x10),
            tes4::Key {
                editor_id: String::from("Key"),
                name: crate::LocalizedString::Index(1),
                ..tes4::Key::default()
            },
        );
        let mut data = Vec::new();
        key.write_to(&mut data).unwrap();

        let mut registries = Tes4Registries::new();
        let route = Tes4Registries::route(Tag::KEYM).unwrap();
        let mut reader = SubRecordReader::new(&data, Dialect::Tes4);
        let options = DecodeOptions::new().localized(true);
        assert!((route.decode)(&mut registries, &mut reader, &options).is_ok());
        assert!(registries.keys.contains(&0x10));
        assert_eq!(registries.total(), 1);
    }
}
