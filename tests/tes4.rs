use std::collections::HashMap;
use tesfile::{
    record::{DecodeOptions, GroupHeader, Record, Tes4Header},
    records::tes4::{
        Apparatus, GameSetting, Global, Key, MiscObject, SettingValue, SoulGem, SoulSize,
        Tes4FileHeader,
    },
    records::tes3::GlobalKind,
    registry::Tes4Registries,
    scanner::{ScanOptions, Tes4Scanner},
    Dialect, ErrorKind, LocalizedString, SubRecordReader, SubRecordWriter, Tag,
};

fn file_header(flags: u32) -> Vec<u8> {
    let mut header = Tes4Header::new(Tag::TES4, 0);
    header.flags = flags;
    let payload = Tes4FileHeader {
        version: 1.7,
        author: String::from("mcarofano"),
        internal_version: 0x0001_26C5,
        ..Tes4FileHeader::default()
    };

    let mut out = Vec::new();
    Record::new(header, payload).write_to(&mut out).unwrap();
    out
}

fn misc(form_id: u32, flags: u32, name: LocalizedString) -> Record<MiscObject> {
    let mut header = Tes4Header::new(Tag::MISC, form_id);
    header.flags = flags;
    Record::new(
        header,
        MiscObject {
            editor_id: format!("Misc{:08X}", form_id),
            name,
            model_path: Some(String::from("Clutter\\Coin01.nif")),
            value: 1,
            weight: 0.5,
            ..MiscObject::default()
        },
    )
}

fn group(label: Tag, content: &[u8]) -> Vec<u8> {
    let header = GroupHeader {
        size: (GroupHeader::LEN + content.len()) as u32,
        label: label.0,
        group_type: 0,
        stamp: 0,
        unknown1: 0,
        version: 0,
        unknown2: 0,
    };

    let mut out = Vec::new();
    header
        .write(&mut SubRecordWriter::new(&mut out, Dialect::Tes4))
        .unwrap();
    out.extend_from_slice(content);
    out
}

fn to_bytes(record: &Record<MiscObject>) -> Vec<u8> {
    let mut out = Vec::new();
    record.write_to(&mut out).unwrap();
    out
}

#[test]
fn localized_names_resolve_through_a_string_table() {
    let mut content = to_bytes(&misc(0x0F, 0, LocalizedString::Index(0x0100_D502)));
    content.extend(to_bytes(&misc(0x10, 0, LocalizedString::Index(0))));
    let mut data = file_header(Tes4FileHeader::FLAG_LOCALIZED);
    data.extend(group(Tag::MISC, &content));

    let mut registries = Tes4Registries::new();
    Tes4Scanner::new(&data).scan(&mut registries).unwrap();

    let mut table: HashMap<u32, String> = HashMap::new();
    table.insert(0x0100_D502, String::from("Gold"));

    let gold = registries.misc.get(&0x0F).unwrap().payload.as_ref().unwrap();
    assert_eq!(gold.name.resolve(&table), Some("Gold"));

    let blank = registries.misc.get(&0x10).unwrap().payload.as_ref().unwrap();
    assert_eq!(blank.name.resolve(&table), Some(""));
}

#[test]
fn inline_names_without_localization() {
    let record = misc(0x0F, 0, LocalizedString::Inline(String::from("Gold")));
    let mut data = file_header(0);
    data.extend(group(Tag::MISC, &to_bytes(&record)));

    let mut registries = Tes4Registries::new();
    let mut scanner = Tes4Scanner::new(&data);
    scanner.scan(&mut registries).unwrap();
    assert!(!scanner.is_localized());

    let gold = registries.misc.get(&0x0F).unwrap();
    assert_eq!(gold.payload, record.payload);
}

#[test]
fn localization_can_be_forced() {
    let record = misc(0x0F, 0, LocalizedString::Index(0x0100_D502));
    let mut data = file_header(0);
    data.extend(group(Tag::MISC, &to_bytes(&record)));

    let options = ScanOptions::new().localized(true);
    let mut registries = Tes4Registries::new();
    Tes4Scanner::with_options(&data, options)
        .scan(&mut registries)
        .unwrap();
    let gold = registries.misc.get(&0x0F).unwrap().payload.as_ref().unwrap();
    assert_eq!(gold.name.as_index(), Some(0x0100_D502));
}

#[test]
fn compressed_records_inflate_and_deflate() {
    let record = misc(
        0x0F,
        Tes4Header::FLAG_COMPRESSED,
        LocalizedString::Inline(String::from("Gold")),
    );
    let bytes = to_bytes(&record);

    let mut reader = SubRecordReader::new(&bytes, Dialect::Tes4);
    let decoded: Record<MiscObject> = Record::decode(&mut reader, &DecodeOptions::new()).unwrap();
    assert!(reader.is_empty());
    assert_eq!(decoded.payload, record.payload);
    assert_eq!(to_bytes(&decoded), bytes);
}

#[test]
fn corrupt_compressed_records_are_rejected() {
    let record = misc(
        0x0F,
        Tes4Header::FLAG_COMPRESSED,
        LocalizedString::Inline(String::from("Gold")),
    );
    let mut bytes = to_bytes(&record);

    // overstate the inflated size
    bytes[24] = bytes[24].wrapping_add(1);
    let mut reader = SubRecordReader::new(&bytes, Dialect::Tes4);
    let err = Record::<MiscObject>::decode(&mut reader, &DecodeOptions::new()).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::Compression { tag: Tag::MISC, .. }
    ));
}

#[test]
fn deleted_records_keep_their_slot() {
    let mut header = Tes4Header::new(Tag::MISC, 0x0F);
    header.flags = Tes4Header::FLAG_DELETED;
    let deleted = Record::<MiscObject>::deleted(header);

    let mut content = to_bytes(&misc(0x0F, 0, LocalizedString::Index(1)));
    content.extend(to_bytes(&deleted));
    let mut data = file_header(Tes4FileHeader::FLAG_LOCALIZED);
    data.extend(group(Tag::MISC, &content));

    let mut registries = Tes4Registries::new();
    let summary = Tes4Scanner::new(&data).scan(&mut registries).unwrap();
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.updated, 1);
    assert!(registries.misc.get(&0x0F).unwrap().is_deleted());
}

#[test]
fn registries_write_back_what_they_read() {
    let mut content = Vec::new();
    for form_id in 0x20..0x28 {
        content.extend(to_bytes(&misc(form_id, 0, LocalizedString::Index(form_id))));
    }
    let apparatus = Record::new(
        Tes4Header::new(Tag::APPA, 0x30),
        Apparatus {
            editor_id: String::from("AlembicApprentice"),
            name: LocalizedString::Index(0x30),
            quality: 1,
            value: 20,
            weight: 1.0,
            ..Apparatus::default()
        },
    );
    let mut apparatus_bytes = Vec::new();
    apparatus.write_to(&mut apparatus_bytes).unwrap();

    let mut data = file_header(Tes4FileHeader::FLAG_LOCALIZED);
    data.extend(group(Tag::APPA, &apparatus_bytes));
    data.extend(group(Tag::MISC, &content));

    let mut registries = Tes4Registries::new();
    let summary = Tes4Scanner::new(&data).scan(&mut registries).unwrap();
    assert_eq!(summary.inserted, 9);
    assert_eq!(summary.groups, 2);
    assert_eq!(registries.total(), 9);

    let mut misc_out = Vec::new();
    let written = registries.misc.save_all_to_stream(&mut misc_out).unwrap();
    assert_eq!(written, 8);
    assert_eq!(misc_out, content);

    let mut apparatus_out = Vec::new();
    registries.apparatus.save_all_to_stream(&mut apparatus_out).unwrap();
    assert_eq!(apparatus_out, apparatus_bytes);
}

#[test]
fn unregistered_groups_are_skipped_whole() {
    // garbage inside a skipped group is never looked at
    let mut data = file_header(0);
    data.extend(group(Tag::new(b"STAT"), b"not a record at all"));
    data.extend(group(
        Tag::MISC,
        &to_bytes(&misc(0x0F, 0, LocalizedString::Inline(String::from("Gold")))),
    ));

    let mut registries = Tes4Registries::new();
    let summary = Tes4Scanner::new(&data).scan(&mut registries).unwrap();
    assert_eq!(summary.groups, 2);
    assert_eq!(summary.skipped_groups, 1);
    assert_eq!(summary.inserted, 1);
}

#[test]
fn undersized_group_is_malformed() {
    let mut data = file_header(0);
    data.extend_from_slice(b"GRUP\x10\0\0\0MISC\0\0\0\0\0\0\0\0\0\0\0\0");
    let err = Tes4Scanner::new(&data)
        .scan(&mut Tes4Registries::new())
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::MalformedHeader { tag: Tag::GRUP, .. }
    ));
}

#[test]
fn group_larger_than_the_file_is_truncated() {
    let mut data = file_header(0);
    data.extend(group(
        Tag::MISC,
        &to_bytes(&misc(0x0F, 0, LocalizedString::Inline(String::from("Gold")))),
    ));
    data.truncate(data.len() - 1);
    let err = Tes4Scanner::new(&data)
        .scan(&mut Tes4Registries::new())
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Truncated { .. }));
}

#[test]
fn wrong_magic() {
    let data = b"TES3\0\0\0\0\0\0\0\0\0\0\0\0";
    let err = Tes4Scanner::new(&data[..])
        .scan(&mut Tes4Registries::new())
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::MalformedHeader { tag: Tag::TES3, offset: 0, .. }
    ));
}

#[cfg(feature = "serde")]
#[test]
fn records_serialize_to_json() {
    let record = misc(0x0F, 0, LocalizedString::Index(0x0100_D502));
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["header"]["tag"], "MISC");
    assert_eq!(json["header"]["form_id"], 0x0F);
    assert_eq!(json["payload"]["editor_id"], "Misc0000000F");
}

fn encoded<T: tesfile::record::RecordKind<Header = Tes4Header>>(
    tag: Tag,
    form_id: u32,
    payload: T,
) -> Vec<u8> {
    let mut out = Vec::new();
    Record::new(Tes4Header::new(tag, form_id), payload)
        .write_to(&mut out)
        .unwrap();
    out
}

#[test]
fn every_registered_type_scans_and_saves() {
    let setting = encoded(
        Tag::GMST,
        0x100,
        GameSetting {
            editor_id: String::from("fJumpHeightMin"),
            value: SettingValue::Float(76.0),
        },
    );
    let global = encoded(
        Tag::GLOB,
        0x101,
        Global {
            editor_id: String::from("GameHour"),
            kind: GlobalKind::Float,
            value: 8.0,
        },
    );
    let key = encoded(
        Tag::KEYM,
        0x102,
        Key {
            editor_id: String::from("CellarKey"),
            name: LocalizedString::Inline(String::from("Cellar Key")),
            ..Key::default()
        },
    );
    let gem = encoded(
        Tag::SLGM,
        0x103,
        SoulGem {
            editor_id: String::from("SoulGemGrand"),
            model_path: String::from("Clutter\\SoulGemGrand.nif"),
            capacity: SoulSize::Grand,
            ..SoulGem::default()
        },
    );

    // group order differs from registry order
    let mut data = file_header(0);
    data.extend(group(Tag::SLGM, &gem));
    data.extend(group(Tag::KEYM, &key));
    data.extend(group(Tag::GLOB, &global));
    data.extend(group(Tag::GMST, &setting));

    let mut registries = Tes4Registries::new();
    let summary = Tes4Scanner::new(&data).scan(&mut registries).unwrap();
    assert_eq!(summary.inserted, 4);
    assert_eq!(summary.skipped_groups, 0);
    assert_eq!(registries.total(), 4);
    assert!(registries.soul_gems.contains(&0x103));

    let mut out = Vec::new();
    assert_eq!(registries.save_all_to_stream(&mut out).unwrap(), 4);
    assert_eq!(out, [setting, global, key, gem].concat());
}
