use crate::helpers::*;
use chrono::{Duration, Utc};
use keepcore::{Database, DeletedObject, Entry, EntryData, Error, Group, GroupData, Uuid};

#[test]
fn test_new_database_is_empty() {
    let db = Database::new();
    assert!(db.root_group().is_none());
    assert!(db.deleted_objects().is_empty());
    assert!(db.transformed_master_key().is_none());
    assert!(db.resolve_group(&Uuid::new_v4()).is_none());
    assert!(db.resolve_entry(&Uuid::new_v4()).is_none());
}

#[test]
fn test_resolve_finds_every_inserted_node() {
    let (mut db, root_id) = setup_database();

    let mut groups = vec![root_id];
    let mut entries = Vec::new();
    for i in 0..5 {
        let parent = groups[i / 2];
        let group = add_group(&mut db, &parent, &format!("group_{i}"));
        groups.push(group);
        entries.push(add_entry(&mut db, &group, &format!("entry_{i}")));
    }

    for (i, uuid) in groups.iter().enumerate().skip(1) {
        let group = db.resolve_group(uuid).expect("group should resolve");
        assert_eq!(group.uuid(), *uuid);
        assert_eq!(group.data().name, format!("group_{}", i - 1));
        assert!(db.resolve_entry(uuid).is_none(), "groups are not entries");
    }
    for (i, uuid) in entries.iter().enumerate() {
        let entry = db.resolve_entry(uuid).expect("entry should resolve");
        assert_eq!(entry.data().title, format!("entry_{i}"));
        assert!(db.resolve_group(uuid).is_none(), "entries are not groups");
    }

    assert!(db.resolve_group(&Uuid::new_v4()).is_none());
    assert!(db.resolve_entry(&Uuid::new_v4()).is_none());
}

#[test]
fn test_parent_links() {
    let (mut db, root_id) = setup_database();
    let group = add_group(&mut db, &root_id, "Mail");
    let entry = add_entry(&mut db, &group, "work");

    assert_eq!(db.root_group().unwrap().parent(), None);
    assert_eq!(db.resolve_group(&group).unwrap().parent(), Some(root_id));
    assert_eq!(db.resolve_entry(&entry).unwrap().parent(), Some(group));
}

#[test]
fn test_add_remove_and_tombstone_scenario() {
    let (mut db, root_id) = setup_database();
    let g1 = add_group(&mut db, &root_id, "G1");
    let e1 = add_entry(&mut db, &g1, "E1");

    assert_eq!(db.resolve_group(&g1).unwrap().uuid(), g1);
    assert_eq!(db.resolve_entry(&e1).unwrap().uuid(), e1);

    let removed = db.remove_group(&g1).expect("Failed to remove group");
    assert_eq!(removed.uuid(), g1);
    assert_eq!(removed.entries()[0].uuid(), e1);
    assert!(removed.parent().is_none());

    let t = Utc::now();
    db.add_deleted_object(DeletedObject::new(g1, t));

    assert_eq!(db.deleted_objects(), &[DeletedObject::new(g1, t)]);
    assert!(db.resolve_group(&g1).is_none());
    assert!(db.resolve_entry(&e1).is_none());
    assert!(!db.contains_uuid(&e1));
}

#[test]
fn test_deleted_objects_keep_order_and_duplicates() {
    let mut db = Database::new();
    let uuid = Uuid::new_v4();
    let other = Uuid::new_v4();
    let t1 = Utc::now() - Duration::minutes(5);
    let t2 = Utc::now();

    db.add_deleted_object(DeletedObject::new(uuid, t2));
    db.add_deleted_object(DeletedObject::new(other, t1));
    db.add_deleted_object(DeletedObject::new(uuid, t1));

    let uuids: Vec<Uuid> = db.deleted_objects().iter().map(|d| d.uuid).collect();
    assert_eq!(uuids, vec![uuid, other, uuid]);
    assert_eq!(db.deleted_objects()[0].deletion_time, t2);
    assert_eq!(db.deleted_objects()[2].deletion_time, t1);
}

#[test]
fn test_mutations_emit_pre_and_post_events_in_order() {
    let (mut db, root_id) = setup_database();
    let events = record_events(&mut db);

    let g1 = add_group(&mut db, &root_id, "G1");
    let g0 = Group::new(GroupData::named("G0"));
    db.insert_group(&root_id, 0, g0).unwrap();
    assert_eq!(
        take_events(&events),
        vec![
            "group_about_to_add:G1:0",
            "group_added",
            "group_about_to_add:G0:0",
            "group_added",
        ]
    );

    db.update_group(&g1, |data| data.name = "Renamed".to_string())
        .unwrap();
    assert_eq!(
        take_events(&events),
        vec!["group_data_about_to_change:G1", "group_data_changed"]
    );
    assert_eq!(db.resolve_group(&g1).unwrap().data().name, "Renamed");

    db.remove_group(&g1).unwrap();
    assert_eq!(
        take_events(&events),
        vec!["group_about_to_remove:Renamed", "group_removed"]
    );
}

#[test]
fn test_entry_mutations_emit_events() {
    let (mut db, root_id) = setup_database();
    let events = record_events(&mut db);

    let entry = add_entry(&mut db, &root_id, "bank");
    db.update_entry(&entry, |data| data.password = "new".to_string())
        .unwrap();
    let removed = db.remove_entry(&entry).unwrap();

    assert_eq!(removed.data().password, "new");
    assert!(removed.parent().is_none());
    assert_eq!(
        take_events(&events),
        vec![
            "entry_about_to_add:bank:0",
            "entry_added",
            "entry_data_about_to_change:bank",
            "entry_data_changed",
            "entry_about_to_remove:bank",
            "entry_removed",
        ]
    );
}

#[test]
fn test_pre_event_sees_tree_before_mutation() {
    let (mut db, root_id) = setup_database();
    let g1 = add_group(&mut db, &root_id, "G1");
    let old_name = Uuid::new_v4().to_string();
    db.update_group(&g1, |data| data.name = old_name.clone())
        .unwrap();

    let seen = std::sync::Arc::new(std::sync::Mutex::new(None));
    let sink = std::sync::Arc::clone(&seen);
    db.subscribe(move |event| {
        if let keepcore::event::DatabaseEvent::GroupDataAboutToChange { group } = event {
            *sink.lock().unwrap() = Some(group.data().name.clone());
        }
    });

    db.update_group(&g1, |data| data.name = "new".to_string())
        .unwrap();
    assert_eq!(seen.lock().unwrap().as_deref(), Some(old_name.as_str()));
}

#[test]
fn test_set_root_group_emits_no_events() {
    let (mut db, root_id) = setup_database();
    let events = record_events(&mut db);

    let new_root = Group::new(GroupData::named("New Root"));
    let new_root_id = new_root.uuid();
    let previous = db
        .set_root_group(new_root)
        .expect("Failed to replace root")
        .expect("previous root should be returned");

    assert_eq!(previous.uuid(), root_id);
    assert!(take_events(&events).is_empty());
    assert_eq!(db.root_group().unwrap().uuid(), new_root_id);
    assert!(db.resolve_group(&root_id).is_none());

    // Mutations on the new root notify as usual
    add_group(&mut db, &new_root_id, "child");
    assert_eq!(
        take_events(&events),
        vec!["group_about_to_add:child:0", "group_added"]
    );
}

#[test]
fn test_set_root_group_indexes_loaded_tree() {
    let mut root = Group::new(GroupData::named("Root"));
    let mut mail = Group::new(GroupData::named("Mail"));
    let entry = Entry::new(EntryData::default());
    let entry_id = entry.uuid();
    mail.add_entry(entry);
    let mail_id = mail.uuid();
    root.add_child(mail);

    // Simulate a persistence round trip, which drops parent links
    let json = serde_json::to_string(&root).unwrap();
    let loaded: Group = serde_json::from_str(&json).unwrap();

    let mut db = Database::new();
    assert!(db.set_root_group(loaded).unwrap().is_none());
    assert!(db.contains_uuid(&entry_id));
    assert_eq!(db.resolve_entry(&entry_id).unwrap().parent(), Some(mail_id));

    // A loaded UUID cannot be reused
    let duplicate = Entry::with_uuid(entry_id, EntryData::default());
    assert!(matches!(
        db.add_entry(&mail_id, duplicate),
        Err(Error::DuplicateUuid(uuid)) if uuid == entry_id
    ));
}

#[test]
fn test_set_root_group_rejects_duplicates() {
    let (mut db, root_id) = setup_database();
    let events = record_events(&mut db);

    let mut bad = Group::new(GroupData::named("Bad"));
    let uuid = Uuid::new_v4();
    bad.add_child(Group::with_uuid(uuid, GroupData::default()));
    bad.add_entry(Entry::with_uuid(uuid, EntryData::default()));

    assert!(matches!(
        db.set_root_group(bad),
        Err(Error::DuplicateUuid(u)) if u == uuid
    ));
    assert_eq!(db.root_group().unwrap().uuid(), root_id);
    assert!(take_events(&events).is_empty());
}

#[test]
fn test_failed_mutations_change_nothing() {
    let (mut db, root_id) = setup_database();
    let g1 = add_group(&mut db, &root_id, "G1");
    let events = record_events(&mut db);

    // Duplicate UUID
    let duplicate = Group::with_uuid(g1, GroupData::named("dup"));
    assert!(matches!(
        db.add_group(&root_id, duplicate),
        Err(Error::DuplicateUuid(_))
    ));

    // Unknown parent
    let missing = Uuid::new_v4();
    assert!(matches!(
        db.add_group(&missing, Group::new(GroupData::default())),
        Err(Error::GroupNotFound(u)) if u == missing
    ));
    assert!(matches!(
        db.add_entry(&missing, Entry::new(EntryData::default())),
        Err(Error::GroupNotFound(_))
    ));

    // Index out of range
    assert!(matches!(
        db.insert_group(&root_id, 5, Group::new(GroupData::default())),
        Err(Error::InvalidOperation(_))
    ));

    // Unknown nodes
    assert!(matches!(
        db.remove_group(&missing),
        Err(Error::GroupNotFound(_))
    ));
    assert!(matches!(
        db.remove_entry(&missing),
        Err(Error::EntryNotFound(_))
    ));
    assert!(matches!(
        db.update_entry(&missing, |_| {}),
        Err(Error::EntryNotFound(_))
    ));

    // The root is only replaced with set_root_group
    assert!(matches!(
        db.remove_group(&root_id),
        Err(Error::InvalidOperation(_))
    ));

    assert!(take_events(&events).is_empty());
    assert_eq!(db.root_group().unwrap().children().len(), 1);
}

#[test]
fn test_mutations_without_root() {
    let mut db = Database::new();
    let uuid = Uuid::new_v4();
    assert!(matches!(
        db.add_group(&uuid, Group::new(GroupData::default())),
        Err(Error::NoRootGroup)
    ));
    assert!(matches!(db.remove_entry(&uuid), Err(Error::NoRootGroup)));
    assert!(db.take_root_group().is_none());
}

#[test]
fn test_removed_subtree_can_be_readded() {
    let (mut db, root_id) = setup_database();
    let a = add_group(&mut db, &root_id, "A");
    let b = add_group(&mut db, &root_id, "B");
    let nested = add_group(&mut db, &a, "nested");
    let entry = add_entry(&mut db, &nested, "entry");

    // Moving is remove + add; UUIDs are preserved
    let subtree = db.remove_group(&a).unwrap();
    db.add_group(&b, subtree).unwrap();

    assert_eq!(db.resolve_group(&a).unwrap().parent(), Some(b));
    assert_eq!(db.resolve_group(&nested).unwrap().parent(), Some(a));
    assert_eq!(db.resolve_entry(&entry).unwrap().parent(), Some(nested));
}

#[test]
fn test_unsubscribe_stops_events() {
    let (mut db, root_id) = setup_database();
    let events = std::sync::Arc::new(std::sync::Mutex::new(0));
    let sink = std::sync::Arc::clone(&events);
    let id = db.subscribe(move |_| *sink.lock().unwrap() += 1);

    add_group(&mut db, &root_id, "one");
    assert!(db.unsubscribe(id));
    add_group(&mut db, &root_id, "two");

    assert_eq!(*events.lock().unwrap(), 2);
}

#[test]
fn test_metadata_replaced_as_whole() {
    let mut db = Database::new();
    db.metadata_mut().set_name("Old");
    db.metadata_mut().recycle_bin_enabled = false;

    let mut loaded = keepcore::Metadata::new();
    loaded.set_name("Loaded");

    let previous = db.set_metadata(loaded);
    assert_eq!(previous.name(), "Old");
    assert_eq!(db.metadata().name(), "Loaded");
    // Nothing from the old metadata survives
    assert!(db.metadata().recycle_bin_enabled);
}
