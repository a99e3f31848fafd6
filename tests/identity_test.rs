//! Identity keystore tests
//!
//! Each create/load pays the full PBKDF2 cost, so tests share identities
//! where they can.

use claim_registrar::storage::identity::{
    create_identity, identities_dir, identity_dir, identity_exists, list_identities,
    load_identity, load_identity_metadata, IdentityError,
};
use claim_registrar::storage::keys::{derive_actor_id, KeyError};

#[test]
fn test_create_and_unlock_identity() {
    let temp_dir = tempfile::tempdir().unwrap();
    let data_dir = temp_dir.path();

    let created = create_identity(data_dir, "alice", "hunter2").unwrap();

    assert_eq!(created.name, "alice");
    assert_eq!(created.actor_id, derive_actor_id(&created.public_key));

    let dir = identity_dir(data_dir, "alice");
    assert!(dir.join("identity.json").exists());
    assert!(dir.join("key.json").exists());

    // Secret key never hits disk in the clear
    let key_json = std::fs::read_to_string(dir.join("key.json")).unwrap();
    assert!(!key_json.contains(&hex::encode(created.secret_key.secret_bytes())));

    let metadata = load_identity_metadata(data_dir, "alice").unwrap();
    assert_eq!(metadata.actor_id, created.actor_id);
    assert_eq!(metadata.public_key, hex::encode(created.public_key.serialize()));

    let unlocked = load_identity(data_dir, "alice", "hunter2").unwrap();
    assert_eq!(unlocked.actor_id, created.actor_id);
    assert_eq!(
        unlocked.secret_key.secret_bytes(),
        created.secret_key.secret_bytes()
    );

    match load_identity(data_dir, "alice", "wrong") {
        Err(IdentityError::Key(KeyError::Decryption(_))) => {}
        other => panic!("Expected decryption failure, got {:?}", other),
    }
}

#[test]
fn test_duplicate_and_missing_identities() {
    let temp_dir = tempfile::tempdir().unwrap();
    let data_dir = temp_dir.path();

    assert!(!identity_exists(data_dir, "alice"));
    create_identity(data_dir, "alice", "pw").unwrap();
    assert!(identity_exists(data_dir, "alice"));

    assert!(matches!(
        create_identity(data_dir, "alice", "pw"),
        Err(IdentityError::IdentityExists(name)) if name == "alice"
    ));
    assert!(matches!(
        load_identity_metadata(data_dir, "bob"),
        Err(IdentityError::IdentityNotFound(name)) if name == "bob"
    ));
    assert!(matches!(
        load_identity(data_dir, "bob", "pw"),
        Err(IdentityError::IdentityNotFound(_))
    ));
}

#[test]
fn test_invalid_identity_names_are_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    let data_dir = temp_dir.path();

    for name in ["", ".", "..", ".hidden", "a/b", "..\\escape"] {
        assert!(
            matches!(
                create_identity(data_dir, name, "pw"),
                Err(IdentityError::InvalidName(_))
            ),
            "'{}' should be rejected",
            name
        );
        assert!(!identity_exists(data_dir, name));
    }

    assert!(!identities_dir(data_dir).exists(), "Nothing should be written");
}

#[test]
fn test_list_identities() {
    let temp_dir = tempfile::tempdir().unwrap();
    let data_dir = temp_dir.path();

    assert!(list_identities(data_dir).unwrap().is_empty());

    let alice = create_identity(data_dir, "alice", "pw").unwrap();
    let bob = create_identity(data_dir, "bob", "pw").unwrap();
    assert_ne!(alice.actor_id, bob.actor_id);

    // Stray entries are ignored
    std::fs::write(identities_dir(data_dir).join("notes.txt"), "x").unwrap();
    std::fs::create_dir_all(identities_dir(data_dir).join("empty")).unwrap();
    std::fs::create_dir_all(identities_dir(data_dir).join("broken")).unwrap();
    std::fs::write(
        identity_dir(data_dir, "broken").join("identity.json"),
        "{not json",
    )
    .unwrap();

    let listed = list_identities(data_dir).unwrap();
    let mut names: Vec<_> = listed.iter().map(|m| m.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["alice", "bob"]);

    // Newest first
    assert!(listed[0].created_at >= listed[1].created_at);
}

#[test]
fn test_failed_create_leaves_no_partial_identity() {
    let temp_dir = tempfile::tempdir().unwrap();
    let data_dir = temp_dir.path();

    // A directory squatting on the metadata file name makes the second write fail
    let staging = identities_dir(data_dir).join(".alice.tmp");
    std::fs::create_dir_all(staging.join("identity.json")).unwrap();

    match create_identity(data_dir, "alice", "pw") {
        Err(IdentityError::Io(_)) => {}
        other => panic!("Expected IO failure, got {:?}", other),
    }

    assert!(!staging.exists(), "Partial files should be removed");
    assert!(!identity_dir(data_dir, "alice").exists());
    assert!(!identity_exists(data_dir, "alice"));
    assert!(list_identities(data_dir).unwrap().is_empty());

    // The name is free again
    let created = create_identity(data_dir, "alice", "pw").unwrap();
    assert_eq!(
        load_identity_metadata(data_dir, "alice").unwrap().actor_id,
        created.actor_id
    );
}
