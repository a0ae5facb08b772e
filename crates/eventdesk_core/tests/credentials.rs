use eventdesk_core::{
    CredentialError, CredentialRepository, CredentialService, SnapshotStore,
    StoreCredentialRepository, DEFAULT_ADMIN_PASSWORD,
};

#[test]
fn seeded_admin_can_log_in_with_the_default_password() {
    let store = SnapshotStore::in_memory().unwrap();
    let service = CredentialService::new(StoreCredentialRepository::new(&store));

    let credential = service
        .verify_login("admin", DEFAULT_ADMIN_PASSWORD)
        .unwrap()
        .expect("seeded admin should authenticate");
    assert_eq!(credential.username, "admin");

    assert!(service.verify_login("admin", "wrong").unwrap().is_none());
    assert!(service
        .verify_login("nobody", DEFAULT_ADMIN_PASSWORD)
        .unwrap()
        .is_none());
}

#[test]
fn change_password_verifies_the_current_one_first() {
    let store = SnapshotStore::in_memory().unwrap();
    let repo = StoreCredentialRepository::new(&store);
    let admin_id = repo.find_by_username("admin").unwrap().unwrap().id;
    let service = CredentialService::new(repo);

    let mismatch = service.change_password(admin_id, "wrong", "NewPass#456");
    assert!(matches!(
        mismatch,
        Err(CredentialError::CurrentPasswordMismatch)
    ));

    service
        .change_password(admin_id, DEFAULT_ADMIN_PASSWORD, "NewPass#456")
        .unwrap();

    assert!(service
        .verify_login("admin", DEFAULT_ADMIN_PASSWORD)
        .unwrap()
        .is_none());
    assert!(service.verify_login("admin", "NewPass#456").unwrap().is_some());
}

#[test]
fn change_password_for_an_unknown_credential_fails() {
    let store = SnapshotStore::in_memory().unwrap();
    let service = CredentialService::new(StoreCredentialRepository::new(&store));

    let result = service.change_password(999, DEFAULT_ADMIN_PASSWORD, "whatever");
    assert!(matches!(
        result,
        Err(CredentialError::UnknownCredential(999))
    ));
}
