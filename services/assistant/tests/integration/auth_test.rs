use vox_assistant::domain::repository::UserRepository;
use vox_assistant::domain::types::IdentityField;
use vox_assistant::error::AssistantError;
use vox_assistant::usecase::auth::{
    AuthenticateUseCase, ChangeOwnPasswordInput, ChangeOwnPasswordUseCase, RegisterInput,
    RegisterUseCase, ResolveSessionUseCase,
};
use vox_auth_types::password::verify_password;
use vox_domain::id::UserId;

use crate::helpers::{MockUserRepo, TEST_PASSWORD, test_user};

fn register_input(handle: &str, email: &str, password: &str) -> RegisterInput {
    RegisterInput {
        full_name: "Ana Pérez".to_owned(),
        handle: handle.to_owned(),
        email: email.to_owned(),
        password: password.to_owned(),
    }
}

#[tokio::test]
async fn should_register_user_with_hashed_password() {
    let repo = MockUserRepo::empty();
    let users = repo.users_handle();
    let uc = RegisterUseCase { users: repo };

    let user = uc
        .execute(register_input("ana", "ana@example.com", "clave123"))
        .await
        .unwrap();

    assert_eq!(user.handle, "ana");
    assert!(user.active);
    let stored = users.lock().unwrap()[0].clone();
    assert_ne!(stored.password_hash, "clave123");
    assert!(stored.password_hash.starts_with("$argon2id$"));
    assert!(verify_password("clave123", &stored.password_hash).unwrap());
}

#[tokio::test]
async fn should_reject_short_password() {
    let uc = RegisterUseCase {
        users: MockUserRepo::empty(),
    };
    let result = uc
        .execute(register_input("ana", "ana@example.com", "12345"))
        .await;
    assert!(
        matches!(result, Err(AssistantError::WeakPassword)),
        "expected WeakPassword, got {result:?}"
    );
}

#[tokio::test]
async fn should_report_handle_before_email_on_duplicate() {
    let existing = test_user(1, "ana");
    let uc = RegisterUseCase {
        users: MockUserRepo::new(vec![existing.clone()]),
    };

    let result = uc
        .execute(register_input("ana", &existing.email, "clave123"))
        .await;
    assert!(
        matches!(
            result,
            Err(AssistantError::DuplicateIdentity(IdentityField::Handle))
        ),
        "expected duplicate handle, got {result:?}"
    );

    let result = uc
        .execute(register_input("otra", &existing.email, "clave123"))
        .await;
    assert!(
        matches!(
            result,
            Err(AssistantError::DuplicateIdentity(IdentityField::Email))
        ),
        "expected duplicate email, got {result:?}"
    );
}

#[tokio::test]
async fn should_report_duplicate_when_insert_loses_race() {
    let existing = test_user(1, "ana");
    let repo = MockUserRepo::with_stale_checks(vec![existing.clone()]);
    let users = repo.users_handle();
    let uc = RegisterUseCase { users: repo };

    let result = uc
        .execute(register_input("ana", "nueva@example.com", "clave123"))
        .await;
    assert!(
        matches!(
            result,
            Err(AssistantError::DuplicateIdentity(IdentityField::Handle))
        ),
        "expected duplicate handle, got {result:?}"
    );

    let result = uc
        .execute(register_input("otra", &existing.email, "clave123"))
        .await;
    assert!(
        matches!(
            result,
            Err(AssistantError::DuplicateIdentity(IdentityField::Email))
        ),
        "expected duplicate email, got {result:?}"
    );
    assert_eq!(users.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_require_all_registration_fields() {
    let uc = RegisterUseCase {
        users: MockUserRepo::empty(),
    };
    let result = uc.execute(register_input("  ", "a@b.c", "clave123")).await;
    assert!(matches!(result, Err(AssistantError::MissingData("handle"))));
}

#[tokio::test]
async fn should_authenticate_with_correct_password_only() {
    let uc = AuthenticateUseCase {
        users: MockUserRepo::new(vec![test_user(1, "ana")]),
    };

    let user = uc.execute("ana", TEST_PASSWORD).await.unwrap();
    assert_eq!(user.map(|u| u.id), Some(UserId(1)));

    assert!(uc.execute("ana", "incorrecta").await.unwrap().is_none());
    assert!(uc.execute("nadie", TEST_PASSWORD).await.unwrap().is_none());
}

#[tokio::test]
async fn should_not_authenticate_inactive_user() {
    let mut user = test_user(1, "ana");
    user.active = false;
    let uc = AuthenticateUseCase {
        users: MockUserRepo::new(vec![user]),
    };
    assert!(uc.execute("ana", TEST_PASSWORD).await.unwrap().is_none());
}

#[tokio::test]
async fn should_resolve_only_active_existing_users() {
    let mut inactive = test_user(2, "beto");
    inactive.active = false;
    let uc = ResolveSessionUseCase {
        users: MockUserRepo::new(vec![test_user(1, "ana"), inactive]),
    };

    assert!(uc.execute(UserId(1)).await.unwrap().is_some());
    assert!(uc.execute(UserId(2)).await.unwrap().is_none());
    assert!(uc.execute(UserId(99)).await.unwrap().is_none());
}

#[tokio::test]
async fn should_change_own_password_after_checking_current() {
    let repo = MockUserRepo::new(vec![test_user(1, "ana")]);
    let uc = ChangeOwnPasswordUseCase { users: repo.clone() };

    let wrong = uc
        .execute(
            UserId(1),
            ChangeOwnPasswordInput {
                current_password: "incorrecta".into(),
                new_password: "nueva123".into(),
            },
        )
        .await;
    assert!(matches!(wrong, Err(AssistantError::InvalidCredentials)));

    uc.execute(
        UserId(1),
        ChangeOwnPasswordInput {
            current_password: TEST_PASSWORD.into(),
            new_password: "nueva123".into(),
        },
    )
    .await
    .unwrap();

    let stored = repo.find_by_id(UserId(1)).await.unwrap().unwrap();
    assert!(verify_password("nueva123", &stored.password_hash).unwrap());
}

#[tokio::test]
async fn should_reject_weak_new_password() {
    let uc = ChangeOwnPasswordUseCase {
        users: MockUserRepo::new(vec![test_user(1, "ana")]),
    };
    let result = uc
        .execute(
            UserId(1),
            ChangeOwnPasswordInput {
                current_password: TEST_PASSWORD.into(),
                new_password: "123".into(),
            },
        )
        .await;
    assert!(matches!(result, Err(AssistantError::WeakPassword)));
}
