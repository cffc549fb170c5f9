use vox_assistant::domain::types::{CodeRejection, RECOVERY_CODE_LEN};
use vox_assistant::error::AssistantError;
use vox_assistant::usecase::recovery::{
    ChangePasswordInput, ChangePasswordUseCase, DeliveryOutcome, RequestRecoveryUseCase,
    ResetPasswordInput, ResetPasswordUseCase, VerifyRecoveryInput, VerifyRecoveryUseCase,
};
use vox_auth_types::password::verify_password;
use vox_domain::id::UserId;

use crate::helpers::{MockMailer, MockRecoveryCodeRepo, MockUserRepo, recovery_code, test_user};

fn verify_input(identifier: &str, code: &str, consume: bool) -> VerifyRecoveryInput {
    VerifyRecoveryInput {
        identifier: identifier.to_owned(),
        code: code.to_owned(),
        consume,
    }
}

/// The code as it appears in the plain-text email body.
fn mailed_code(text_body: &str) -> String {
    let (_, rest) = text_body
        .split_once("verificación es: ")
        .expect("email body carries the code");
    rest.chars().take(RECOVERY_CODE_LEN).collect()
}

// ── RequestRecovery ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_issue_and_mail_a_six_digit_code() {
    let user = test_user(1, "ana");
    let codes = MockRecoveryCodeRepo::empty();
    let codes_handle = codes.codes_handle();
    let mailer = MockMailer::working();
    let sent = mailer.sent_handle();

    let uc = RequestRecoveryUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        codes,
        mailer,
        expose_code_on_failure: false,
    };
    let requested = uc.execute("ana@example.com").await.unwrap();

    assert_eq!(requested.handle, "ana");
    assert_eq!(requested.delivery, DeliveryOutcome::Sent);

    let codes = codes_handle.lock().unwrap();
    assert_eq!(codes.len(), 1);
    let issued = &codes[0];
    assert_eq!(issued.code.len(), RECOVERY_CODE_LEN);
    assert!(issued.is_valid());
    let ttl = issued.expires_at - issued.created_at;
    assert_eq!(ttl.num_minutes(), 15);

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, user.email);
    assert!(sent[0].text_body.contains(&issued.code));
}

#[tokio::test]
async fn should_invalidate_previous_codes_on_new_request() {
    let codes = MockRecoveryCodeRepo::new(vec![recovery_code(UserId(1), "111111", 600, false)]);
    let codes_handle = codes.codes_handle();
    let uc = RequestRecoveryUseCase {
        users: MockUserRepo::new(vec![test_user(1, "ana")]),
        codes,
        mailer: MockMailer::working(),
        expose_code_on_failure: false,
    };

    uc.execute("ana").await.unwrap();

    let codes = codes_handle.lock().unwrap();
    let active: Vec<_> = codes.iter().filter(|c| c.is_valid()).collect();
    assert_eq!(active.len(), 1, "exactly one active code per user");
    assert_ne!(active[0].code, "111111");
}

#[tokio::test]
async fn should_reject_first_code_after_second_request() {
    let users = MockUserRepo::new(vec![test_user(1, "ana")]);
    let codes = MockRecoveryCodeRepo::empty();
    let mailer = MockMailer::working();
    let sent = mailer.sent_handle();
    let request = RequestRecoveryUseCase {
        users: users.clone(),
        codes: codes.clone(),
        mailer,
        expose_code_on_failure: false,
    };

    request.execute("ana").await.unwrap();
    request.execute("ana").await.unwrap();

    let mailed: Vec<String> = sent
        .lock()
        .unwrap()
        .iter()
        .map(|email| mailed_code(&email.text_body))
        .collect();
    assert_eq!(mailed.len(), 2);

    let verify = VerifyRecoveryUseCase { users, codes };
    let result = verify.execute(verify_input("ana", &mailed[0], false)).await;
    assert!(
        matches!(result, Err(AssistantError::InvalidCode(_))),
        "expected the first code to be rejected, got {result:?}"
    );
    let result = verify.execute(verify_input("ana", &mailed[1], false)).await;
    assert_eq!(result.unwrap(), UserId(1));
}

#[tokio::test]
async fn should_hide_code_when_delivery_fails() {
    let uc = RequestRecoveryUseCase {
        users: MockUserRepo::new(vec![test_user(1, "ana")]),
        codes: MockRecoveryCodeRepo::empty(),
        mailer: MockMailer::failing(),
        expose_code_on_failure: false,
    };
    let requested = uc.execute("ana").await.unwrap();
    match requested.delivery {
        DeliveryOutcome::Failed { reason, code } => {
            assert!(reason.contains("refused"));
            assert!(code.is_none());
        }
        other => panic!("expected failed delivery, got {other:?}"),
    }
}

#[tokio::test]
async fn should_expose_code_on_failure_when_enabled() {
    let codes = MockRecoveryCodeRepo::empty();
    let codes_handle = codes.codes_handle();
    let uc = RequestRecoveryUseCase {
        users: MockUserRepo::new(vec![test_user(1, "ana")]),
        codes,
        mailer: MockMailer::failing(),
        expose_code_on_failure: true,
    };
    let requested = uc.execute("ana").await.unwrap();
    let issued = codes_handle.lock().unwrap()[0].code.clone();
    assert_eq!(
        requested.delivery,
        DeliveryOutcome::Failed {
            reason: "smtp connection refused".into(),
            code: Some(issued),
        }
    );
}

#[tokio::test]
async fn should_reject_recovery_for_unknown_user() {
    let uc = RequestRecoveryUseCase {
        users: MockUserRepo::new(vec![test_user(1, "ana")]),
        codes: MockRecoveryCodeRepo::empty(),
        mailer: MockMailer::working(),
        expose_code_on_failure: false,
    };
    let result = uc.execute("nadie@example.com").await;
    assert!(
        matches!(result, Err(AssistantError::UnknownUser)),
        "expected UnknownUser, got {result:?}"
    );
}

// ── VerifyRecovery ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_verify_without_consuming_by_default() {
    let codes = MockRecoveryCodeRepo::new(vec![recovery_code(UserId(1), "123456", 600, false)]);
    let codes_handle = codes.codes_handle();
    let uc = VerifyRecoveryUseCase {
        users: MockUserRepo::new(vec![test_user(1, "ana")]),
        codes,
    };

    let user_id = uc.execute(verify_input("ana", "123456", false)).await.unwrap();
    assert_eq!(user_id, UserId(1));
    assert!(!codes_handle.lock().unwrap()[0].is_used());

    uc.execute(verify_input("ana", " 123456 ", true)).await.unwrap();
    assert!(codes_handle.lock().unwrap()[0].is_used());
}

#[tokio::test]
async fn should_distinguish_used_from_invalid_codes() {
    let uc = VerifyRecoveryUseCase {
        users: MockUserRepo::new(vec![test_user(1, "ana")]),
        codes: MockRecoveryCodeRepo::new(vec![
            recovery_code(UserId(1), "111111", 600, true),
            recovery_code(UserId(1), "222222", -60, false),
        ]),
    };

    let used = uc.execute(verify_input("ana", "111111", false)).await;
    assert!(matches!(
        used,
        Err(AssistantError::InvalidCode(CodeRejection::AlreadyUsed))
    ));

    let expired = uc.execute(verify_input("ana", "222222", false)).await;
    assert!(matches!(
        expired,
        Err(AssistantError::InvalidCode(CodeRejection::InvalidOrExpired))
    ));

    let wrong = uc.execute(verify_input("ana", "999999", false)).await;
    assert!(matches!(
        wrong,
        Err(AssistantError::InvalidCode(CodeRejection::InvalidOrExpired))
    ));
}

#[tokio::test]
async fn should_not_accept_another_users_code() {
    let uc = VerifyRecoveryUseCase {
        users: MockUserRepo::new(vec![test_user(1, "ana"), test_user(2, "beto")]),
        codes: MockRecoveryCodeRepo::new(vec![recovery_code(UserId(2), "123456", 600, false)]),
    };
    let result = uc.execute(verify_input("ana", "123456", false)).await;
    assert!(matches!(result, Err(AssistantError::InvalidCode(_))));
}

// ── ChangePassword ───────────────────────────────────────────────────────────

fn change_input(password: &str, code: Option<&str>) -> ChangePasswordInput {
    ChangePasswordInput {
        new_password: password.to_owned(),
        recovery_code: code.map(str::to_owned),
    }
}

#[tokio::test]
async fn should_change_password_and_spend_code() {
    let users = MockUserRepo::new(vec![test_user(1, "ana")]);
    let users_handle = users.users_handle();
    let codes = MockRecoveryCodeRepo::new(vec![recovery_code(UserId(1), "123456", 600, false)]);
    let codes_handle = codes.codes_handle();
    let uc = ChangePasswordUseCase {
        users,
        codes,
        allow_used_code: false,
    };

    uc.execute(UserId(1), change_input("nueva123", Some("123456")))
        .await
        .unwrap();

    assert!(codes_handle.lock().unwrap()[0].is_used());
    let hash = users_handle.lock().unwrap()[0].password_hash.clone();
    assert!(verify_password("nueva123", &hash).unwrap());
}

#[tokio::test]
async fn should_check_password_strength_before_code() {
    let uc = ChangePasswordUseCase {
        users: MockUserRepo::new(vec![test_user(1, "ana")]),
        codes: MockRecoveryCodeRepo::empty(),
        allow_used_code: false,
    };
    let result = uc
        .execute(UserId(1), change_input("123", Some("000000")))
        .await;
    assert!(matches!(result, Err(AssistantError::WeakPassword)));
}

#[tokio::test]
async fn should_reject_used_code_under_strict_policy() {
    let uc = ChangePasswordUseCase {
        users: MockUserRepo::new(vec![test_user(1, "ana")]),
        codes: MockRecoveryCodeRepo::new(vec![recovery_code(UserId(1), "123456", 600, true)]),
        allow_used_code: false,
    };
    let result = uc
        .execute(UserId(1), change_input("nueva123", Some("123456")))
        .await;
    assert!(matches!(
        result,
        Err(AssistantError::InvalidCode(CodeRejection::AlreadyUsed))
    ));
}

#[tokio::test]
async fn should_accept_used_code_when_policy_allows() {
    let users = MockUserRepo::new(vec![test_user(1, "ana")]);
    let users_handle = users.users_handle();
    let uc = ChangePasswordUseCase {
        users,
        codes: MockRecoveryCodeRepo::new(vec![recovery_code(UserId(1), "123456", 600, true)]),
        allow_used_code: true,
    };
    uc.execute(UserId(1), change_input("nueva123", Some("123456")))
        .await
        .unwrap();
    let hash = users_handle.lock().unwrap()[0].password_hash.clone();
    assert!(verify_password("nueva123", &hash).unwrap());
}

#[tokio::test]
async fn should_reject_expired_code_on_change() {
    let uc = ChangePasswordUseCase {
        users: MockUserRepo::new(vec![test_user(1, "ana")]),
        codes: MockRecoveryCodeRepo::new(vec![recovery_code(UserId(1), "123456", -1, false)]),
        allow_used_code: true,
    };
    let result = uc
        .execute(UserId(1), change_input("nueva123", Some("123456")))
        .await;
    assert!(matches!(
        result,
        Err(AssistantError::InvalidCode(CodeRejection::InvalidOrExpired))
    ));
}

#[tokio::test]
async fn should_fail_for_unknown_user_id() {
    let uc = ChangePasswordUseCase {
        users: MockUserRepo::empty(),
        codes: MockRecoveryCodeRepo::empty(),
        allow_used_code: false,
    };
    let result = uc.execute(UserId(7), change_input("nueva123", None)).await;
    assert!(matches!(result, Err(AssistantError::UnknownUser)));
}

#[tokio::test]
async fn should_reset_password_by_identifier() {
    let users = MockUserRepo::new(vec![test_user(1, "ana")]);
    let users_handle = users.users_handle();
    let uc = ResetPasswordUseCase {
        change: ChangePasswordUseCase {
            users,
            codes: MockRecoveryCodeRepo::new(vec![recovery_code(UserId(1), "654321", 600, false)]),
            allow_used_code: false,
        },
    };
    let user_id = uc
        .execute(ResetPasswordInput {
            identifier: "ana@example.com".into(),
            code: "654321".into(),
            new_password: "nueva123".into(),
        })
        .await
        .unwrap();
    assert_eq!(user_id, UserId(1));
    let hash = users_handle.lock().unwrap()[0].password_hash.clone();
    assert!(verify_password("nueva123", &hash).unwrap());
}
