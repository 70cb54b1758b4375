//! 刷新令牌轮换集成测试
//!
//! 覆盖签发、轮换、重放检测 (全量撤销)、注销幂等和跨用户防护。

mod common;

use std::sync::Arc;

use delivery_server::auth::{AuthConfig, JwtService, TokenError, TokenLedger};
use delivery_server::db::repository;
use sqlx::SqlitePool;

fn ledger() -> TokenLedger {
    let config = AuthConfig::for_tests();
    let jwt = Arc::new(JwtService::with_config(config.clone()));
    TokenLedger::new(jwt, config)
}

async fn live_rows(pool: &SqlitePool, user_id: i64) -> Vec<shared::models::RefreshToken> {
    repository::refresh_token::find_live_by_user(pool, user_id, shared::util::now_millis())
        .await
        .unwrap()
}

#[tokio::test]
async fn issues_and_rotates_a_refresh_token() {
    let db = common::test_db().await;
    let user = common::seed_user(&db.pool, "alice@example.com").await;
    let ledger = ledger();

    let pair = ledger
        .issue(&db.pool, user.id, &user.email, Some("test-agent".into()))
        .await
        .expect("Issue failed");
    assert_eq!(pair.token_type, "Bearer");
    assert!(pair.expires_in > 0);

    let rows = live_rows(&db.pool, user.id).await;
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].is_revoked);
    // Only the hash is stored, never the plaintext
    assert_ne!(rows[0].token_hash, pair.refresh_token);

    let (new_pair, rotated_user) = ledger
        .rotate(&db.pool, &pair.refresh_token)
        .await
        .expect("Rotation failed");
    assert_eq!(rotated_user, user.id);
    assert_ne!(new_pair.refresh_token, pair.refresh_token);

    // Old row is stamped and revoked, new row is live
    let rows = live_rows(&db.pool, user.id).await;
    assert_eq!(rows.len(), 2);
    let old = rows.iter().find(|r| r.is_revoked).expect("Old row missing");
    assert!(old.last_used_at.is_some());
    assert!(old.revoked_at.is_some());
    assert_eq!(rows.iter().filter(|r| !r.is_revoked).count(), 1);

    // Device info carries over to the replacement token
    let fresh = rows.iter().find(|r| !r.is_revoked).unwrap();
    assert_eq!(fresh.device_info.as_deref(), Some("test-agent"));

    // The new token rotates fine
    ledger
        .rotate(&db.pool, &new_pair.refresh_token)
        .await
        .expect("Second rotation failed");
}

#[tokio::test]
async fn replayed_token_revokes_every_session() {
    let db = common::test_db().await;
    let user = common::seed_user(&db.pool, "bob@example.com").await;
    let ledger = ledger();

    // Two independent sessions
    let stolen = ledger
        .issue(&db.pool, user.id, &user.email, Some("phone".into()))
        .await
        .unwrap();
    let _other = ledger
        .issue(&db.pool, user.id, &user.email, Some("laptop".into()))
        .await
        .unwrap();

    // Legitimate rotation consumes the first token
    let (replacement, _) = ledger.rotate(&db.pool, &stolen.refresh_token).await.unwrap();

    // The attacker replays the consumed token
    let err = ledger
        .rotate(&db.pool, &stolen.refresh_token)
        .await
        .unwrap_err();
    assert!(matches!(err, TokenError::Reuse(id) if id == user.id), "got {err:?}");

    // Everything is dead, including the replacement and the other session
    let rows = live_rows(&db.pool, user.id).await;
    assert!(rows.iter().all(|r| r.is_revoked));
    let err = ledger
        .rotate(&db.pool, &replacement.refresh_token)
        .await
        .unwrap_err();
    assert!(matches!(err, TokenError::Reuse(_)), "got {err:?}");
}

#[tokio::test]
async fn logout_is_idempotent_and_owner_scoped() {
    let db = common::test_db().await;
    let alice = common::seed_user(&db.pool, "alice@example.com").await;
    let mallory = common::seed_user(&db.pool, "mallory@example.com").await;
    let ledger = ledger();

    let pair = ledger
        .issue(&db.pool, alice.id, &alice.email, None)
        .await
        .unwrap();

    // Another user cannot revoke Alice's session
    let err = ledger
        .revoke(&db.pool, &pair.refresh_token, mallory.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TokenError::Invalid), "got {err:?}");
    assert!(!live_rows(&db.pool, alice.id).await[0].is_revoked);

    // Owner logout revokes, and doing it again is a no-op
    ledger
        .revoke(&db.pool, &pair.refresh_token, alice.id)
        .await
        .unwrap();
    assert!(live_rows(&db.pool, alice.id).await[0].is_revoked);
    ledger
        .revoke(&db.pool, &pair.refresh_token, alice.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn revoke_all_counts_active_sessions() {
    let db = common::test_db().await;
    let user = common::seed_user(&db.pool, "carol@example.com").await;
    let ledger = ledger();

    for _ in 0..3 {
        ledger
            .issue(&db.pool, user.id, &user.email, None)
            .await
            .unwrap();
    }

    let revoked = ledger.revoke_all(&db.pool, user.id).await.unwrap();
    assert_eq!(revoked, 3);

    // Already-revoked rows are not counted twice
    let revoked = ledger.revoke_all(&db.pool, user.id).await.unwrap();
    assert_eq!(revoked, 0);
}

#[tokio::test]
async fn rejects_garbage_and_ledger_expired_tokens() {
    let db = common::test_db().await;
    let user = common::seed_user(&db.pool, "dave@example.com").await;
    let ledger = ledger();

    let err = ledger
        .rotate(&db.pool, "not-a-jwt")
        .await
        .unwrap_err();
    assert!(matches!(err, TokenError::Invalid), "got {err:?}");

    // A token whose ledger row has lapsed no longer matches anything
    let pair = ledger
        .issue(&db.pool, user.id, &user.email, None)
        .await
        .unwrap();
    sqlx::query("UPDATE refresh_token SET expires_at = ?1 WHERE user_id = ?2")
        .bind(shared::util::now_millis() - 1000)
        .bind(user.id)
        .execute(&db.pool)
        .await
        .unwrap();

    let err = ledger
        .rotate(&db.pool, &pair.refresh_token)
        .await
        .unwrap_err();
    assert!(matches!(err, TokenError::Invalid), "got {err:?}");
}
