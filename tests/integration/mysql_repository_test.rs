//! MySQL repositories against a real database.
//!
//! Run with: TEST_DATABASE_URL=mysql://... cargo test --test mysql_repository_test -- --ignored

use std::sync::Arc;

use rust_decimal_macros::dec;

use quickbill::core::{Clock, ErrorCode, FixedClock};
use quickbill::middleware::{hash_token, Authenticator, MySqlTokenAuthenticator};
use quickbill::modules::clients::models::{ClientFilter, ClientForm};
use quickbill::modules::clients::repositories::MySqlClientRepository;
use quickbill::modules::clients::ClientService;
use quickbill::modules::invoices::models::{InvoiceFilter, InvoicePatch, InvoiceStatus};
use quickbill::modules::invoices::repositories::MySqlInvoiceRepository;
use quickbill::modules::invoices::InvoiceService;
use quickbill::modules::profiles::models::ProfileForm;
use quickbill::modules::profiles::repositories::MySqlProfileRepository;
use quickbill::modules::profiles::ProfileService;

#[macro_use]
#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;

fn clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::at_date(2024, 6, 1))
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_invoice_round_trip() {
    let pool = create_test_pool().await;
    let service = InvoiceService::new(
        Arc::new(MySqlInvoiceRepository::new(pool.clone())),
        clock(),
        test_defaults(),
    );
    let user = unique_user();

    let mut form = invoice_form(
        "Acme Corp",
        vec![line("Design", dec!(2), dec!(100)), line("Hosting", dec!(1), dec!(48.39))],
    );
    form.tax_rate = dec!(8.25);
    form.notes = Some("Thanks".to_string());

    let created = service.create_next(&user, form).await.unwrap();
    let loaded = service.get_by_id(&created.id).await.unwrap();

    assert_eq!(loaded.invoice_number, "INV-2024-0001");
    assert_eq!(loaded.items, created.items);
    assert_eq!(loaded.subtotal_cents, 24839);
    assert_eq!(loaded.tax_cents, created.tax_cents);
    assert_eq!(loaded.total_cents, created.total_cents);
    assert_eq!(loaded.tax_rate, dec!(8.25));
    assert_eq!(loaded.due_date, created.due_date);
    assert_eq!(loaded.notes.as_deref(), Some("Thanks"));

    let by_public = service.get_by_public_id(&created.public_id).await.unwrap();
    assert_eq!(by_public.id, created.id);
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_invoice_update_list_and_soft_delete() {
    let pool = create_test_pool().await;
    let service = InvoiceService::new(
        Arc::new(MySqlInvoiceRepository::new(pool.clone())),
        clock(),
        test_defaults(),
    );
    let user = unique_user();

    let first = service
        .create_next(&user, invoice_form("Acme_Corp", vec![line("Work", dec!(1), dec!(250))]))
        .await
        .unwrap();
    let second = service
        .create_next(&user, invoice_form("Globex", vec![line("Work", dec!(1), dec!(10))]))
        .await
        .unwrap();

    let updated = service
        .update(
            &first.id,
            InvoicePatch {
                tax_rate: Some(dec!(10)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.total_cents, 27500);
    service.update_status(&second.id, InvoiceStatus::Sent).await.unwrap();

    // LIKE wildcards in the search text are literal
    let underscore = service
        .list(&user, &InvoiceFilter { search: Some("_".to_string()), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(underscore.total, 1);

    let sent = service
        .list(&user, &InvoiceFilter { status: Some(InvoiceStatus::Sent), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(sent.total, 1);
    assert!(sent.invoices[0].sent_date.is_some());

    service.delete(&second.id).await.unwrap();
    let err = service.get_by_id(&second.id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);

    // Deleted invoices keep their number
    let third = service
        .create_next(&user, invoice_form("Initech", vec![line("Work", dec!(1), dec!(10))]))
        .await
        .unwrap();
    assert_eq!(third.invoice_number, "INV-2024-0003");

    let err = service
        .create(&user, "INV-2024-0003", invoice_form("Dup", vec![line("Work", dec!(1), dec!(1))]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_clients_and_profiles() {
    let pool = create_test_pool().await;
    let clients = ClientService::new(Arc::new(MySqlClientRepository::new(pool.clone())), clock());
    let profiles = ProfileService::new(
        Arc::new(MySqlProfileRepository::new(pool.clone())),
        clock(),
        test_defaults(),
    );
    let user = unique_user();

    let client = clients.create(&user, ClientForm::new("Acme Corp")).await.unwrap();
    let reused = clients.get_or_create(&user, ClientForm::new("Acme Corp")).await.unwrap();
    assert_eq!(client.id, reused.id);

    let page = clients.list(&user, &ClientFilter::default()).await.unwrap();
    assert_eq!(page.total, 1);

    profiles
        .update(
            &user,
            ProfileForm {
                default_payment_terms: 14,
                default_tax_rate: dec!(7.5),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let profile = profiles.get_by_user_id(&user).await.unwrap().unwrap();
    assert_eq!(profile.default_payment_terms, 14);
    assert_eq!(profile.default_tax_rate, dec!(7.5));
}

#[tokio::test]
#[ignore = "Requires test database configuration"]
async fn test_token_authentication() {
    let pool = create_test_pool().await;
    let user = unique_user();
    let token = format!("tok-{}", user);

    sqlx::query("INSERT INTO api_tokens (token_hash, user_id, name) VALUES (?, ?, 'test')")
        .bind(hash_token(&token))
        .bind(&user)
        .execute(&pool)
        .await
        .unwrap();

    let authenticator = MySqlTokenAuthenticator::new(pool.clone());
    assert_eq!(authenticator.authenticate(&token).await.unwrap(), Some(user.clone()));
    assert_eq!(authenticator.authenticate("nope").await.unwrap(), None);

    sqlx::query("UPDATE api_tokens SET revoked_at = NOW() WHERE user_id = ?")
        .bind(&user)
        .execute(&pool)
        .await
        .unwrap();
    assert_eq!(authenticator.authenticate(&token).await.unwrap(), None);
}
