mod common;

use checkout_rs::application::UpdateProfileRequest;
use checkout_rs::domain::entities::{Order, PaymentProfile, ProfileTokens};
use checkout_rs::domain::errors::CheckoutError;
use checkout_rs::domain::value_objects::{CardBrand, PaymentState};
use checkout_rs::ports::{PaymentProvider, ProfileStorePort};
use common::*;
use serde_json::json;
use uuid::Uuid;

fn update_request(customer_id: Uuid) -> UpdateProfileRequest {
    UpdateProfileRequest {
        customer_id,
        provider: "card".to_string(),
        card: valid_card(),
    }
}

#[tokio::test]
async fn first_profile_is_created_and_becomes_primary() {
    let app = test_app();
    let customer = test_customer();
    app.profiles.insert_customer(customer.clone()).await;

    app.gateway
        .script_create_customer(Reply::Ok(approved("cus_1")))
        .await;
    app.gateway
        .script_create_card(Reply::Ok(approved("card_1")))
        .await;

    let profile = app
        .profile_service
        .update_profile(update_request(customer.id))
        .await
        .unwrap();

    assert!(profile.is_primary);
    assert_eq!(profile.tokens.customer_token.as_deref(), Some("cus_1"));
    assert_eq!(profile.tokens.card_token.as_deref(), Some("card_1"));
    assert_eq!(profile.card_last4, "4242");
    assert_eq!(profile.card_brand, Some(CardBrand::Visa));

    let stored = app
        .profiles
        .find_for_vendor(customer.id, "card")
        .await
        .unwrap()
        .expect("profile persisted");
    assert!(stored.is_primary);
}

#[tokio::test]
async fn later_profile_is_not_primary() {
    let app = test_app();
    let customer = test_customer();
    app.profiles.insert_customer(customer.clone()).await;

    // An earlier profile from another provider already holds primary.
    let mut earlier = PaymentProfile::new(customer.id, "legacy");
    earlier.is_primary = true;
    app.profiles.save(&earlier).await.unwrap();

    app.gateway
        .script_create_customer(Reply::Ok(approved("cus_1")))
        .await;
    app.gateway
        .script_create_card(Reply::Ok(approved("card_1")))
        .await;

    let profile = app
        .profile_service
        .update_profile(update_request(customer.id))
        .await
        .unwrap();

    assert!(!profile.is_primary);
    let earlier = app.profiles.find_by_id(earlier.id).await.unwrap().unwrap();
    assert!(earlier.is_primary);
}

#[tokio::test]
async fn refresh_keeps_live_remote_tokens() {
    let app = test_app();
    let customer = test_customer();
    app.profiles.insert_customer(customer.clone()).await;

    let mut existing = PaymentProfile::new(customer.id, "card");
    existing.is_primary = true;
    existing.set_profile_data(
        ProfileTokens {
            customer_token: Some("cus_1".to_string()),
            card_token: Some("card_1".to_string()),
        },
        "5555555555554444",
    );
    app.profiles.save(&existing).await.unwrap();

    app.gateway
        .script_fetch_customer(Reply::Ok(approved("cus_1")))
        .await;
    app.gateway
        .script_update_card(Reply::Ok(approved("card_1")))
        .await;

    let profile = app
        .profile_service
        .update_profile(update_request(customer.id))
        .await
        .unwrap();

    assert_eq!(profile.id, existing.id);
    assert_eq!(profile.tokens.customer_token.as_deref(), Some("cus_1"));
    assert_eq!(profile.tokens.card_token.as_deref(), Some("card_1"));
    // Card metadata follows the new input.
    assert_eq!(profile.card_last4, "4242");
    assert_eq!(profile.card_brand, Some(CardBrand::Visa));
}

#[tokio::test]
async fn deleted_remote_customer_is_recreated() {
    let app = test_app();
    let customer = test_customer();
    app.profiles.insert_customer(customer.clone()).await;

    let mut existing = PaymentProfile::new(customer.id, "card");
    existing.set_profile_data(
        ProfileTokens {
            customer_token: Some("cus_old".to_string()),
            card_token: Some("card_old".to_string()),
        },
        "4242424242424242",
    );
    app.profiles.save(&existing).await.unwrap();

    app.gateway
        .script_fetch_customer(Reply::Ok(checkout_rs::ports::gateway_port::GatewayResponse {
            successful: true,
            data: json!({ "id": "cus_old", "deleted": true }),
        }))
        .await;
    app.gateway
        .script_create_customer(Reply::Ok(approved("cus_new")))
        .await;
    // The old card token belongs to the old customer record.
    app.gateway
        .script_update_card(Reply::Ok(declined("no such card")))
        .await;
    app.gateway
        .script_create_card(Reply::Ok(approved("card_new")))
        .await;

    let profile = app
        .profile_service
        .update_profile(update_request(customer.id))
        .await
        .unwrap();

    assert_eq!(profile.tokens.customer_token.as_deref(), Some("cus_new"));
    assert_eq!(profile.tokens.card_token.as_deref(), Some("card_new"));
}

#[tokio::test]
async fn rejected_card_update_falls_back_to_creation() {
    let app = test_app();
    let customer = test_customer();
    app.profiles.insert_customer(customer.clone()).await;

    let mut existing = PaymentProfile::new(customer.id, "card");
    existing.set_profile_data(
        ProfileTokens {
            customer_token: Some("cus_1".to_string()),
            card_token: Some("card_old".to_string()),
        },
        "4242424242424242",
    );
    app.profiles.save(&existing).await.unwrap();

    app.gateway
        .script_fetch_customer(Reply::Ok(approved("cus_1")))
        .await;
    app.gateway
        .script_update_card(Reply::Ok(declined("card token expired")))
        .await;
    app.gateway
        .script_create_card(Reply::Ok(approved("card_new")))
        .await;

    let profile = app
        .profile_service
        .update_profile(update_request(customer.id))
        .await
        .unwrap();

    assert_eq!(profile.tokens.card_token.as_deref(), Some("card_new"));
}

#[tokio::test]
async fn gateway_rejection_is_fatal_for_profile_management() {
    let app = test_app();
    let customer = test_customer();
    app.profiles.insert_customer(customer.clone()).await;

    app.gateway
        .script_create_customer(Reply::Ok(declined("account suspended")))
        .await;

    let err = app
        .profile_service
        .update_profile(update_request(customer.id))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::GatewayRejection(_)));
    assert!(app
        .profiles
        .find_for_vendor(customer.id, "card")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn unknown_customer_is_rejected() {
    let app = test_app();

    let err = app
        .profile_service
        .update_profile(update_request(Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::CustomerNotFound(_)));
}

#[tokio::test]
async fn make_primary_clears_the_flag_on_siblings() {
    let app = test_app();
    let customer_id = Uuid::new_v4();

    let mut first = PaymentProfile::new(customer_id, "card");
    first.is_primary = true;
    let second = PaymentProfile::new(customer_id, "legacy");
    app.profiles.save(&first).await.unwrap();
    app.profiles.save(&second).await.unwrap();

    app.profile_service.make_primary(second.id).await.unwrap();

    let first = app.profiles.find_by_id(first.id).await.unwrap().unwrap();
    let second = app.profiles.find_by_id(second.id).await.unwrap().unwrap();
    assert!(!first.is_primary);
    assert!(second.is_primary);
}

#[tokio::test]
async fn the_last_profile_cannot_be_deleted() {
    let app = test_app();
    let customer_id = Uuid::new_v4();

    let profile = PaymentProfile::new(customer_id, "card");
    app.profiles.save(&profile).await.unwrap();

    let err = app
        .profile_service
        .delete_profile(profile.id)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::Validation(_)));
    assert!(app.profiles.find_by_id(profile.id).await.unwrap().is_some());
}

#[tokio::test]
async fn deleting_a_profile_removes_the_remote_record_first() {
    let app = test_app();
    let customer_id = Uuid::new_v4();

    let mut doomed = PaymentProfile::new(customer_id, "card");
    doomed.set_profile_data(
        ProfileTokens {
            customer_token: Some("cus_1".to_string()),
            card_token: Some("card_1".to_string()),
        },
        "4242424242424242",
    );
    let sibling = PaymentProfile::new(customer_id, "card");
    app.profiles.save(&doomed).await.unwrap();
    app.profiles.save(&sibling).await.unwrap();

    app.gateway
        .script_delete_customer(Reply::Ok(approved("cus_1")))
        .await;

    app.profile_service.delete_profile(doomed.id).await.unwrap();

    assert!(app.profiles.find_by_id(doomed.id).await.unwrap().is_none());
    assert!(app.profiles.find_by_id(sibling.id).await.unwrap().is_some());
}

#[tokio::test]
async fn remote_delete_rejection_keeps_the_local_profile() {
    let app = test_app();
    let customer_id = Uuid::new_v4();

    let mut doomed = PaymentProfile::new(customer_id, "card");
    doomed.set_profile_data(
        ProfileTokens {
            customer_token: Some("cus_1".to_string()),
            card_token: Some("card_1".to_string()),
        },
        "4242424242424242",
    );
    let sibling = PaymentProfile::new(customer_id, "card");
    app.profiles.save(&doomed).await.unwrap();
    app.profiles.save(&sibling).await.unwrap();

    app.gateway
        .script_delete_customer(Reply::Ok(declined("cannot delete")))
        .await;

    let err = app
        .profile_service
        .delete_profile(doomed.id)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::GatewayRejection(_)));
    assert!(app.profiles.find_by_id(doomed.id).await.unwrap().is_some());
}

#[tokio::test]
async fn deleting_a_tokenless_profile_skips_the_gateway() {
    let app = test_app();
    let profile = PaymentProfile::new(Uuid::new_v4(), "card");

    // No delete_customer scripted: a gateway call would panic.
    app.provider.delete_payment_profile(&profile).await.unwrap();
}

#[tokio::test]
async fn paying_from_a_tokenless_profile_is_fatal_and_leaves_the_order_alone() {
    let app = test_app();
    let cart = checkout_ready_cart(Uuid::new_v4());
    let mut order = Order::from_cart(&cart).unwrap();
    let profile = PaymentProfile::new(order.customer_id, "card");

    let err = app
        .provider
        .pay_from_profile(&mut order, &profile)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::Integrity(_)));
    assert_eq!(order.payment_state, PaymentState::Pending);
    assert!(app.gateway.purchases_seen().await.is_empty());
    assert!(app.payment_log.entries().await.is_empty());
}
