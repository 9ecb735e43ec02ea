use crate::domain::entities::{Customer, PaymentProfile, ProfileTokens};
use crate::domain::errors::{CheckoutError, CheckoutResult};
use crate::domain::value_objects::CardBrand;
use crate::infrastructure::crypto::SecretSealer;
use crate::ports::profile_store_port::ProfileStorePort;
use async_trait::async_trait;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// MySQL customer/profile store. Profile tokens are sealed with
/// AES-256-GCM before they touch the database, so the stored blob is
/// opaque ciphertext outside this process.
#[derive(Clone)]
pub struct MySqlProfileStore {
    pool: Arc<Pool<MySql>>,
    sealer: SecretSealer,
}

impl MySqlProfileStore {
    pub fn new(pool: Arc<Pool<MySql>>, sealer: SecretSealer) -> Self {
        Self { pool, sealer }
    }

    fn seal_tokens(&self, tokens: &ProfileTokens) -> CheckoutResult<String> {
        let plaintext = serde_json::to_vec(tokens)?;
        self.sealer.seal(&plaintext)
    }

    fn open_tokens(&self, sealed: &str) -> CheckoutResult<ProfileTokens> {
        let plaintext = self.sealer.open(sealed)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }
}

#[async_trait]
impl ProfileStorePort for MySqlProfileStore {
    async fn find_customer(&self, customer_id: Uuid) -> CheckoutResult<Option<Customer>> {
        let query = "SELECT id, name, email FROM customers WHERE id = ?";

        let result = sqlx::query_as::<_, CustomerRow>(query)
            .bind(customer_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(result.map(|row| Customer {
            id: row.id,
            name: row.name,
            email: row.email,
        }))
    }

    async fn find_by_id(&self, id: Uuid) -> CheckoutResult<Option<PaymentProfile>> {
        let result = sqlx::query_as::<_, ProfileRow>(&select_profiles("WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        result.map(|row| row.into_profile(self)).transpose()
    }

    async fn find_by_customer(&self, customer_id: Uuid) -> CheckoutResult<Vec<PaymentProfile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(&select_profiles(
            "WHERE customer_id = ? ORDER BY created_at",
        ))
        .bind(customer_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(|row| row.into_profile(self)).collect()
    }

    async fn find_for_vendor(
        &self,
        customer_id: Uuid,
        vendor_id: &str,
    ) -> CheckoutResult<Option<PaymentProfile>> {
        let result = sqlx::query_as::<_, ProfileRow>(&select_profiles(
            "WHERE customer_id = ? AND vendor_id = ?",
        ))
        .bind(customer_id)
        .bind(vendor_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        result.map(|row| row.into_profile(self)).transpose()
    }

    async fn save(&self, profile: &PaymentProfile) -> CheckoutResult<()> {
        let query = r#"
            INSERT INTO payment_profiles (
                id, customer_id, vendor_id, profile_data,
                card_brand, card_expiry_month, card_expiry_year, card_last4,
                is_primary, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(profile.id)
            .bind(profile.customer_id)
            .bind(&profile.vendor_id)
            .bind(self.seal_tokens(&profile.tokens)?)
            .bind(profile.card_brand.map(|b| b.to_string()))
            .bind(profile.card_expiry_month)
            .bind(profile.card_expiry_year)
            .bind(&profile.card_last4)
            .bind(profile.is_primary)
            .bind(profile.created_at)
            .bind(profile.updated_at)
            .execute(self.pool.as_ref())
            .await?;

        debug!("Payment profile saved: {}", profile.id);
        Ok(())
    }

    async fn update(&self, profile: &PaymentProfile) -> CheckoutResult<()> {
        let query = r#"
            UPDATE payment_profiles
            SET profile_data = ?, card_brand = ?, card_expiry_month = ?,
                card_expiry_year = ?, card_last4 = ?, is_primary = ?, updated_at = ?
            WHERE id = ?
        "#;

        let rows_affected = sqlx::query(query)
            .bind(self.seal_tokens(&profile.tokens)?)
            .bind(profile.card_brand.map(|b| b.to_string()))
            .bind(profile.card_expiry_month)
            .bind(profile.card_expiry_year)
            .bind(&profile.card_last4)
            .bind(profile.is_primary)
            .bind(profile.updated_at)
            .bind(profile.id)
            .execute(self.pool.as_ref())
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(CheckoutError::ProfileNotFound(profile.id.to_string()));
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> CheckoutResult<()> {
        let rows_affected = sqlx::query("DELETE FROM payment_profiles WHERE id = ?")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(CheckoutError::ProfileNotFound(id.to_string()));
        }

        debug!("Payment profile deleted: {}", id);
        Ok(())
    }

    async fn make_primary(&self, id: Uuid, customer_id: Uuid) -> CheckoutResult<()> {
        // Both updates run in one transaction so the single-primary
        // invariant holds even if we crash between them.
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE payment_profiles SET is_primary = TRUE WHERE id = ? AND customer_id = ?")
            .bind(id)
            .bind(customer_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE payment_profiles SET is_primary = FALSE WHERE id <> ? AND customer_id = ?")
            .bind(id)
            .bind(customer_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn select_profiles(clause: &str) -> String {
    format!(
        r#"
        SELECT id, customer_id, vendor_id, profile_data,
               card_brand, card_expiry_month, card_expiry_year, card_last4,
               is_primary, created_at, updated_at
        FROM payment_profiles
        {clause}
    "#
    )
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: Uuid,
    name: String,
    email: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    customer_id: Uuid,
    vendor_id: String,
    profile_data: String,
    card_brand: Option<String>,
    card_expiry_month: Option<u32>,
    card_expiry_year: Option<i32>,
    card_last4: String,
    is_primary: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl ProfileRow {
    fn into_profile(self, store: &MySqlProfileStore) -> CheckoutResult<PaymentProfile> {
        let tokens = store.open_tokens(&self.profile_data)?;

        let card_brand = self.card_brand.as_deref().map(|value| match value {
            "visa" => CardBrand::Visa,
            "mastercard" => CardBrand::Mastercard,
            "amex" => CardBrand::Amex,
            _ => CardBrand::Other,
        });

        Ok(PaymentProfile {
            id: self.id,
            customer_id: self.customer_id,
            vendor_id: self.vendor_id,
            tokens,
            card_brand,
            card_expiry_month: self.card_expiry_month,
            card_expiry_year: self.card_expiry_year,
            card_last4: self.card_last4,
            is_primary: self.is_primary,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
