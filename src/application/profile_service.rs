use crate::application::dto::UpdateProfileRequest;
use crate::domain::entities::PaymentProfile;
use crate::domain::errors::{CheckoutError, CheckoutResult};
use crate::ports::payment_provider::ProviderRegistry;
use crate::ports::ProfileStorePort;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Payment profile management: list, upsert, make-primary, delete.
pub struct ProfileService {
    profiles: Arc<dyn ProfileStorePort>,
    providers: ProviderRegistry,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn ProfileStorePort>, providers: ProviderRegistry) -> Self {
        Self { profiles, providers }
    }

    pub async fn list_profiles(&self, customer_id: Uuid) -> CheckoutResult<Vec<PaymentProfile>> {
        self.profiles.find_by_customer(customer_id).await
    }

    /// Upserts the customer's tokenized profile through the provider.
    pub async fn update_profile(
        &self,
        request: UpdateProfileRequest,
    ) -> CheckoutResult<PaymentProfile> {
        let provider = self.providers.get(&request.provider)?;
        if !provider.supports_payment_profiles() {
            return Err(CheckoutError::Configuration(format!(
                "provider '{}' does not support payment profiles",
                request.provider
            )));
        }

        let customer = self
            .profiles
            .find_customer(request.customer_id)
            .await?
            .ok_or_else(|| CheckoutError::CustomerNotFound(request.customer_id.to_string()))?;

        provider.update_payment_profile(&customer, &request.card).await
    }

    /// Marks a profile primary; the store clears the flag on its siblings.
    pub async fn make_primary(&self, profile_id: Uuid) -> CheckoutResult<()> {
        let profile = self
            .profiles
            .find_by_id(profile_id)
            .await?
            .ok_or_else(|| CheckoutError::ProfileNotFound(profile_id.to_string()))?;

        self.profiles
            .make_primary(profile.id, profile.customer_id)
            .await
    }

    /// Deletes a profile, remote record first. A customer's last profile
    /// cannot be deleted.
    pub async fn delete_profile(&self, profile_id: Uuid) -> CheckoutResult<()> {
        let profile = self
            .profiles
            .find_by_id(profile_id)
            .await?
            .ok_or_else(|| CheckoutError::ProfileNotFound(profile_id.to_string()))?;

        let siblings = self.profiles.find_by_customer(profile.customer_id).await?;
        if siblings.len() <= 1 {
            return Err(CheckoutError::Validation(
                "the last payment profile cannot be deleted".to_string(),
            ));
        }

        let provider = self.providers.get(&profile.vendor_id)?;
        provider.delete_payment_profile(&profile).await?;
        self.profiles.delete(profile.id).await?;

        info!("Payment profile {} deleted", profile.id);
        Ok(())
    }
}
