use std::sync::Arc;

use tracing::{debug, info};

use crate::core::{Clock, Result};
use crate::modules::invoices::models::InvoiceDefaults;
use crate::modules::invoices::services::status::calculate_due_date;
use crate::modules::profiles::models::{NewInvoiceDefaults, Profile, ProfileForm};
use crate::modules::profiles::repositories::ProfileRepository;

pub struct ProfileService {
    repository: Arc<dyn ProfileRepository>,
    clock: Arc<dyn Clock>,
    defaults: InvoiceDefaults,
}

impl ProfileService {
    pub fn new(
        repository: Arc<dyn ProfileRepository>,
        clock: Arc<dyn Clock>,
        defaults: InvoiceDefaults,
    ) -> Self {
        Self {
            repository,
            clock,
            defaults,
        }
    }

    pub async fn get_by_user_id(&self, user_id: &str) -> Result<Option<Profile>> {
        self.repository.find_by_user_id(user_id).await
    }

    /// Existing profile, or a new one seeded from the configured defaults
    pub async fn get_or_create(&self, user_id: &str) -> Result<Profile> {
        if let Some(profile) = self.repository.find_by_user_id(user_id).await? {
            return Ok(profile);
        }

        let profile = Profile::new_default(user_id, &self.defaults, self.clock.now());
        let created = self.repository.upsert(&profile).await?;
        debug!(user_id = %user_id, "Profile created with defaults");

        Ok(created)
    }

    pub async fn update(&self, user_id: &str, form: ProfileForm) -> Result<Profile> {
        form.validate()?;

        let mut profile = self.get_or_create(user_id).await?;
        profile.apply_form(form);
        profile.updated_at = self.clock.now();

        let saved = self.repository.upsert(&profile).await?;
        info!(user_id = %user_id, "Profile updated");

        Ok(saved)
    }

    /// Defaults for composing a new invoice today
    pub async fn invoice_defaults(&self, user_id: &str) -> Result<NewInvoiceDefaults> {
        let profile = self.get_or_create(user_id).await?;
        let issue_date = self.clock.today();

        Ok(NewInvoiceDefaults {
            due_date: calculate_due_date(issue_date, profile.default_payment_terms),
            currency: profile.default_currency,
            payment_terms: profile.default_payment_terms,
            tax_rate: profile.default_tax_rate,
            notes: profile.default_notes,
            payment_instructions: profile.default_payment_instructions,
            issue_date,
        })
    }
}
