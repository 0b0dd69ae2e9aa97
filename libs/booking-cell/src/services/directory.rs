use std::collections::HashMap;

use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

use payment_cell::ProviderCategory;

/// Looks up a provider's category, the read-only input deciding whether the
/// payment gate applies to a booking.
#[async_trait]
pub trait ProviderDirectory: Send + Sync {
    async fn category(&self, provider_id: Uuid) -> ProviderCategory;
}

/// Directory backed by a fixed map. Unknown providers default to public, so
/// bookings against them are never payment-gated by accident.
#[derive(Debug, Default)]
pub struct StaticProviderDirectory {
    categories: HashMap<Uuid, ProviderCategory>,
}

impl StaticProviderDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, provider_id: Uuid, category: ProviderCategory) -> Self {
        self.categories.insert(provider_id, category);
        self
    }

    /// Parse a comma-separated `provider_id=category` spec. Malformed
    /// entries are logged and dropped.
    pub fn from_spec(spec: &str) -> Self {
        let mut directory = Self::new();
        for entry in spec.split(',').filter(|e| !e.trim().is_empty()) {
            let parsed = entry.split_once('=').and_then(|(id, category)| {
                let id: Uuid = id.trim().parse().ok()?;
                let category: ProviderCategory = category.trim().parse().ok()?;
                Some((id, category))
            });
            match parsed {
                Some((id, category)) => {
                    directory.categories.insert(id, category);
                }
                None => warn!("Ignoring malformed provider category entry: {}", entry),
            }
        }
        directory
    }
}

#[async_trait]
impl ProviderDirectory for StaticProviderDirectory {
    async fn category(&self, provider_id: Uuid) -> ProviderCategory {
        self.categories
            .get(&provider_id)
            .copied()
            .unwrap_or(ProviderCategory::Public)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_providers_default_to_public() {
        let directory = StaticProviderDirectory::new();
        assert_eq!(
            directory.category(Uuid::new_v4()).await,
            ProviderCategory::Public
        );
    }

    #[tokio::test]
    async fn known_categories_are_returned() {
        let provider_id = Uuid::new_v4();
        let directory =
            StaticProviderDirectory::new().with_category(provider_id, ProviderCategory::Private);
        assert_eq!(
            directory.category(provider_id).await,
            ProviderCategory::Private
        );
    }

    #[tokio::test]
    async fn spec_parsing_keeps_valid_entries() {
        let private_id = Uuid::new_v4();
        let public_id = Uuid::new_v4();
        let spec = format!("{}=private, {}=public, not-a-uuid=private", private_id, public_id);

        let directory = StaticProviderDirectory::from_spec(&spec);
        assert_eq!(
            directory.category(private_id).await,
            ProviderCategory::Private
        );
        assert_eq!(directory.category(public_id).await, ProviderCategory::Public);
    }
}
