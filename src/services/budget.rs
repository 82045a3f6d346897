// src/services/budget.rs

use crate::{
    errors::AppResult,
    models::{BudgetItem, CreateBudgetItemRequest, UpdateBudgetItemRequest},
    services::bus::{ChangeBus, Topic},
    store::BudgetStore,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Budget line editor. Every confirmed write is announced on the bus as
/// `budget-items-changed`; failed writes announce nothing.
#[derive(Clone)]
pub struct BudgetService {
    store: Arc<dyn BudgetStore>,
    bus: ChangeBus,
}

impl BudgetService {
    pub fn new(store: Arc<dyn BudgetStore>, bus: ChangeBus) -> Self {
        Self { store, bus }
    }

    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<BudgetItem>> {
        self.store.list(user_id).await
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        fields: CreateBudgetItemRequest,
    ) -> AppResult<BudgetItem> {
        let item = self.store.create(user_id, fields).await?;
        info!(
            "💰 Budget item {} '{}' added for {}",
            item.id, item.item_name, item.month_year
        );
        self.bus.publish(user_id, Topic::BudgetItemsChanged);
        Ok(item)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: UpdateBudgetItemRequest,
    ) -> AppResult<BudgetItem> {
        let item = self.store.update(user_id, id, patch).await?;
        info!("💰 Budget item {} updated", item.id);
        self.bus.publish(user_id, Topic::BudgetItemsChanged);
        Ok(item)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        self.store.delete(user_id, id).await?;
        info!("🗑️ Budget item {} deleted", id);
        self.bus.publish(user_id, Topic::BudgetItemsChanged);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::AppError, models::BudgetItemType, store::MemoryStore};
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counted_bus() -> (ChangeBus, Arc<AtomicUsize>) {
        let bus = ChangeBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        bus.subscribe(Topic::BudgetItemsChanged, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (bus, hits)
    }

    fn salary_line() -> CreateBudgetItemRequest {
        CreateBudgetItemRequest {
            month_year: "2025-06".into(),
            category: "Salary".into(),
            item_type: BudgetItemType::Income,
            item_name: "Monthly Salary".into(),
            planned_amount: dec!(50000),
            actual_amount: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn each_confirmed_write_publishes_once() {
        let (bus, hits) = counted_bus();
        let service = BudgetService::new(Arc::new(MemoryStore::new()), bus);
        let user = Uuid::new_v4();

        let item = service.create(user, salary_line()).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let patch = UpdateBudgetItemRequest {
            planned_amount: Some(dec!(52000)),
            ..Default::default()
        };
        let updated = service.update(user, item.id, patch).await.unwrap();
        assert_eq!(updated.planned_amount, dec!(52000));
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        service.delete(user, item.id).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert!(service.list(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_write_publishes_nothing() {
        let (bus, hits) = counted_bus();
        let service = BudgetService::new(Arc::new(MemoryStore::new()), bus);
        let user = Uuid::new_v4();

        let mut bad = salary_line();
        bad.planned_amount = dec!(-1);
        let err = service.create(user, bad).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = service.delete(user, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
