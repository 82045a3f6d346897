// src/services/salary.rs

use crate::{
    errors::AppResult,
    services::bus::{ChangeBus, Topic},
    store::SalaryStore,
    validation::validate_salary,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Reads and writes the per-user salary override, the fallback used when no
/// salary budget line exists.
#[derive(Clone)]
pub struct SalaryService {
    store: Arc<dyn SalaryStore>,
    bus: ChangeBus,
}

impl SalaryService {
    pub fn new(store: Arc<dyn SalaryStore>, bus: ChangeBus) -> Self {
        Self { store, bus }
    }

    pub async fn get(&self, user_id: Uuid) -> AppResult<Option<Decimal>> {
        self.store.get(user_id).await
    }

    pub async fn set(&self, user_id: Uuid, monthly_salary: Decimal) -> AppResult<Decimal> {
        validate_salary(monthly_salary)?;
        self.store.set(user_id, monthly_salary).await?;
        info!("💵 Salary override for user {} set to {}", user_id, monthly_salary);
        self.bus.publish(user_id, Topic::SalaryChanged);
        Ok(monthly_salary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::AppError, store::MemoryStore};
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let service = SalaryService::new(Arc::new(MemoryStore::new()), ChangeBus::new());
        let user = Uuid::new_v4();

        assert_eq!(service.get(user).await.unwrap(), None);
        service.set(user, dec!(65000)).await.unwrap();
        assert_eq!(service.get(user).await.unwrap(), Some(dec!(65000)));
    }

    #[tokio::test]
    async fn negative_salary_is_rejected_without_event() {
        let bus = ChangeBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        bus.subscribe(Topic::SalaryChanged, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let service = SalaryService::new(Arc::new(MemoryStore::new()), bus);
        let user = Uuid::new_v4();

        let err = service.set(user, dec!(-100)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(service.get(user).await.unwrap(), None);

        service.set(user, dec!(0)).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
