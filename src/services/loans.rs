// src/services/loans.rs
//
// Loan and EMI editors. Both collections feed the same summary inputs and
// share the `loans-or-emis-changed` topic.

use crate::{
    errors::AppResult,
    models::{
        CreateEmiRequest, CreateLoanRequest, Emi, Loan, UpdateEmiRequest, UpdateLoanRequest,
    },
    services::bus::{ChangeBus, Topic},
    store::{EmiStore, LoanStore},
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct LoanService {
    store: Arc<dyn LoanStore>,
    bus: ChangeBus,
}

impl LoanService {
    pub fn new(store: Arc<dyn LoanStore>, bus: ChangeBus) -> Self {
        Self { store, bus }
    }

    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<Loan>> {
        self.store.list(user_id).await
    }

    pub async fn create(&self, user_id: Uuid, fields: CreateLoanRequest) -> AppResult<Loan> {
        let loan = self.store.create(user_id, fields).await?;
        info!(
            "🏦 Loan {} '{}' added: {} over {} months",
            loan.id, loan.loan_name, loan.total_loan_amount, loan.loan_term_months
        );
        self.bus.publish(user_id, Topic::LoansOrEmisChanged);
        Ok(loan)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: UpdateLoanRequest,
    ) -> AppResult<Loan> {
        let loan = self.store.update(user_id, id, patch).await?;
        info!("🏦 Loan {} updated", loan.id);
        self.bus.publish(user_id, Topic::LoansOrEmisChanged);
        Ok(loan)
    }

    /// Linked EMIs survive the delete with their loan reference cleared.
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        self.store.delete(user_id, id).await?;
        info!("🗑️ Loan {} deleted", id);
        self.bus.publish(user_id, Topic::LoansOrEmisChanged);
        Ok(())
    }
}

#[derive(Clone)]
pub struct EmiService {
    store: Arc<dyn EmiStore>,
    bus: ChangeBus,
}

impl EmiService {
    pub fn new(store: Arc<dyn EmiStore>, bus: ChangeBus) -> Self {
        Self { store, bus }
    }

    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<Emi>> {
        self.store.list(user_id).await
    }

    pub async fn create(&self, user_id: Uuid, fields: CreateEmiRequest) -> AppResult<Emi> {
        let emi = self.store.create(user_id, fields).await?;
        match emi.loan_id {
            Some(loan_id) => info!("📅 EMI {} added against loan {}", emi.id, loan_id),
            None => info!("📅 Standalone EMI {} added", emi.id),
        }
        self.bus.publish(user_id, Topic::LoansOrEmisChanged);
        Ok(emi)
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, patch: UpdateEmiRequest) -> AppResult<Emi> {
        let emi = self.store.update(user_id, id, patch).await?;
        info!("📅 EMI {} updated", emi.id);
        self.bus.publish(user_id, Topic::LoansOrEmisChanged);
        Ok(emi)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        self.store.delete(user_id, id).await?;
        info!("🗑️ EMI {} deleted", id);
        self.bus.publish(user_id, Topic::LoansOrEmisChanged);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::AppError, store::MemoryStore};
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn services() -> (LoanService, EmiService, Arc<AtomicUsize>) {
        let store = Arc::new(MemoryStore::new());
        let bus = ChangeBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        bus.subscribe(Topic::LoansOrEmisChanged, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (
            LoanService::new(store.clone(), bus.clone()),
            EmiService::new(store, bus),
            hits,
        )
    }

    fn home_loan() -> CreateLoanRequest {
        CreateLoanRequest {
            loan_name: "Home Loan".into(),
            total_loan_amount: dec!(2500000),
            interest_rate: Some(dec!(8.4)),
            loan_term_months: 240,
            monthly_payment_calculated: dec!(21500),
            paid_months: 12,
            start_date: None,
            lender_name: Some("HDFC".into()),
        }
    }

    fn phone_emi(loan_id: Option<Uuid>) -> CreateEmiRequest {
        CreateEmiRequest {
            loan_id,
            emi_description: "Phone".into(),
            total_emi_amount: Some(dec!(60000)),
            monthly_emi_payment: dec!(5000),
            number_of_installments: 12,
            paid_installments: 0,
            emi_start_date: None,
        }
    }

    #[tokio::test]
    async fn loan_and_emi_writes_share_a_topic() {
        let (loans, emis, hits) = services();
        let user = Uuid::new_v4();

        let loan = loans.create(user, home_loan()).await.unwrap();
        emis.create(user, phone_emi(Some(loan.id))).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        loans.delete(user, loan.id).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 3);

        let remaining = emis.list(user).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].loan_id, None);
    }

    #[tokio::test]
    async fn emi_against_foreign_loan_is_rejected_silently() {
        let (loans, emis, hits) = services();
        let owner = Uuid::new_v4();
        let loan = loans.create(owner, home_loan()).await.unwrap();
        let before = hits.load(Ordering::SeqCst);

        let err = emis
            .create(Uuid::new_v4(), phone_emi(Some(loan.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(hits.load(Ordering::SeqCst), before);
    }

    #[tokio::test]
    async fn relinking_to_foreign_loan_changes_nothing() {
        let (loans, emis, hits) = services();
        let user = Uuid::new_v4();
        let own = loans.create(user, home_loan()).await.unwrap();
        let foreign = loans.create(Uuid::new_v4(), home_loan()).await.unwrap();
        let emi = emis.create(user, phone_emi(Some(own.id))).await.unwrap();
        let before = hits.load(Ordering::SeqCst);

        for target in [foreign.id, Uuid::new_v4()] {
            let patch = UpdateEmiRequest {
                loan_id: Some(Some(target)),
                ..Default::default()
            };
            let err = emis.update(user, emi.id, patch).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }

        assert_eq!(hits.load(Ordering::SeqCst), before);
        assert_eq!(emis.list(user).await.unwrap()[0].loan_id, Some(own.id));
    }

    #[tokio::test]
    async fn clearing_loan_link_via_update() {
        let (loans, emis, _) = services();
        let user = Uuid::new_v4();
        let loan = loans.create(user, home_loan()).await.unwrap();
        let emi = emis.create(user, phone_emi(Some(loan.id))).await.unwrap();

        let patch = UpdateEmiRequest {
            loan_id: Some(None),
            ..Default::default()
        };
        let updated = emis.update(user, emi.id, patch).await.unwrap();
        assert_eq!(updated.loan_id, None);
        assert_eq!(updated.emi_description, "Phone");
    }
}
