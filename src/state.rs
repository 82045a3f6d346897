// src/state.rs

use crate::{
    config::Config,
    services::{
        budget::BudgetService,
        bus::ChangeBus,
        live::SummaryBoard,
        loans::{EmiService, LoanService},
        salary::SalaryService,
        summary::SummaryEngine,
    },
    store::Stores,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub bus: ChangeBus,
    pub budgets: BudgetService,
    pub loans: LoanService,
    pub emis: EmiService,
    pub salary: SalaryService,
    pub summaries: SummaryEngine,
    pub live: Arc<SummaryBoard>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(stores: Stores, config: Config) -> Self {
        let bus = ChangeBus::new();
        let summaries = SummaryEngine::new(stores.clone());

        Self {
            budgets: BudgetService::new(stores.budgets.clone(), bus.clone()),
            loans: LoanService::new(stores.loans.clone(), bus.clone()),
            emis: EmiService::new(stores.emis.clone(), bus.clone()),
            salary: SalaryService::new(stores.salaries.clone(), bus.clone()),
            live: Arc::new(SummaryBoard::new(summaries.clone(), bus.clone())),
            summaries,
            bus,
            stores,
            config: Arc::new(config),
        }
    }
}
