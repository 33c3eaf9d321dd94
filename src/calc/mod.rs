pub mod bonuses;
pub mod orchestrator;
pub mod service;

pub use bonuses::{aggregate, totals, BonusTotals};
pub use orchestrator::{CalculationOrchestrator, Comparison, Evaluation};
pub use service::{
    BestInSlotResponse, CalculationResult, CalculationServiceError, Calculator, HttpCalculator,
};
