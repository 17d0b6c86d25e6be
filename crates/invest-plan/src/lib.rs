//! Investment plan generation
//!
//! A plan is built in three steps: the model drafts an allocation across
//! asset classes as JSON, each category is handed to a [`CategoryProcessor`]
//! for concrete instruments, and the model writes the detailed plan from
//! both. [`InvestmentPlanner::update_plan`] revises an existing plan.

pub mod catalog;
pub mod category;
pub mod error;
pub mod planner;
pub mod profile;

pub use catalog::{CategoryProcessor, StaticCatalog};
pub use category::{AssetClass, Criteria, DraftPlan, InvestmentCategory, strip_code_fence};
pub use error::{PlanError, Result};
pub use planner::{InvestmentPlanner, PlanSettings, ProcessedCategories};
pub use profile::{CustomerProfile, NOT_PROVIDED};
