//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod category_repo;
pub mod market_benchmark_repo;
pub mod onboarding_session_repo;
pub mod pricing_profile_repo;
pub mod profile_category_repo;

pub use category_repo::CategoryRepo;
pub use market_benchmark_repo::MarketBenchmarkRepo;
pub use onboarding_session_repo::OnboardingSessionRepo;
pub use pricing_profile_repo::PricingProfileRepo;
pub use profile_category_repo::{ProfileCategoryRepo, SwapOutcome};
