//! Services layer - Business logic
//!
//! This module contains all business logic services for the LaserCalc backend.
//! Services are responsible for:
//! - Implementing business rules
//! - Coordinating between repositories and the calculator engine
//! - Handling validation and error cases

pub mod article;
pub mod calculation;
pub mod subscriber;

pub use article::{generate_slug, ArticleService, ArticleServiceError};
pub use calculation::{run_tool, CalculationService, CalculationServiceError, TOOL_TYPES};
pub use subscriber::{SubscriberService, SubscriberServiceError};
