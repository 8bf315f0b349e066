pub mod models;
pub mod pii;

pub use models::events::{AuthChange, AuthEvent, AuthSession, Identity};
pub use models::search::{FlightDetails, PackageDetails, ResultKind, SearchRequest, SearchResult, SearchType};
pub use models::user::{AuthUser, SignupData, UserRole};
pub use pii::Masked;
