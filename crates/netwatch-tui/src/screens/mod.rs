//! Screen implementations. The app owns one instance of each and routes
//! events and actions to whichever is active.

pub mod dashboard;
pub mod services;

pub use dashboard::DashboardScreen;
pub use services::ServicesScreen;
