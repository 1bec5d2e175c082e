pub mod attendance;
pub mod auth;
pub mod classes;
pub mod dashboards;
pub mod notifications;
pub mod password_reset;
pub mod reports;
pub mod students;
pub mod users;
