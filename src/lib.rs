pub mod alert;
pub mod config;
pub mod dialog;
pub mod error;
pub mod events;
pub mod modal;
pub mod models;
pub mod popup;
pub mod rest; // reqwest-backed services
pub mod services;

// Re-export commonly used items for the binary / external users
pub use dialog::{DialogServices, PersonDialog};
pub use popup::{OpenedDialog, PersonPopup, PersonPopupService, RouteParams};
