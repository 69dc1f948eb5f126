pub mod manager;
pub mod state;
pub mod theme;

// Re-export from the submodules so we can do "use crate::session::*;"
pub use manager::SessionManager;
pub use state::Session;
pub use theme::{load_theme, save_theme, toggle_theme, ThemeMode};
