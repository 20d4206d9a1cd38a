//! Terminal UI components: sidebar, terminal pane, modals, and widgets.

pub mod help_menu;
pub mod layout;
pub mod modal;
pub mod sidebar;
pub mod terminal_pane;
pub mod toast;
pub mod toast_widget;

pub use help_menu::HelpMenuWidget;
pub use toast::{Toast, ToastManager, ToastType};
pub use toast_widget::ToastWidget;
