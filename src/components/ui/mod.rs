pub mod alert;
pub mod button;
pub mod card;
pub mod color_picker;
pub mod input;
pub mod label;
pub mod log_view;
pub mod modal;
pub mod progress;
pub mod separator;
pub mod spinner;
pub mod tabs;

// Re-export component symbols so callers can `use crate::components::ui::Button` etc.
pub use alert::*;
pub use button::*;
pub use card::*;
pub use color_picker::*;
pub use input::*;
pub use label::*;
pub use log_view::*;
pub use modal::*;
pub use progress::*;
pub use separator::*;
pub use spinner::*;
pub use tabs::*;
