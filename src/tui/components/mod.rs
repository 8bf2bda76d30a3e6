// Components module - reusable UI building blocks
//
// Shell components are rendered around every list:
// - Title bar: app name and entity tabs
// - Status bar: backend, load state, key hints
// - Logs panel: tail of the in-memory log buffer
// - Toast: transient notices and errors

pub mod logs_panel;
pub mod status_bar;
pub mod title_bar;
pub mod toast;

pub use toast::Toast;
