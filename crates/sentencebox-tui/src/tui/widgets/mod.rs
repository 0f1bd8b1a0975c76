// TUI widget modules, one per screen zone or overlay.

pub mod card_list;
pub mod confirm;
pub mod dialog;
pub mod group_tabs;
pub mod merit;
pub mod status_bar;
pub mod toast;
