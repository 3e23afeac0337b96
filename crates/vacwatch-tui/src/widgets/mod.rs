pub mod bars;
pub mod form;
pub mod sub_tabs;
pub mod view_state;
