pub mod cards_command;
pub mod draw_command;
pub mod draw_records_admin_command;
