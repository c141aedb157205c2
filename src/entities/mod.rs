pub mod prelude;

pub mod admins;
pub mod contact_messages;
pub mod projects;
