pub use super::admins::Entity as Admins;
pub use super::contact_messages::Entity as ContactMessages;
pub use super::projects::Entity as Projects;
