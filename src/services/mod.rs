pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AdminView, AuthError, AuthService, CredentialStore, LoginResult};
pub use auth_service_impl::DefaultAuthService;

pub mod clock;
pub use clock::{Clock, SystemClock};

pub mod password;
pub use password::PasswordService;

pub mod token;
pub use token::{TokenCodec, TokenIdentity};

pub mod project_service;
pub use project_service::{CreateProject, ProjectDto, ProjectService, TechStack, UpdateProject};

pub mod contact_service;
pub use contact_service::{ContactMessageDto, ContactService, MessageStats, SubmittedContactDto};
