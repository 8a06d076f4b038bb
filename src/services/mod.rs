pub mod auth_service;
pub mod client_service;
pub mod contact_service;
pub mod image_service;
pub mod project_service;
pub mod subscriber_service;
pub mod validation;

pub use auth_service::{
    AuthService, LoginInput, Registrar, RegisterInput, SessionUser, UserUpdateInput,
};
pub use client_service::{ClientInput, ClientService};
pub use contact_service::{ContactInput, ContactService};
pub use image_service::ImageService;
pub use project_service::{ProjectInput, ProjectService};
pub use subscriber_service::{SubscriberInput, SubscriberService};
