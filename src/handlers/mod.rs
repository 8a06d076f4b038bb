// One module per resource. Gating is applied to route groups in `api`,
// so nothing in here checks sessions itself.
pub mod auth;
pub mod clients;
pub mod contacts;
pub mod projects;
pub mod subscribers;
pub mod system;
