//! Local persistence layer.

pub mod local_store;

pub use local_store::LocalStore;

/// Storage keys as constants.
pub mod keys {
    pub const USER: &str = "session:user";
    /// Kept across logout to prefill the login form
    pub const LAST_PHONE: &str = "session:last_phone";
    pub const LAST_NAME: &str = "session:last_name";
    /// Last role fetched from the agent API (JSON)
    pub const LAST_ROLE: &str = "session:last_role";
}
