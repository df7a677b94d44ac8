/// Shared fixtures for the store test suites
use usermanagement_shared::models::user::UserSummary;
use usermanagement_shared::repository::memory::MemoryDatabase;
use usermanagement_shared::store::{CreateUser, Stores};

#[allow(dead_code)]
pub fn stores() -> (Stores, MemoryDatabase) {
    Stores::in_memory()
}

#[allow(dead_code)]
pub fn new_user(name: &str, email: &str) -> CreateUser {
    CreateUser {
        name: name.to_string(),
        email: email.to_string(),
        password: "secret123".to_string(),
    }
}

#[allow(dead_code)]
pub async fn create_user(stores: &Stores, n: usize) -> UserSummary {
    stores
        .identity
        .create_user(new_user(&format!("user{}", n), &format!("user{}@example.com", n)))
        .await
        .expect("create user")
}
