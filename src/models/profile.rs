#[derive(Debug, Clone)]
pub struct Profile {
    pub id: Option<i64>,
    pub login: String,
    pub created_at: String,
}

impl Profile {
    pub fn new(login: String) -> Self {
        Self {
            id: None,
            login,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.login)
    }
}
