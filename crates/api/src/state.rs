use std::sync::Arc;

use bedrock_infra::{Environment, Mailer, TaskSupervisor};

use crate::directory::UserDirectory;

/// Shared handles every handler can reach through `Extension<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub env: Environment,
    pub supervisor: TaskSupervisor,
    pub mailer: Mailer,
    pub users: Arc<UserDirectory>,
    /// bcrypt cost override for newly registered passwords; `None` uses
    /// the default cost.
    pub password_cost: Option<u32>,
}

impl AppState {
    pub fn new(env: Environment, mailer: Mailer) -> Self {
        Self {
            env,
            supervisor: TaskSupervisor::new(),
            mailer,
            users: Arc::new(UserDirectory::new()),
            password_cost: None,
        }
    }

    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = Some(cost);
        self
    }
}
