use crate::domain::value_objects::OwnerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthLifecycleStage {
    SignUp,
    SignIn,
}

/// Emitted by the host once authentication has succeeded.
#[derive(Debug, Clone)]
pub struct AuthLifecycleEvent {
    pub stage: AuthLifecycleStage,
    pub user_id: String,
}

impl AuthLifecycleEvent {
    pub fn new(stage: AuthLifecycleStage, user_id: impl Into<String>) -> Self {
        Self {
            stage,
            user_id: user_id.into(),
        }
    }

    pub fn sign_up(user_id: impl Into<String>) -> Self {
        Self::new(AuthLifecycleStage::SignUp, user_id)
    }

    pub fn sign_in(user_id: impl Into<String>) -> Self {
        Self::new(AuthLifecycleStage::SignIn, user_id)
    }

    pub fn owner(&self) -> Result<OwnerId, String> {
        OwnerId::user(self.user_id.clone())
    }
}
