use crate::{
    models::{Role, SubjectId},
    repository::RoleState,
};

/// AuthorizationService
///
/// Resolves the roles granted to a subject. Lookup only; role assignment happens elsewhere.
#[derive(Clone)]
pub struct AuthorizationService {
    roles: RoleState,
}

impl AuthorizationService {
    pub fn new(roles: RoleState) -> Self {
        Self { roles }
    }

    /// Roles granted to `subject`. A subject without grants, or a failed lookup, yields an
    /// empty collection.
    pub async fn roles_for(&self, subject: SubjectId) -> Vec<Role> {
        self.roles.roles_for(subject).await.unwrap_or_else(|e| {
            tracing::error!(%subject, error = %e, "role lookup failed");
            Vec::new()
        })
    }

    pub async fn has_role(&self, subject: SubjectId, role: &str) -> bool {
        self.roles_for(subject)
            .await
            .iter()
            .any(|granted| granted.name() == role)
    }
}
