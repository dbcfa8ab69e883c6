use std::sync::Arc;

use crate::{
    auth::{Bearer, TokenCodec},
    authz::AuthorizationService,
    error::{AppError, AppResult},
    models::{Product, ProductData, ProductId, SubjectId},
    service::ProductService,
};

/// Operation
///
/// The catalog operations reachable over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

/// Requirement
///
/// What a caller must present before an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Anonymous callers allowed.
    Anyone,
    /// A verifiable token, any role.
    Authenticated,
    /// A verifiable token whose subject holds the named role.
    Role(&'static str),
}

impl Operation {
    /// The policy table. Every gated operation is decided here and nowhere else.
    pub const fn requirement(self) -> Requirement {
        match self {
            Operation::List | Operation::Get => Requirement::Anyone,
            Operation::Create => Requirement::Role("USER"),
            Operation::Update | Operation::Delete => Requirement::Authenticated,
        }
    }
}

/// Admission
///
/// Outcome of a passed gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Anonymous,
    Subject(SubjectId),
}

/// RequestGate
///
/// Evaluates the policy of each operation against the caller's bearer token, then delegates
/// to the product service. Built once at startup from its three collaborators.
pub struct RequestGate {
    codec: Arc<TokenCodec>,
    authz: AuthorizationService,
    products: ProductService,
}

pub type GateState = Arc<RequestGate>;

impl RequestGate {
    pub fn new(
        codec: Arc<TokenCodec>,
        authz: AuthorizationService,
        products: ProductService,
    ) -> Self {
        Self {
            codec,
            authz,
            products,
        }
    }

    /// admit
    ///
    /// Runs the gate for `op`: no token and a failed decode both end in `InvalidToken`; a
    /// missing role ends in `Forbidden`. Ungated operations never look at the token.
    pub async fn admit(&self, op: Operation, bearer: &Bearer) -> AppResult<Admission> {
        let role = match op.requirement() {
            Requirement::Anyone => return Ok(Admission::Anonymous),
            Requirement::Authenticated => None,
            Requirement::Role(role) => Some(role),
        };

        let Some(token) = bearer.token() else {
            tracing::debug!(?op, "no bearer token");
            return Err(AppError::InvalidToken);
        };

        let subject = self.codec.decode(token)?;
        tracing::debug!(?op, %subject, "token decoded");

        if let Some(role) = role {
            if !self.authz.has_role(subject, role).await {
                tracing::debug!(?op, %subject, role, "required role missing");
                return Err(AppError::Forbidden);
            }
        }

        Ok(Admission::Subject(subject))
    }

    /// list
    ///
    /// Public listing of the catalog. The bearer is accepted but never inspected.
    pub async fn list(&self, bearer: &Bearer) -> AppResult<Vec<Product>> {
        self.admit(Operation::List, bearer).await?;
        self.products.list().await
    }

    /// get
    ///
    /// Public detail lookup; `NotFound` when `id` is not in the catalog.
    pub async fn get(&self, bearer: &Bearer, id: ProductId) -> AppResult<Product> {
        self.admit(Operation::Get, bearer).await?;
        self.products.get(id).await
    }

    /// create
    ///
    /// Requires a valid token whose subject holds the `USER` role. Nothing is stored unless
    /// the gate admits the request.
    pub async fn create(&self, bearer: &Bearer, data: ProductData) -> AppResult<Product> {
        self.admit(Operation::Create, bearer).await?;
        self.products.create(data).await
    }

    /// update
    ///
    /// Requires a valid token, any role. The token is checked before the record is looked up,
    /// so an anonymous update of a missing id is still `InvalidToken`.
    pub async fn update(
        &self,
        bearer: &Bearer,
        id: ProductId,
        data: ProductData,
    ) -> AppResult<Product> {
        self.admit(Operation::Update, bearer).await?;
        self.products.update(id, data).await
    }

    /// delete
    ///
    /// Requires a valid token, any role. Same ordering as `update`: gate first, then lookup.
    pub async fn delete(&self, bearer: &Bearer, id: ProductId) -> AppResult<()> {
        self.admit(Operation::Delete, bearer).await?;
        self.products.delete(id).await
    }
}
