use crate::{
    error::{AppError, AppResult},
    models::{Product, ProductData, ProductId},
    repository::RepositoryState,
};

/// ProductService
///
/// Applies the catalog's create/read/update/delete semantics on top of the repository and
/// turns absent records into `AppError::NotFound`. It performs no authorization and trusts
/// that `ProductData` has already been validated.
#[derive(Clone)]
pub struct ProductService {
    repo: RepositoryState,
}

impl ProductService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    /// list
    ///
    /// Every product currently stored, ordered by identifier.
    pub async fn list(&self) -> AppResult<Vec<Product>> {
        self.repo.all().await
    }

    /// get
    ///
    /// The product stored under `id`, or `NotFound` when there is none.
    pub async fn get(&self, id: ProductId) -> AppResult<Product> {
        self.repo.find(id).await?.ok_or(AppError::NotFound(id))
    }

    /// create
    ///
    /// Stores `data` under a freshly assigned identifier and returns the stored record.
    pub async fn create(&self, data: ProductData) -> AppResult<Product> {
        let product = self.repo.insert(data).await?;
        tracing::info!(id = product.id, "product created");
        Ok(product)
    }

    /// update
    ///
    /// Replaces every attribute of the product under `id`; the identifier never changes.
    /// Fails with `NotFound`, leaving the catalog untouched, when the product is absent.
    pub async fn update(&self, id: ProductId, data: ProductData) -> AppResult<Product> {
        let product = self
            .repo
            .replace(id, data)
            .await?
            .ok_or(AppError::NotFound(id))?;
        tracing::info!(id, "product updated");
        Ok(product)
    }

    /// delete
    ///
    /// Removes the product under `id`. A second delete of the same id is `NotFound`.
    pub async fn delete(&self, id: ProductId) -> AppResult<()> {
        if !self.repo.remove(id).await? {
            return Err(AppError::NotFound(id));
        }
        tracing::info!(id, "product deleted");
        Ok(())
    }
}
