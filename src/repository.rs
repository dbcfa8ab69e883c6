use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{Product, ProductData, ProductId, Role, SubjectId},
};

/// ProductRepository
///
/// The opaque keyed collection holding product records. Implementations must serialize
/// mutations: identifiers are never handed out twice, and update/delete on one identifier
/// apply whole or not at all.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Every record, ordered by identifier.
    async fn all(&self) -> AppResult<Vec<Product>>;
    async fn find(&self, id: ProductId) -> AppResult<Option<Product>>;
    /// Assigns a fresh identifier and stores the record.
    async fn insert(&self, data: ProductData) -> AppResult<Product>;
    /// Replaces all fields of an existing record. `None` when the record is absent.
    async fn replace(&self, id: ProductId, data: ProductData) -> AppResult<Option<Product>>;
    /// Returns `false` when nothing was removed.
    async fn remove(&self, id: ProductId) -> AppResult<bool>;
}

/// RoleRepository
///
/// Read-only source of role grants.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn roles_for(&self, subject: SubjectId) -> AppResult<Vec<Role>>;
}

pub type RepositoryState = Arc<dyn ProductRepository>;
pub type RoleState = Arc<dyn RoleRepository>;

// --- In-Memory Implementation ---

#[derive(Default)]
struct Catalog {
    next_id: ProductId,
    products: BTreeMap<ProductId, Product>,
}

/// InMemoryRepository
///
/// Process-local store used when no database is configured, and by the test suites. The id
/// counter and the records sit behind one lock so assignment and mutation cannot interleave.
#[derive(Default)]
pub struct InMemoryRepository {
    catalog: RwLock<Catalog>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryRepository {
    async fn all(&self) -> AppResult<Vec<Product>> {
        let catalog = self.catalog.read().await;
        Ok(catalog.products.values().cloned().collect())
    }

    async fn find(&self, id: ProductId) -> AppResult<Option<Product>> {
        Ok(self.catalog.read().await.products.get(&id).cloned())
    }

    async fn insert(&self, data: ProductData) -> AppResult<Product> {
        let mut catalog = self.catalog.write().await;
        catalog.next_id += 1;
        let product = Product::from_data(catalog.next_id, data);
        catalog.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn replace(&self, id: ProductId, data: ProductData) -> AppResult<Option<Product>> {
        let mut catalog = self.catalog.write().await;
        Ok(catalog.products.get_mut(&id).map(|slot| {
            *slot = Product::from_data(id, data);
            slot.clone()
        }))
    }

    async fn remove(&self, id: ProductId) -> AppResult<bool> {
        Ok(self.catalog.write().await.products.remove(&id).is_some())
    }
}

/// InMemoryRoleRepository
///
/// Fixed grant table, seeded from configuration at startup.
#[derive(Default)]
pub struct InMemoryRoleRepository {
    grants: HashMap<SubjectId, Vec<Role>>,
}

impl InMemoryRoleRepository {
    pub fn new(grants: HashMap<SubjectId, Vec<Role>>) -> Self {
        Self { grants }
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn roles_for(&self, subject: SubjectId) -> AppResult<Vec<Role>> {
        Ok(self.grants.get(&subject).cloned().unwrap_or_default())
    }
}

// --- Postgres Implementation ---

/// PostgresRepository
///
/// Backs both repositories with the `products` and `roles` tables created by the embedded
/// migrations.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations in `migrations/`.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl ProductRepository for PostgresRepository {
    async fn all(&self) -> AppResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, maker, price, image_url FROM products ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn find(&self, id: ProductId) -> AppResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, maker, price, image_url FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn insert(&self, data: ProductData) -> AppResult<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, maker, price, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, maker, price, image_url
            "#,
        )
        .bind(data.name)
        .bind(data.maker)
        .bind(data.price)
        .bind(data.image_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(product)
    }

    async fn replace(&self, id: ProductId, data: ProductData) -> AppResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, maker = $3, price = $4, image_url = $5
            WHERE id = $1
            RETURNING id, name, maker, price, image_url
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.maker)
        .bind(data.price)
        .bind(data.image_url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn remove(&self, id: ProductId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RoleRepository for PostgresRepository {
    async fn roles_for(&self, subject: SubjectId) -> AppResult<Vec<Role>> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT name FROM roles WHERE user_id = $1 ORDER BY name",
        )
        .bind(subject.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(names.into_iter().map(Role::new).collect())
    }
}
