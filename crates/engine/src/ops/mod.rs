use sea_orm::{ConnectionTrait, DatabaseConnection, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

mod creditors;
mod deposits;
mod orders;
mod representatives;
mod temp_orders;
mod transactions;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Persistence entry point. Holds only the connection pool, so it can be
/// shared between request handlers.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// Resolve an optional representative id into its display name.
///
/// Fails with `KeyNotFound` when the id does not belong to a representative.
async fn representative_name<C: ConnectionTrait>(
    db: &C,
    representative_id: Option<Uuid>,
) -> ResultEngine<Option<String>> {
    let Some(id) = representative_id else {
        return Ok(None);
    };
    let model = crate::representatives::Entity::find()
        .filter(crate::representatives::Column::Id.eq(id.to_string()))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("representative not exists".to_string()))?;
    Ok(Some(model.name))
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
