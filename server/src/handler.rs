use driver::database::PostgresDatabase;
use kernel::KernelError;
use vodca::References;

/// Router state. Services are implemented on the database itself, so routes call
/// them as `module.database().create_borrow(..)`.
#[derive(Clone, References)]
pub struct AppModule {
    database: PostgresDatabase,
}

impl AppModule {
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        let database = PostgresDatabase::new().await?;
        tracing::info!("connected to postgres");
        Ok(Self { database })
    }
}
