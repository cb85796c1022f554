//! Migrate command - creates the storage tables

use tracing::info;

use crate::domain::{Project, Testimonial, TestimonialKind};
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::project::PROJECTS_TABLE;
use crate::infrastructure::storage::{StorageFactory, StorageType};

pub async fn run() -> anyhow::Result<()> {
    let config = super::load_config()?;
    init_logging(&config.logging);

    let storage = StorageFactory::connect(&config.storage).await?;

    if storage.storage_type() == StorageType::InMemory {
        info!("In-memory storage configured, nothing to migrate");
        return Ok(());
    }

    storage.api_key_repository().await?;
    storage.entity_storage::<Project>(PROJECTS_TABLE).await?;
    for kind in [TestimonialKind::Testimonial, TestimonialKind::Testament] {
        storage.entity_storage::<Testimonial>(kind.as_str()).await?;
    }

    info!("Migrations complete");
    Ok(())
}
