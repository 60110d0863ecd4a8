use crate::domain::RecordId;
use crate::services::{CatalogService, ViewCounter};

pub async fn cmd_increment(
    service: &dyn CatalogService,
    id: &str,
    person: bool,
) -> anyhow::Result<()> {
    let counter = if person {
        ViewCounter::Person
    } else {
        ViewCounter::Content
    };
    let id = RecordId::new(id);
    let views = service.increment_views(counter, &id).await?;
    println!("{id}: {views} views");
    Ok(())
}
