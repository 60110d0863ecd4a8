mod catalog;
mod counter;
mod init;

pub use catalog::{
    cmd_affiliates, cmd_categories, cmd_content, cmd_contents, cmd_genres, cmd_people,
    cmd_person, cmd_ranking, cmd_rankings, cmd_uniforms,
};
pub use counter::cmd_increment;
pub use init::cmd_init;

use serde::Serialize;

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
