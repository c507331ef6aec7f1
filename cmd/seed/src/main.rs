//! Populates the database with random posts and tasks for local development.
//!
//! Usage: `seed [count]` (defaults to 100 of each).

use anyhow::Context;
use fake::faker::internet::en::Username;
use fake::faker::lorem::en::Words;
use fake::Fake;
use rand::seq::SliceRandom;
use rand::Rng;
use tb_core::models::{NewPost, NewTask, PostStatus, TaskLabel, TaskPriority, TaskStatus};
use tb_core::traits::{PostRepo, TaskRepo};
use tb_db_sqlite::{connect, SqlitePostRepo, SqliteTaskRepo};

fn random_post(rng: &mut impl Rng) -> NewPost {
    let words: Vec<String> = Words(3..8).fake_with_rng(rng);
    NewPost {
        title: words.join(" "),
        status: *PostStatus::ALL.choose(rng).unwrap_or(&PostStatus::Draft),
        author_name: Username().fake_with_rng(rng),
        comments_number: rng.gen_range(0..=9000),
    }
}

fn random_task(rng: &mut impl Rng) -> NewTask {
    let words: Vec<String> = Words(2..6).fake_with_rng(rng);
    let mut title = words.join(" ");
    if let Some(first) = title.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    NewTask {
        code: format!("TASK-{:04}", rng.gen_range(0..10_000)),
        title: Some(title),
        status: *TaskStatus::ALL.choose(rng).unwrap_or(&TaskStatus::Todo),
        label: *TaskLabel::ALL.choose(rng).unwrap_or(&TaskLabel::Bug),
        priority: *TaskPriority::ALL.choose(rng).unwrap_or(&TaskPriority::Low),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let count: usize = std::env::args()
        .nth(1)
        .map(|raw| raw.parse())
        .transpose()
        .context("count must be a number")?
        .unwrap_or(100);

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:tabula.db".to_string());
    let pool = connect(&database_url).await?;

    let posts = SqlitePostRepo::new(pool.clone());
    let tasks = SqliteTaskRepo::new(pool);
    let mut rng = rand::thread_rng();

    log::info!("📝 Inserting {count} posts");
    for _ in 0..count {
        posts.create(random_post(&mut rng)).await?;
    }

    log::info!("📝 Inserting {count} tasks");
    for _ in 0..count {
        tasks.create(random_task(&mut rng)).await?;
    }

    Ok(())
}
