//! Demo data for local development.
//!
//! Priorities and categories are looked up by name and created when missing,
//! so seeding twice only adds tasks.

use chrono::{DateTime, Datelike, Duration, FixedOffset, TimeZone, Utc};
use models::status::StatusSet;
use models::{category, note, priority, subtask, task};
use rand::seq::SliceRandom;
use rand::Rng;
use sea_orm::{ActiveModelTrait, DatabaseConnection, NotSet, Set, TransactionTrait};
use serde::Serialize;
use tracing::info;

use crate::errors::ServiceError;

pub const PRIORITY_NAMES: [&str; 5] = ["High", "Medium", "Low", "Critical", "Optional"];
pub const CATEGORY_NAMES: [&str; 5] = ["Work", "School", "Personal", "Finance", "Projects"];

const WORDS: &[&str] = &[
    "review", "draft", "budget", "meeting", "report", "plan", "update", "client", "invoice", "schedule",
    "lecture", "exam", "notes", "groceries", "garden", "repair", "call", "email", "research", "design",
    "deploy", "backup", "release", "summary", "outline", "follow", "prepare", "submit", "check", "organize",
    "weekly", "quarterly", "personal", "shared", "urgent", "final", "project", "team", "home", "office",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedOptions {
    pub tasks: usize,
    pub subtasks_per_task: usize,
    pub notes_per_task: usize,
}

impl Default for SeedOptions {
    fn default() -> Self { Self { tasks: 30, subtasks_per_task: 2, notes_per_task: 2 } }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub priorities: usize,
    pub categories: usize,
    pub tasks: usize,
    pub subtasks: usize,
    pub notes: usize,
}

fn sentence<R: Rng>(rng: &mut R, words: usize) -> String {
    let mut out = String::new();
    for i in 0..words {
        let word = WORDS.choose(rng).copied().unwrap_or("task");
        if i == 0 {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        } else {
            out.push(' ');
            out.push_str(word);
        }
    }
    out.push('.');
    out
}

fn paragraph<R: Rng>(rng: &mut R, sentences: usize) -> String {
    (0..sentences)
        .map(|_| {
            let n = rng.gen_range(4..=9);
            sentence(rng, n)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A random instant between the start of `now`'s month and `now`.
fn deadline_this_month<R: Rng>(rng: &mut R, now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let month_start = now
        .offset()
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    let span = (now - month_start).num_seconds().max(0);
    let picked = month_start + Duration::seconds(rng.gen_range(0..=span));
    picked.with_timezone(&Utc).into()
}

/// Seed lookup tables and `opts.tasks` random tasks with their children.
///
/// `now` fixes the month deadlines are drawn from.
pub async fn seed_demo_data<R: Rng>(
    db: &DatabaseConnection,
    statuses: &StatusSet,
    opts: SeedOptions,
    now: DateTime<FixedOffset>,
    rng: &mut R,
) -> Result<SeedReport, ServiceError> {
    let mut priorities = Vec::with_capacity(PRIORITY_NAMES.len());
    for name in PRIORITY_NAMES {
        priorities.push(priority::get_or_create(db, name).await?);
    }
    let mut categories = Vec::with_capacity(CATEGORY_NAMES.len());
    for name in CATEGORY_NAMES {
        categories.push(category::get_or_create(db, name).await?);
    }

    let labels = statuses.labels();
    let mut report = SeedReport { priorities: priorities.len(), categories: categories.len(), ..Default::default() };
    let created_at: DateTime<FixedOffset> = Utc::now().into();

    let txn = db.begin().await?;
    for _ in 0..opts.tasks {
        let row = task::ActiveModel {
            id: NotSet,
            title: Set(sentence(rng, 5)),
            description: Set(paragraph(rng, 3)),
            status: Set(labels.choose(rng).cloned().unwrap_or_else(|| statuses.initial().to_string())),
            deadline: Set(deadline_this_month(rng, now)),
            created_at: Set(created_at),
            priority_id: Set(priorities.choose(rng).map(|p| p.id)),
            category_id: Set(categories.choose(rng).map(|c| c.id)),
        }
        .insert(&txn)
        .await?;
        report.tasks += 1;

        for _ in 0..opts.subtasks_per_task {
            subtask::ActiveModel {
                id: NotSet,
                task_id: Set(row.id),
                title: Set(sentence(rng, 5)),
                status: Set(labels.choose(rng).cloned().unwrap_or_else(|| statuses.initial().to_string())),
                created_at: Set(created_at),
            }
            .insert(&txn)
            .await?;
            report.subtasks += 1;
        }

        for _ in 0..opts.notes_per_task {
            note::ActiveModel { id: NotSet, task_id: Set(row.id), content: Set(paragraph(rng, 3)), created_at: Set(created_at) }
                .insert(&txn)
                .await?;
            report.notes += 1;
        }
    }
    txn.commit().await?;

    info!(
        tasks = report.tasks,
        subtasks = report.subtasks,
        notes = report.notes,
        "seeded demo data"
    );
    Ok(report)
}
