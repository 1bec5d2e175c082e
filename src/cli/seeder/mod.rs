//! Demo data for a fresh database.
//!
//! Creates time slots, teachers with their classes, parents, students with
//! enrollments, and a few weeks of attendance history. Fake values are
//! generated in parallel with Rayon and written with multi-value `INSERT`s
//! inside one transaction. Every seeded account uses the
//! [`SEED_EMAIL_DOMAIN`](generate::SEED_EMAIL_DOMAIN) so
//! [`clear_seeded_data`] can remove it again.

pub mod generate;
pub mod models;

pub use models::{SeedConfig, SeedSummary};

use anyhow::Context;
use bcrypt::hash;
use chrono::{Datelike, NaiveDate};
use sams_core::Role;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;

use models::{ClassSeed, SlotSeed, StudentSeed, UserSeed};

pub const SEED_PASSWORD: &str = "password123";
const SEED_SEMESTER: &str = "Fall";

/// `($1, $2), ($3, $4), ...` for `rows` rows of `columns` parameters.
fn values_clause(rows: usize, columns: usize) -> String {
    (0..rows)
        .map(|row| {
            let params: Vec<String> = (1..=columns)
                .map(|col| format!("${}", row * columns + col))
                .collect();
            format!("({})", params.join(", "))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub async fn seed_database(db: &PgPool, config: &SeedConfig) -> anyhow::Result<SeedSummary> {
    let start_time = Instant::now();
    let today = chrono::Local::now().date_naive();

    println!("🌱 Starting database seeding...");
    println!(
        "   - {} teachers x {} classes, {} students, {} parents, {} days",
        config.teachers,
        config.classes_per_teacher,
        config.students,
        config.total_parents(),
        config.days
    );

    // Seed accounts share one low-cost hash.
    let password_hash = hash(SEED_PASSWORD, 4).context("Failed to hash seed password")?;

    println!("\n🔧 Generating fake data in parallel...");
    let teachers = generate::users(Role::Teacher, config.teachers);
    let parents = generate::users(Role::Parent, config.total_parents());
    let student_users = generate::users(Role::Student, config.students);

    let mut tx = db.begin().await?;
    let mut summary = SeedSummary::default();

    let slot_ids = insert_time_slots(&mut tx, &generate::time_slots()).await?;
    summary.time_slots = slot_ids.len();

    let teacher_ids = insert_users(&mut tx, &teachers, &password_hash).await?;
    let parent_ids = insert_users(&mut tx, &parents, &password_hash).await?;
    let student_user_ids = insert_users(&mut tx, &student_users, &password_hash).await?;
    summary.users = teacher_ids.len() + parent_ids.len() + student_user_ids.len();
    println!("   ✓ Inserted {} users", summary.users);

    let class_seeds = generate::classes(&teacher_ids, &slot_ids, config.classes_per_teacher);
    let class_ids = insert_classes(&mut tx, &class_seeds, today.year()).await?;
    summary.classes = class_ids.len();
    println!("   ✓ Inserted {} classes", summary.classes);

    let student_seeds = generate::students(&student_user_ids, &parent_ids, today.year());
    let student_ids = insert_students(&mut tx, &student_seeds, today.year()).await?;

    let enrollments = generate::enrollments(&student_ids, &class_ids, config.classes_per_student);
    insert_enrollments(&mut tx, &enrollments).await?;
    summary.enrollments = enrollments.len();
    println!("   ✓ Enrolled students in {} class places", summary.enrollments);

    let class_teachers: HashMap<Uuid, Uuid> = class_ids
        .iter()
        .zip(class_seeds.iter())
        .map(|(&class_id, seed)| (class_id, seed.teacher_id))
        .collect();
    let days = generate::school_days(today, config.days);
    let rows = generate::attendance(&enrollments, &class_teachers, &days);
    summary.attendance_rows = insert_attendance(&mut tx, &rows).await?;
    println!("   ✓ Recorded {} attendance rows", summary.attendance_rows);

    tx.commit().await?;

    println!("\n✅ Seeding complete in {:?}", start_time.elapsed());
    println!("\n📝 Default password for all users: {}", SEED_PASSWORD);

    Ok(summary)
}

async fn insert_time_slots(
    tx: &mut Transaction<'_, Postgres>,
    slots: &[SlotSeed],
) -> anyhow::Result<Vec<Uuid>> {
    if slots.is_empty() {
        return Ok(Vec::new());
    }

    let query = format!(
        "INSERT INTO time_slots (start_time, end_time) VALUES {} RETURNING id",
        values_clause(slots.len(), 2)
    );
    let mut q = sqlx::query_scalar(&query);
    for slot in slots {
        q = q.bind(slot.start_time).bind(slot.end_time);
    }

    Ok(q.fetch_all(&mut **tx).await?)
}

async fn insert_users(
    tx: &mut Transaction<'_, Postgres>,
    users: &[UserSeed],
    password_hash: &str,
) -> anyhow::Result<Vec<Uuid>> {
    // 5 params per user, well under the bind limit.
    const BATCH_SIZE: usize = 1000;
    let mut all_ids = Vec::with_capacity(users.len());

    for chunk in users.chunks(BATCH_SIZE) {
        let query = format!(
            "INSERT INTO users (email, password, full_name, role, department) VALUES {} RETURNING id",
            values_clause(chunk.len(), 5)
        );
        let mut q = sqlx::query_scalar(&query);
        for user in chunk {
            q = q
                .bind(&user.email)
                .bind(password_hash)
                .bind(&user.full_name)
                .bind(user.role)
                .bind(&user.department);
        }
        let ids: Vec<Uuid> = q.fetch_all(&mut **tx).await?;
        all_ids.extend(ids);
    }

    Ok(all_ids)
}

async fn insert_classes(
    tx: &mut Transaction<'_, Postgres>,
    classes: &[ClassSeed],
    year: i32,
) -> anyhow::Result<Vec<Uuid>> {
    if classes.is_empty() {
        return Ok(Vec::new());
    }

    let query = format!(
        "INSERT INTO classes (code, title, semester, year, time_slot_id, teacher_id) VALUES {} RETURNING id",
        values_clause(classes.len(), 6)
    );
    let mut q = sqlx::query_scalar(&query);
    for class in classes {
        q = q
            .bind(&class.code)
            .bind(&class.title)
            .bind(SEED_SEMESTER)
            .bind(year)
            .bind(class.time_slot_id)
            .bind(class.teacher_id);
    }

    Ok(q.fetch_all(&mut **tx).await?)
}

async fn insert_students(
    tx: &mut Transaction<'_, Postgres>,
    students: &[StudentSeed],
    year: i32,
) -> anyhow::Result<Vec<Uuid>> {
    const BATCH_SIZE: usize = 1000;
    let mut all_ids = Vec::with_capacity(students.len());

    for chunk in students.chunks(BATCH_SIZE) {
        let query = format!(
            "INSERT INTO students (user_id, roll_no, semester, year, parent_id) VALUES {} RETURNING id",
            values_clause(chunk.len(), 5)
        );
        let mut q = sqlx::query_scalar(&query);
        for student in chunk {
            q = q
                .bind(student.user_id)
                .bind(&student.roll_no)
                .bind(SEED_SEMESTER)
                .bind(year)
                .bind(student.parent_id);
        }
        let ids: Vec<Uuid> = q.fetch_all(&mut **tx).await?;
        all_ids.extend(ids);
    }

    Ok(all_ids)
}

async fn insert_enrollments(
    tx: &mut Transaction<'_, Postgres>,
    enrollments: &[(Uuid, Uuid)],
) -> anyhow::Result<()> {
    const BATCH_SIZE: usize = 2000;

    for chunk in enrollments.chunks(BATCH_SIZE) {
        let query = format!(
            "INSERT INTO student_classes (student_id, class_id) VALUES {} ON CONFLICT DO NOTHING",
            values_clause(chunk.len(), 2)
        );
        let mut q = sqlx::query(&query);
        for (student_id, class_id) in chunk {
            q = q.bind(student_id).bind(class_id);
        }
        q.execute(&mut **tx).await?;
    }

    Ok(())
}

async fn insert_attendance(
    tx: &mut Transaction<'_, Postgres>,
    rows: &[(Uuid, Uuid, NaiveDate, i16, Uuid)],
) -> anyhow::Result<usize> {
    const BATCH_SIZE: usize = 2000;
    let mut inserted = 0;

    for chunk in rows.chunks(BATCH_SIZE) {
        let query = format!(
            "INSERT INTO attendance (student_id, class_id, date, status, marked_by) VALUES {} \
             ON CONFLICT ON CONSTRAINT attendance_student_class_date_key DO NOTHING",
            values_clause(chunk.len(), 5)
        );
        let mut q = sqlx::query(&query);
        for (student_id, class_id, date, status, marked_by) in chunk {
            q = q
                .bind(student_id)
                .bind(class_id)
                .bind(date)
                .bind(status)
                .bind(marked_by);
        }
        inserted += q.execute(&mut **tx).await?.rows_affected() as usize;
    }

    Ok(inserted)
}

/// Deletes every seeded account (admins excluded) and, through the
/// cascades, their classes, profiles, attendance and notifications. Time
/// slots left without a class go too.
pub async fn clear_seeded_data(db: &PgPool) -> anyhow::Result<()> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded data...");

    let mut tx = db.begin().await?;

    let users_deleted = sqlx::query("DELETE FROM users WHERE email LIKE $1 AND role <> $2")
        .bind(format!("%@{}", generate::SEED_EMAIL_DOMAIN))
        .bind(Role::Admin)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let slots_deleted = sqlx::query(
        "DELETE FROM time_slots t WHERE NOT EXISTS (SELECT 1 FROM classes c WHERE c.time_slot_id = t.id)",
    )
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;

    println!(
        "   ✓ Deleted {} users and {} time slots in {:?}",
        users_deleted,
        slots_deleted,
        start_time.elapsed()
    );
    println!("✅ Seeded data cleared successfully!");

    Ok(())
}
