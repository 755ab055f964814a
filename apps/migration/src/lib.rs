//! Schema migrations for the blog database.

pub use sea_orm_migration::prelude::*;

mod m20250527_000001_create_users;
mod m20250527_000002_create_posts;
mod m20250527_000003_create_comments;
mod m20250527_000004_create_revoked_tokens;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250527_000001_create_users::Migration),
            Box::new(m20250527_000002_create_posts::Migration),
            Box::new(m20250527_000003_create_comments::Migration),
            Box::new(m20250527_000004_create_revoked_tokens::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_ordered_by_name() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();

        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 4);
    }
}
