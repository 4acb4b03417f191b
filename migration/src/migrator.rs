use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202511030001_create_course_catalog::Migration),
            Box::new(migrations::m202511030002_create_attendance_sessions::Migration),
            Box::new(migrations::m202511030003_create_attendance_records::Migration),
        ]
    }
}
