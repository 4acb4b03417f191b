use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202511030001_create_course_catalog"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // courses
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("courses"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("course_code"))
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("course_name")).string().not_null())
                    .col(ColumnDef::new(Alias::new("semester")).string_len(20).null())
                    .col(
                        ColumnDef::new(Alias::new("teacher_id"))
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // class_meetings
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("class_meetings"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("course_id"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("day_of_week"))
                            .enumeration(
                                Alias::new("day_of_week"),
                                vec![
                                    Alias::new("MONDAY"),
                                    Alias::new("TUESDAY"),
                                    Alias::new("WEDNESDAY"),
                                    Alias::new("THURSDAY"),
                                    Alias::new("FRIDAY"),
                                    Alias::new("SATURDAY"),
                                    Alias::new("SUNDAY"),
                                ],
                            )
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("start_time")).time().not_null())
                    .col(ColumnDef::new(Alias::new("end_time")).time().not_null())
                    .col(ColumnDef::new(Alias::new("room")).string_len(100).null())
                    .col(ColumnDef::new(Alias::new("building")).string_len(100).null())
                    .col(
                        ColumnDef::new(Alias::new("meeting_type"))
                            .enumeration(
                                Alias::new("meeting_type"),
                                vec![
                                    Alias::new("LECTURE"),
                                    Alias::new("TUTORIAL"),
                                    Alias::new("COMPUTING"),
                                    Alias::new("LAB"),
                                ],
                            )
                            .not_null()
                            .default("LECTURE"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meeting_course")
                            .from(Alias::new("class_meetings"), Alias::new("course_id"))
                            .to(Alias::new("courses"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // enrollments
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("enrollments"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("student_id"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("course_id"))
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(Alias::new("student_id"))
                            .col(Alias::new("course_id")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollment_course")
                            .from(Alias::new("enrollments"), Alias::new("course_id"))
                            .to(Alias::new("courses"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("enrollments")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("class_meetings")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("courses")).to_owned())
            .await
    }
}
