use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202511030002_create_attendance_sessions"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("attendance_sessions"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("meeting_id"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("session_date")).date().not_null())
                    .col(
                        ColumnDef::new(Alias::new("status"))
                            .enumeration(
                                Alias::new("session_status"),
                                vec![
                                    Alias::new("LOCKED"),
                                    Alias::new("UNLOCKED"),
                                    Alias::new("CLOSED"),
                                ],
                            )
                            .not_null()
                            .default("LOCKED"),
                    )
                    .col(ColumnDef::new(Alias::new("unlocked_at")).timestamp().null())
                    .col(ColumnDef::new(Alias::new("locked_at")).timestamp().null())
                    .col(ColumnDef::new(Alias::new("closed_at")).timestamp().null())
                    .col(
                        ColumnDef::new(Alias::new("unlocked_by"))
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("auto_close_minutes"))
                            .integer()
                            .not_null()
                            .default(20),
                    )
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_att_sess_meeting")
                            .from(Alias::new("attendance_sessions"), Alias::new("meeting_id"))
                            .to(Alias::new("class_meetings"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One window per meeting per calendar date.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_att_sess_meeting_date")
                    .table(Alias::new("attendance_sessions"))
                    .col(Alias::new("meeting_id"))
                    .col(Alias::new("session_date"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_att_sess_status")
                    .table(Alias::new("attendance_sessions"))
                    .col(Alias::new("status"))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("attendance_sessions"))
                    .to_owned(),
            )
            .await
    }
}
