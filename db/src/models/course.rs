use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::QueryOrder;
use serde::Serialize;

/// A taught course. Owned by exactly one teacher.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_code: String,
    pub course_name: String,
    pub semester: Option<String>,
    /// The teacher who owns this course and may open its sign-in windows.
    pub teacher_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::class_meeting::Entity")]
    Meetings,
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollments,
}

impl Related<super::class_meeting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meetings.def()
    }
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create<C>(
        db: &C,
        course_code: &str,
        course_name: &str,
        semester: Option<&str>,
        teacher_id: i64,
    ) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        ActiveModel {
            course_code: Set(course_code.to_owned()),
            course_name: Set(course_name.to_owned()),
            semester: Set(semester.map(str::to_owned)),
            teacher_id: Set(teacher_id),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn find_by_teacher<C>(db: &C, teacher_id: i64) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    pub async fn find_many<C>(db: &C, ids: Vec<i64>) -> Result<Vec<Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Entity::find()
            .filter(Column::Id.is_in(ids))
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }
}
