use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, QuerySelect};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub student_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub course_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn enroll<C>(db: &C, student_id: i64, course_id: i64) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        ActiveModel {
            student_id: Set(student_id),
            course_id: Set(course_id),
        }
        .insert(db)
        .await
    }

    pub async fn is_enrolled<C>(db: &C, student_id: i64, course_id: i64) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let found = Entity::find_by_id((student_id, course_id)).one(db).await?;
        Ok(found.is_some())
    }

    pub async fn course_ids_for_student<C>(db: &C, student_id: i64) -> Result<Vec<i64>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .select_only()
            .column(Column::CourseId)
            .filter(Column::StudentId.eq(student_id))
            .into_tuple::<i64>()
            .all(db)
            .await
    }

    pub async fn student_ids_for_course<C>(db: &C, course_id: i64) -> Result<Vec<i64>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .select_only()
            .column(Column::StudentId)
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::StudentId)
            .into_tuple::<i64>()
            .all(db)
            .await
    }
}
