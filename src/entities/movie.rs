use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub imdb_id: String,
    pub title: String,
    pub poster: String,
    pub year: String,
    pub director: String,
    pub country: String,
    pub overview: Option<String>,
    pub rating: Option<String>,
    pub runtime: Option<String>,
    pub genre: Option<String>,
    pub cast_json: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
