use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

// SQLite only accepts one column per ALTER TABLE statement.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for col in [
            string_null(Movies::Overview),
            string_null(Movies::Rating),
            string_null(Movies::Runtime),
            string_null(Movies::Genre),
            string_null(Movies::CastJson),
        ] {
            manager
                .alter_table(Table::alter().table(Movies::Table).add_column(col).to_owned())
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for col in
            [Movies::CastJson, Movies::Genre, Movies::Runtime, Movies::Rating, Movies::Overview]
        {
            manager
                .alter_table(Table::alter().table(Movies::Table).drop_column(col).to_owned())
                .await?;
        }

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Overview,
    Rating,
    Runtime,
    Genre,
    CastJson,
}
