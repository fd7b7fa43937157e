use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(pk_auto(Movies::Id))
                    .col(string(Movies::ImdbId))
                    .col(string(Movies::Title))
                    .col(string(Movies::Poster))
                    .col(string(Movies::Year))
                    .col(string(Movies::Director))
                    .col(string(Movies::Country))
                    .col(big_integer(Movies::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movies_imdb_id")
                    .table(Movies::Table)
                    .col(Movies::ImdbId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movies_year")
                    .table(Movies::Table)
                    .col(Movies::Year)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    ImdbId,
    Title,
    Poster,
    Year,
    Director,
    Country,
    CreatedAt,
}
