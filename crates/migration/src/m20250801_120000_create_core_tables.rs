use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Identity::Table)
                    .if_not_exists()
                    .col(pk_auto(Identity::Id))
                    .col(string(Identity::Name).not_null().to_owned())
                    .col(string(Identity::Email).not_null().unique_key().to_owned())
                    .col(string_null(Identity::PictureUrl))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Restaurant::Table)
                    .if_not_exists()
                    .col(pk_auto(Restaurant::Id))
                    .col(string(Restaurant::Name).not_null().to_owned())
                    .col(integer(Restaurant::OwnerId).not_null().to_owned())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_restaurant_owner")
                            .from(Restaurant::Table, Restaurant::OwnerId)
                            .to(Identity::Table, Identity::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MenuItem::Table)
                    .if_not_exists()
                    .col(pk_auto(MenuItem::Id))
                    .col(string(MenuItem::Name).not_null().to_owned())
                    .col(string_null(MenuItem::Course))
                    .col(string_null(MenuItem::Description))
                    .col(string_null(MenuItem::Price))
                    .col(string_null(MenuItem::Image))
                    .col(integer(MenuItem::RestaurantId).not_null().to_owned())
                    .col(integer(MenuItem::OwnerId).not_null().to_owned())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_menu_item_restaurant")
                            .from(MenuItem::Table, MenuItem::RestaurantId)
                            .to(Restaurant::Table, Restaurant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_menu_item_owner")
                            .from(MenuItem::Table, MenuItem::OwnerId)
                            .to(Identity::Table, Identity::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_menu_item_restaurant")
                    .table(MenuItem::Table)
                    .col(MenuItem::RestaurantId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_menu_item_restaurant")
                    .table(MenuItem::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(MenuItem::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Restaurant::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Identity::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Identity {
    Table,
    Id,
    Name,
    Email,
    PictureUrl,
}

#[derive(Iden)]
enum Restaurant {
    Table,
    Id,
    Name,
    OwnerId,
}

#[derive(Iden)]
enum MenuItem {
    Table,
    Id,
    Name,
    Course,
    Description,
    Price,
    Image,
    RestaurantId,
    OwnerId,
}
