use sea_orm::entity::prelude::*;

/// One exported column of a saved list or saved search. Exactly one owner id is set.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "export_column")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(indexed)]
    pub saved_list_id: Option<i64>,
    #[sea_orm(indexed)]
    pub saved_search_id: Option<i64>,
    pub key: String,
    pub index: i32,
    /// Column definition overrides, stored as JSON.
    pub properties: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::saved_list::Entity",
        from = "Column::SavedListId",
        to = "super::saved_list::Column::Id",
        on_delete = "Cascade"
    )]
    SavedList,
    #[sea_orm(
        belongs_to = "super::saved_search::Entity",
        from = "Column::SavedSearchId",
        to = "super::saved_search::Column::Id",
        on_delete = "Cascade"
    )]
    SavedSearch,
}

impl Related<super::saved_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SavedList.def()
    }
}

impl Related<super::saved_search::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SavedSearch.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
