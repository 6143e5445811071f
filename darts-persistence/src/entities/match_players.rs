use sea_orm::entity::prelude::*;

/// `player_id` has no foreign key: guests that were never stored still get rows.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "match_players")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub match_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub player_id: Uuid,
    pub seat: i32,
    pub final_score: i32,
    pub is_winner: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::match_results::Entity",
        from = "Column::MatchId",
        to = "super::match_results::Column::Id",
        on_delete = "Cascade"
    )]
    MatchResults,
}

impl Related<super::match_results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MatchResults.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
