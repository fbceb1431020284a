//! The module contains the definition of a user and its endpoint

use axum::{Extension, Json};
use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub display_name: String,
    pub password: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Serialize)]
pub struct Me {
    pub username: String,
    pub name: String,
}

/// Returns the authenticated user
pub async fn me(Extension(user): Extension<Model>) -> Json<Me> {
    let name = if user.display_name.trim().is_empty() {
        user.username.clone()
    } else {
        user.display_name
    };
    Json(Me {
        username: user.username,
        name,
    })
}
