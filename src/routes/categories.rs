//! Public category reads. Admin management lives in the admin module.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::Category;
use crate::routes::{ApiResponse, ListResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub active: Option<bool>,
}

pub async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<Category>>, ApiError> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT * FROM categories WHERE ($1::bool IS NULL OR is_active = $1) \
         ORDER BY sort_order, name",
    )
    .bind(params.active)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(ListResponse::new(categories)))
}

/// Fetch by internal UUID or by slug.
pub async fn get_category(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<Category>>, ApiError> {
    let category = match Uuid::parse_str(&key) {
        Ok(id) => sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&state.db)
            .await?,
        Err(_) => sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE slug = $1")
            .bind(&key)
            .fetch_optional(&state.db)
            .await?,
    };
    let category = category.ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;
    Ok(Json(ApiResponse::new(category)))
}

/// URL slug derived from the name: lowercase alphanumerics with single
/// dashes, no leading or trailing dash.
pub(crate) fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut gap = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if gap && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            gap = false;
        } else {
            gap = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_lowercase_dashed_alphanumerics() {
        assert_eq!(slugify("Skin Care"), "skin-care");
        assert_eq!(slugify("Bath & Body"), "bath-body");
        assert_eq!(slugify("  Fragrance  "), "fragrance");
        assert_eq!(slugify("K-Beauty 2.0"), "k-beauty-2-0");
    }
}
