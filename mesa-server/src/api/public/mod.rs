//! Public (unauthenticated) routes
//!
//! | Path | Method |
//! |------|--------|
//! | /api/public/{slug}/menu | GET |

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{MenuCategory, MenuItem, MenuSection};

use crate::api::{ApiResult, ok};
use crate::db::repository::{category, menu_item, restaurant};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/public/{slug}/menu", get(menu))
}

/// Group available items under their active categories, dropping empty ones
pub fn sections(categories: Vec<MenuCategory>, items: Vec<MenuItem>) -> Vec<MenuSection> {
    let mut sections: Vec<MenuSection> = categories
        .into_iter()
        .map(|category| MenuSection {
            category,
            items: Vec::new(),
        })
        .collect();
    for item in items {
        if let Some(section) = sections.iter_mut().find(|s| s.category.id == item.category_id) {
            section.items.push(item);
        }
    }
    sections.retain(|s| !s.items.is_empty());
    sections
}

/// GET /api/public/{slug}/menu - active categories with available items
pub async fn menu(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Vec<MenuSection>> {
    let restaurant = restaurant::find_by_slug(&state.pool, &slug)
        .await?
        .filter(|r| r.is_active)
        .ok_or_else(|| {
            AppError::new(ErrorCode::TenantNotFound).with_detail("slug", slug.as_str())
        })?;

    let categories = category::list(&state.pool, restaurant.id, true).await?;
    let items = menu_item::list(&state.pool, restaurant.id, None, true).await?;
    Ok(ok(sections(categories, items)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i64, name: &str) -> MenuCategory {
        MenuCategory {
            id,
            restaurant_id: 1,
            name: name.into(),
            sort_order: 0,
            is_active: true,
        }
    }

    fn item(id: i64, category_id: i64) -> MenuItem {
        MenuItem {
            id,
            restaurant_id: 1,
            category_id,
            name: format!("item {id}"),
            description: None,
            price: 5.0,
            is_available: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn items_land_under_their_category_in_order() {
        let result = sections(
            vec![category(1, "Starters"), category(2, "Empty"), category(3, "Mains")],
            vec![item(10, 3), item(11, 1), item(12, 3), item(13, 99)],
        );
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].category.name, "Starters");
        assert_eq!(result[1].category.name, "Mains");
        let mains: Vec<i64> = result[1].items.iter().map(|i| i.id).collect();
        assert_eq!(mains, vec![10, 12]);
    }
}
