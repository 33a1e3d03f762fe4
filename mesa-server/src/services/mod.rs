//! Domain services
//!
//! Multi-step operations that need a transaction or a broadcast. Services
//! return [`ServiceResult`](crate::error::ServiceResult); handlers convert
//! into `AppError` with `?`.
//!
//! - [`ordering`] - order / kitchen / table coordination
//! - [`payments`] - payment recording and settlement
//! - [`loyalty`] - points ledger
//! - [`payroll`] - clock in / out and payroll reports
//! - [`auth`] - onboarding, login, OTP, sessions
//! - [`settings`] - per-restaurant key/value settings

pub mod auth;
pub mod loyalty;
pub mod ordering;
pub mod payments;
pub mod payroll;
pub mod settings;

#[cfg(test)]
pub(crate) mod fixture {
    //! One restaurant with staff, a customer, a small menu and a table

    use std::sync::Arc;

    use shared::models::{
        DiningTable, DiningTableCreate, MenuCategoryCreate, MenuItem, MenuItemCreate, Role,
    };

    use crate::auth::CurrentUser;
    use crate::auth::otp::LogOtpSender;
    use crate::config::Config;
    use crate::db::DbService;
    use crate::db::repository::{category, dining_table, menu_item, restaurant, user};
    use crate::state::AppState;

    pub struct Fixture {
        pub state: AppState,
        pub rid: i64,
        pub admin: CurrentUser,
        pub waiter: CurrentUser,
        pub cook: CurrentUser,
        pub customer: CurrentUser,
        /// 4.50
        pub soup: MenuItem,
        /// 18.00
        pub steak: MenuItem,
        /// Number 4, available
        pub table: DiningTable,
    }

    pub async fn member(
        state: &AppState,
        rid: i64,
        email: &str,
        role: Role,
        hourly_rate: f64,
    ) -> CurrentUser {
        let created = user::create(
            &state.pool,
            user::NewUser {
                restaurant_id: rid,
                email,
                name: email,
                password_hash: "unused",
                role,
                hourly_rate,
            },
        )
        .await
        .unwrap();
        CurrentUser {
            user_id: created.id,
            restaurant_id: rid,
            email: created.email,
            role,
            session_id: "test-session".into(),
        }
    }

    pub async fn setup() -> Fixture {
        let db = DbService::in_memory().await.unwrap();
        let state = AppState::from_parts(&Config::for_tests(), db.pool, Arc::new(LogOtpSender));
        let rid = restaurant::create(&state.pool, "Casa Test", "casa-test").await.unwrap().id;

        let admin = member(&state, rid, "admin@casa.test", Role::Admin, 0.0).await;
        let waiter = member(&state, rid, "waiter@casa.test", Role::Waiter, 12.0).await;
        let cook = member(&state, rid, "cook@casa.test", Role::Kitchen, 14.0).await;
        let customer = member(&state, rid, "guest@casa.test", Role::Customer, 0.0).await;

        let mains = category::create(
            &state.pool,
            rid,
            &MenuCategoryCreate {
                name: "Mains".into(),
                sort_order: 0,
            },
        )
        .await
        .unwrap();
        let item = |name: &str, price: f64| MenuItemCreate {
            category_id: mains.id,
            name: name.into(),
            description: None,
            price,
            is_available: true,
        };
        let soup = menu_item::create(&state.pool, rid, &item("Soup", 4.5)).await.unwrap();
        let steak = menu_item::create(&state.pool, rid, &item("Steak", 18.0)).await.unwrap();
        let table = dining_table::create(
            &state.pool,
            rid,
            &DiningTableCreate {
                number: 4,
                capacity: Some(4),
            },
        )
        .await
        .unwrap();

        Fixture {
            state,
            rid,
            admin,
            waiter,
            cook,
            customer,
            soup,
            steak,
            table,
        }
    }
}
