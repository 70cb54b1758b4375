//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{self, order::OrderListFilter, order::OrderSort};
use crate::orders::{self, PlaceOrder, PlaceOrderLine, status};
use crate::utils::{AppError, AppResponse, AppResult, PageQuery, Paginated, ok};
use shared::models::{Order, OrderDetail, OrderStatus};

#[derive(Debug, Deserialize, Validate)]
pub struct PlaceOrderRequest {
    pub restaurant_id: i64,
    #[validate(length(min = 1, message = "must contain at least one item"))]
    pub items: Vec<PlaceOrderItemRequest>,
    #[validate(length(min = 1, max = 500, message = "must be 1 to 500 characters"))]
    pub delivery_address: String,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub delivery_instructions: Option<String>,
}

// Serialize is required by the Validate derive on the containing Vec
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaceOrderItemRequest {
    pub dish_id: i64,
    pub quantity: i64,
    pub special_instructions: Option<String>,
}

/// POST /api/orders - 下单
pub async fn place(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<PlaceOrderRequest>,
) -> AppResult<(StatusCode, Json<AppResponse<OrderDetail>>)> {
    req.validate()?;

    let input = PlaceOrder {
        restaurant_id: req.restaurant_id,
        items: req
            .items
            .into_iter()
            .map(|i| PlaceOrderLine {
                dish_id: i.dish_id,
                quantity: i.quantity,
                special_instructions: i.special_instructions,
            })
            .collect(),
        delivery_address: req.delivery_address,
        delivery_instructions: req.delivery_instructions,
    };

    let (order, items) = orders::place_order(&state.pool, user.id, input).await?;
    let restaurant = repository::restaurant::find_summary(&state.pool, order.restaurant_id)
        .await?
        .ok_or_else(|| AppError::internal(format!("Restaurant {} missing", order.restaurant_id)))?;

    Ok((
        StatusCode::CREATED,
        ok(OrderDetail {
            order,
            items,
            restaurant,
        }),
    ))
}

/// Listing query: pagination plus explicit, enumerated filters
///
/// page/limit are inline rather than a flattened struct: serde's flatten
/// buffers query-string values as strings, which breaks i64 deserialization
/// through serde_urlencoded.
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<OrderStatus>,
    /// Unix millis, inclusive
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    /// placed_at (default) | total_amount | order_number
    pub sort_by: Option<String>,
    /// asc | desc (default desc)
    pub order: Option<String>,
}

impl OrderListQuery {
    fn page_query(&self) -> PageQuery {
        let defaults = PageQuery::default();
        PageQuery {
            page: self.page.unwrap_or(defaults.page),
            limit: self.limit.unwrap_or(defaults.limit),
        }
        .normalized()
    }

    fn to_filter(&self) -> AppResult<OrderListFilter> {
        let sort = match self.sort_by.as_deref() {
            None | Some("placed_at") => OrderSort::PlacedAt,
            Some("total_amount") => OrderSort::TotalAmount,
            Some("order_number") => OrderSort::OrderNumber,
            Some(other) => {
                return Err(AppError::validation(format!(
                    "sort_by must be placed_at, total_amount or order_number, got {other}"
                )));
            }
        };
        let descending = match self.order.as_deref() {
            None | Some("desc") => true,
            Some("asc") => false,
            Some(other) => {
                return Err(AppError::validation(format!(
                    "order must be asc or desc, got {other}"
                )));
            }
        };
        Ok(OrderListFilter {
            status: self.status,
            placed_after: self.start_date,
            placed_before: self.end_date,
            sort,
            descending,
        })
    }
}

/// GET /api/orders - 当前用户的订单列表
pub async fn list_mine(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<AppResponse<Paginated<Order>>>> {
    let filter = query.to_filter()?;
    let page = query.page_query();
    let (rows, total) =
        repository::order::list_by_user(&state.pool, user.id, &filter, page.limit, page.offset())
            .await?;
    Ok(ok(Paginated::new(rows, page, total)))
}

/// GET /api/orders/:id - 订单详情 (仅本人可见)
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<OrderDetail>>> {
    let order = repository::order::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {id}")))?;

    // Other users' orders read as absent, not as forbidden
    if order.user_id != user.id {
        return Err(AppError::not_found(format!("Order {id}")));
    }

    Ok(ok(orders::load_detail(&state.pool, order).await?))
}

/// GET /api/restaurants/:id/orders - 餐厅订单列表
pub async fn list_for_restaurant(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(restaurant_id): Path<i64>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<AppResponse<Paginated<Order>>>> {
    // Restaurant staff accounts share the user table; any authenticated
    // account may view a restaurant's queue
    repository::restaurant::find_by_id(&state.pool, restaurant_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Restaurant {restaurant_id}")))?;

    let filter = query.to_filter()?;
    let page = query.page_query();
    let (rows, total) = repository::order::list_by_restaurant(
        &state.pool,
        restaurant_id,
        &filter,
        page.limit,
        page.offset(),
    )
    .await?;
    Ok(ok(Paginated::new(rows, page, total)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    /// Unix millis, stored verbatim
    pub estimated_delivery_time: Option<i64>,
    pub actual_delivery_time: Option<i64>,
}

/// PATCH /api/orders/:id/status - 状态流转
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = repository::order::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {id}")))?;

    status::validate_transition(order.status, req.status)?;

    let estimated = req
        .estimated_delivery_time
        .or(order.estimated_delivery_time);
    let actual = req.actual_delivery_time.or(order.actual_delivery_time);

    let updated = repository::order::update_status(&state.pool, id, req.status, estimated, actual)
        .await?;
    tracing::info!(
        order_id = id,
        from = %order.status,
        to = %req.status,
        by_user = user.id,
        "Order status updated"
    );
    Ok(ok(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;

    #[test]
    fn test_list_query_parses_pagination_and_filters() {
        let uri: Uri = "/api/orders?page=2&limit=10&status=pending&sort_by=total_amount&order=asc"
            .parse()
            .unwrap();
        let Query(query) = Query::<OrderListQuery>::try_from_uri(&uri).unwrap();

        assert_eq!(query.page, Some(2));
        assert_eq!(query.limit, Some(10));
        let page = query.page_query();
        assert_eq!(page.page, 2);
        assert_eq!(page.limit, 10);

        let filter = query.to_filter().unwrap();
        assert_eq!(filter.status, Some(OrderStatus::Pending));
        assert_eq!(filter.sort, OrderSort::TotalAmount);
        assert!(!filter.descending);
    }

    #[test]
    fn test_list_query_defaults_without_parameters() {
        let uri: Uri = "/api/orders".parse().unwrap();
        let Query(query) = Query::<OrderListQuery>::try_from_uri(&uri).unwrap();

        let page = query.page_query();
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 20);
        let filter = query.to_filter().unwrap();
        assert_eq!(filter.status, None);
        assert_eq!(filter.sort, OrderSort::PlacedAt);
        assert!(filter.descending);
    }

    #[test]
    fn test_list_query_rejects_unknown_sort_and_order() {
        let uri: Uri = "/api/orders?sort_by=color".parse().unwrap();
        let Query(query) = Query::<OrderListQuery>::try_from_uri(&uri).unwrap();
        assert!(query.to_filter().is_err());

        let uri: Uri = "/api/orders?order=sideways".parse().unwrap();
        let Query(query) = Query::<OrderListQuery>::try_from_uri(&uri).unwrap();
        assert!(query.to_filter().is_err());
    }

    #[test]
    fn test_place_order_request_validates_items_and_address() {
        let empty = PlaceOrderRequest {
            restaurant_id: 1,
            items: vec![],
            delivery_address: "42 Delivery Lane".into(),
            delivery_instructions: None,
        };
        assert!(empty.validate().is_err());

        let valid = PlaceOrderRequest {
            restaurant_id: 1,
            items: vec![PlaceOrderItemRequest {
                dish_id: 1,
                quantity: 1,
                special_instructions: None,
            }],
            delivery_address: "42 Delivery Lane".into(),
            delivery_instructions: None,
        };
        assert!(valid.validate().is_ok());
    }
}
