use actix_web::{web, HttpResponse};

use super::dto::{
    CreateOrderRequest, DoctorHistoryQuery, DoctorOrderDto, OrderDetailDto, OrderHistoryDto, OrderIdRequest,
    OrderIdResponse, OrderListResponse, TransitionResponse, UpdateOrderRequest,
};
use super::parse_id;
use crate::auth::Principal;
use crate::domain::order::OrderStatus;
use crate::error::{AppError, AppResult};
use crate::services::{OrderService, RequestedItem};

pub async fn create_order(
    service: web::Data<OrderService>,
    principal: Principal,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    // The body is optional, but one that is present must parse.
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CreateOrderRequest::default()
    } else {
        serde_json::from_slice::<CreateOrderRequest>(&body)
            .map_err(|err| AppError::BadRequest(format!("invalid request body: {err}")))?
    };
    let order = service.create_order(&principal, request.note).await?;
    Ok(HttpResponse::Created().json(OrderIdResponse { order_id: order.id }))
}

pub async fn update_order(
    service: web::Data<OrderService>,
    principal: Principal,
    body: web::Json<UpdateOrderRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let order_id = parse_id(&body.order_id, "order ID")?;

    let items = body
        .order_items
        .into_iter()
        .map(|item| {
            Ok(RequestedItem {
                medicine_id: parse_id(&item.medicine_id, "medicine ID")?,
                quantity: item.quantity,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    let order = service.update_order(&principal, order_id, items).await?;
    Ok(HttpResponse::Ok().json(OrderIdResponse { order_id: order.id }))
}

pub async fn get_order(
    service: web::Data<OrderService>,
    principal: Principal,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let order_id = parse_id(&path, "order ID")?;
    let view = service.get_order_by_id(&principal, order_id).await?;
    Ok(HttpResponse::Ok().json(OrderDetailDto::from(&view)))
}

pub async fn get_order_history(service: web::Data<OrderService>, principal: Principal) -> AppResult<HttpResponse> {
    let views = service.get_order_history(&principal).await?;
    let orders = views.iter().map(OrderHistoryDto::from).collect();
    Ok(HttpResponse::Ok().json(OrderListResponse::new(orders)))
}

pub async fn get_latest_order(service: web::Data<OrderService>, principal: Principal) -> AppResult<HttpResponse> {
    let view = service.get_latest_order(&principal).await?;
    Ok(HttpResponse::Ok().json(OrderDetailDto::from(&view)))
}

pub async fn get_latest_order_for_patient(
    service: web::Data<OrderService>,
    principal: Principal,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let patient_id = parse_id(&path, "patient ID")?;
    let view = service.get_latest_order_for_doctor(&principal, patient_id).await?;
    Ok(HttpResponse::Ok().json(OrderDetailDto::from(&view)))
}

pub async fn cancel_order(
    service: web::Data<OrderService>,
    principal: Principal,
    body: web::Json<OrderIdRequest>,
) -> AppResult<HttpResponse> {
    let order_id = parse_id(&body.order_id, "order ID")?;
    let order = service.cancel_order(&principal, order_id).await?;
    Ok(HttpResponse::Ok().json(TransitionResponse::from(&order)))
}

pub async fn approve_order(
    service: web::Data<OrderService>,
    principal: Principal,
    body: web::Json<OrderIdRequest>,
) -> AppResult<HttpResponse> {
    let order_id = parse_id(&body.order_id, "order ID")?;
    let order = service.approve_order(&principal, order_id).await?;
    Ok(HttpResponse::Ok().json(TransitionResponse::from(&order)))
}

pub async fn reject_order(
    service: web::Data<OrderService>,
    principal: Principal,
    body: web::Json<OrderIdRequest>,
) -> AppResult<HttpResponse> {
    let order_id = parse_id(&body.order_id, "order ID")?;
    let order = service.reject_order(&principal, order_id).await?;
    Ok(HttpResponse::Ok().json(TransitionResponse::from(&order)))
}

pub async fn pay_order(
    service: web::Data<OrderService>,
    principal: Principal,
    body: web::Json<OrderIdRequest>,
) -> AppResult<HttpResponse> {
    let order_id = parse_id(&body.order_id, "order ID")?;
    let order = service.pay_order(&principal, order_id).await?;
    Ok(HttpResponse::Ok().json(TransitionResponse::from(&order)))
}

pub async fn get_doctor_orders(service: web::Data<OrderService>, principal: Principal) -> AppResult<HttpResponse> {
    let views = service.get_pending_orders_for_doctor(&principal).await?;
    let orders = views.into_iter().map(DoctorOrderDto::from).collect();
    Ok(HttpResponse::Ok().json(OrderListResponse::new(orders)))
}

pub async fn get_doctor_history(
    service: web::Data<OrderService>,
    principal: Principal,
    query: web::Query<DoctorHistoryQuery>,
) -> AppResult<HttpResponse> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<OrderStatus>().map_err(AppError::from)?),
    };

    let views = service.get_order_history_for_doctor(&principal, status).await?;
    let orders = views.into_iter().map(DoctorOrderDto::from).collect();
    Ok(HttpResponse::Ok().json(OrderListResponse::new(orders)))
}
