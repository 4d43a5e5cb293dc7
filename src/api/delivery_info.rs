use actix_web::{web, HttpResponse};

use super::dto::{
    rfc3339, CreateDeliveryInfoRequest, DeleteDeliveryInfoRequest, DeletedResponse, DeliveryInfoDto,
    DeliveryInfoListResponse, DeliveryInfoResponse, UpdateDeliveryInfoRequest,
};
use super::parse_id;
use crate::auth::Principal;
use crate::domain::delivery::DeliveryInformation;
use crate::error::AppResult;
use crate::services::{DeliveryInformationChanges, DeliveryService};

fn list(infos: Vec<DeliveryInformation>) -> DeliveryInfoListResponse {
    DeliveryInfoListResponse {
        delivery_infos: infos.into_iter().map(DeliveryInfoDto::from).collect(),
    }
}

pub async fn create(
    service: web::Data<DeliveryService>,
    principal: Principal,
    body: web::Json<CreateDeliveryInfoRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let info = service
        .create(
            &principal,
            DeliveryInformationChanges {
                address: body.address,
                phone_number: body.phone_number,
                delivery_method: body.delivery_method,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(DeliveryInfoResponse {
        delivery_info: info.into(),
    }))
}

pub async fn update(
    service: web::Data<DeliveryService>,
    _principal: Principal,
    body: web::Json<UpdateDeliveryInfoRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let id = parse_id(&body.id, "delivery information ID")?;
    let info = service
        .update(
            id,
            DeliveryInformationChanges {
                address: body.address,
                phone_number: body.phone_number,
                delivery_method: body.delivery_method,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(DeliveryInfoResponse {
        delivery_info: info.into(),
    }))
}

pub async fn delete(
    service: web::Data<DeliveryService>,
    _principal: Principal,
    body: web::Json<DeleteDeliveryInfoRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&body.id, "delivery information ID")?;
    let deleted_at = service.delete(id).await?;

    Ok(HttpResponse::Ok().json(DeletedResponse {
        id,
        deleted_at: rfc3339(&deleted_at),
    }))
}

pub async fn get_all(service: web::Data<DeliveryService>, _principal: Principal) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(list(service.get_all().await?)))
}

pub async fn get_by_id(
    service: web::Data<DeliveryService>,
    _principal: Principal,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "delivery information ID")?;
    let info = service.get_by_id(id).await?;
    Ok(HttpResponse::Ok().json(DeliveryInfoResponse {
        delivery_info: info.into(),
    }))
}

pub async fn get_by_user_id(
    service: web::Data<DeliveryService>,
    _principal: Principal,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let user_id = parse_id(&path, "user ID")?;
    Ok(HttpResponse::Ok().json(list(service.get_by_user_id(user_id).await?)))
}
