use crate::common::mock_server::{MockServerConfiguration, MockServerStorage};
use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};
use chrono::Utc;
use coreledger_rust::{
    apis::{
        auth::AssertionClaims,
        customers::{CreateCustomerRequest, Customer, CustomerStatus, UpdateCustomerRequest},
    },
    pagination::ListResponse,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Error envelope in the CoreLedger format.
pub(super) fn error_response(
    status: StatusCode,
    code: i64,
    title: &str,
    detail: impl Into<String>,
) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "status": status.as_u16(),
        "errors": [{
            "code": code,
            "title": title,
            "detail": detail.into(),
            "occurred_at": Utc::now()
        }]
    }))
}

fn customer_not_found(uid: &str) -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        404,
        "Customer not found",
        format!("no customer with uid {}", uid),
    )
}

/// Fallback for every unknown route
pub(super) async fn not_found(req: HttpRequest) -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        100,
        "Path/Method not found",
        format!("{} {}", req.method(), req.path()),
    )
}

/// POST /api/v1/auth
pub(super) async fn post_auth(
    configuration: web::Data<MockServerConfiguration>,
    storage: web::Data<MockServerStorage>,
    req: HttpRequest,
) -> HttpResponse {
    let assertion = match req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
    {
        Some(assertion) => assertion,
        None => {
            return error_response(
                StatusCode::UNAUTHORIZED,
                2,
                "Unauthorized",
                "missing assertion",
            )
        }
    };

    // The assertion carries no expiration, only an issue time
    let mut validation = Validation::new(Algorithm::HS512);
    validation.required_spec_claims.clear();
    validation.validate_exp = false;

    let claims = match jsonwebtoken::decode::<AssertionClaims>(
        assertion,
        &DecodingKey::from_secret(configuration.hmac_key.as_bytes()),
        &validation,
    ) {
        Ok(data) => data.claims,
        Err(e) => {
            return error_response(
                StatusCode::UNAUTHORIZED,
                4,
                "Invalid assertion",
                e.to_string(),
            )
        }
    };

    if claims.sub != configuration.program_identifier
        || (Utc::now().timestamp() - claims.iat).abs() > 300
    {
        return error_response(
            StatusCode::UNAUTHORIZED,
            4,
            "Invalid assertion",
            "unknown program or stale assertion",
        );
    }

    let token = format!("tok_{}", Uuid::new_v4().simple());
    storage.write().unwrap().tokens.push(token.clone());

    HttpResponse::Ok().json(json!({ "token": token }))
}

#[derive(Deserialize)]
pub(super) struct ListCustomersParams {
    limit: Option<usize>,
    offset: Option<usize>,
    email: Option<String>,
    status: Option<CustomerStatus>,
}

/// GET /api/v1/customers
pub(super) async fn list_customers(
    storage: web::Data<MockServerStorage>,
    params: web::Query<ListCustomersParams>,
) -> HttpResponse {
    let limit = params.limit.unwrap_or(100);
    let offset = params.offset.unwrap_or(0);

    let storage = storage.read().unwrap();
    let matching = storage
        .customers
        .values()
        .filter(|c| params.email.as_ref().map_or(true, |e| &c.details.email == e))
        .filter(|c| params.status.map_or(true, |s| c.status == s))
        .collect::<Vec<_>>();
    let data = matching
        .iter()
        .skip(offset)
        .take(limit)
        .map(|c| (*c).clone())
        .collect::<Vec<_>>();

    HttpResponse::Ok().json(ListResponse {
        total_count: matching.len() as u64,
        count: data.len() as u64,
        limit: limit as u64,
        offset: offset as u64,
        data,
    })
}

/// POST /api/v1/customers
pub(super) async fn create_customer(
    storage: web::Data<MockServerStorage>,
    body: web::Json<CreateCustomerRequest>,
) -> HttpResponse {
    let details = body.into_inner().details;
    if !details.email.contains('@') {
        return error_response(
            StatusCode::BAD_REQUEST,
            5,
            "Invalid \"email\"",
            format!("`{}` is not an email address", details.email),
        );
    }

    let now = Utc::now();
    let customer = Customer {
        uid: format!("cus_{}", Uuid::new_v4().simple()),
        status: CustomerStatus::Active,
        details,
        created_at: Some(now),
        updated_at: Some(now),
    };
    storage
        .write()
        .unwrap()
        .customers
        .insert(customer.uid.clone(), customer.clone());

    HttpResponse::Created().json(customer)
}

/// GET /api/v1/customers/{uid}
pub(super) async fn get_customer_by_uid(
    storage: web::Data<MockServerStorage>,
    path: web::Path<String>,
) -> HttpResponse {
    let uid = path.into_inner();

    storage.read().unwrap().customers.get(&uid).map_or_else(
        || customer_not_found(&uid),
        |customer| HttpResponse::Ok().json(customer),
    )
}

/// PUT /api/v1/customers/{uid}
pub(super) async fn update_customer(
    storage: web::Data<MockServerStorage>,
    path: web::Path<String>,
    body: web::Json<UpdateCustomerRequest>,
) -> HttpResponse {
    let uid = path.into_inner();

    let mut storage = storage.write().unwrap();
    let customer = match storage.customers.get_mut(&uid) {
        Some(customer) => customer,
        None => return customer_not_found(&uid),
    };

    customer.details = body.into_inner().details;
    customer.updated_at = Some(Utc::now());

    HttpResponse::Ok().json(&*customer)
}

/// PUT /api/v1/customers/{uid}/{action}
pub(super) async fn customer_action(
    req: HttpRequest,
    storage: web::Data<MockServerStorage>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (uid, action) = path.into_inner();

    let mut storage = storage.write().unwrap();
    let customer = match storage.customers.get_mut(&uid) {
        Some(customer) => customer,
        None => return customer_not_found(&uid),
    };

    let status = match (action.as_str(), customer.status) {
        ("lock" | "unlock" | "archive", CustomerStatus::Archived) => {
            return error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                422,
                "Customer is archived",
                format!("cannot {} customer {}", action, uid),
            )
        }
        ("lock", _) => CustomerStatus::Locked,
        ("unlock", _) => CustomerStatus::Active,
        ("archive", _) => CustomerStatus::Archived,
        _ => return not_found(req).await,
    };

    customer.status = status;
    customer.updated_at = Some(Utc::now());

    HttpResponse::Ok().json(&*customer)
}
