//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any long, non-cpu-bound operation (e.g. I/O, database operations,
//! etc.) should be expressed as futures or asynchronous functions.
use std::{io::ErrorKind, path::PathBuf};

use actix_web::{get, http::StatusCode, web, HttpRequest, HttpResponse, Responder};
use log::*;
use oms_engine::{
    events::{EventPublisher, EventSource, TENANT_HEADER},
    intake::{BulkIntakePublisher, IntakeQueue, ObjectPath, ObjectStore},
    webhooks::{WebhookCache, WebhookDelivery},
    InventoryService,
    OrderFlowApi,
    OrderManagement,
    WebhookApi,
    WebhookManagement,
};
use uuid::Uuid;

use crate::{
    data_objects::{
        BulkOrderResponse,
        CreateOrderRequest,
        FilePathRequest,
        JsonResponse,
        OrderSearchParams,
        RegisterWebhookRequest,
        UploadResponse,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal) => {
        paste::paste! { pub struct [<$name:camel Route>];}
        paste::paste! {
                impl [<$name:camel Route>] {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self { Self }
            }
        }
        paste::paste! {
            impl actix_web::dev::HttpServiceFactory for [<$name:camel Route>] {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name);
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

/// The directory that invalid-rows files are served from.
#[derive(Debug, Clone)]
pub struct PublicDir(pub PathBuf);

/// Where the upload helper puts local files.
#[derive(Debug, Clone)]
pub struct UploadTarget(pub ObjectPath);

/// Reads the tenant from the `X-Tenant-ID` header. A missing header is `None`; a header that is not a UUID is an error.
pub fn tenant_from_header(req: &HttpRequest) -> Result<Option<Uuid>, ServerError> {
    let Some(value) = req.headers().get(TENANT_HEADER) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|e| ServerError::InvalidRequestHeader(format!("{TENANT_HEADER} could not be read. {e}")))?;
    Uuid::parse_str(value.trim())
        .map(Some)
        .map_err(|e| ServerError::InvalidRequestHeader(format!("{TENANT_HEADER} is not a valid tenant id. {e}")))
}

fn require_tenant(req: &HttpRequest) -> Result<Uuid, ServerError> {
    tenant_from_header(req)?
        .ok_or_else(|| ServerError::InvalidRequestHeader(format!("The {TENANT_HEADER} header is required")))
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl OrderManagement, InventoryService, EventPublisher);
/// Route handler for `POST /api/v1/orders`
///
/// Validates, stores and announces a single order. The tenant is taken from the `X-Tenant-ID` header. If the body does
/// not carry an `order_id`, one is generated. On success, the stored order is returned with a `201` status.
pub async fn create_order<B, I, E>(
    req: HttpRequest,
    body: web::Json<CreateOrderRequest>,
    api: web::Data<OrderFlowApi<B, I, E>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
    I: InventoryService,
    E: EventPublisher,
{
    let tenant_id = require_tenant(&req)?;
    let order = body.into_inner().into_new_order(tenant_id);
    debug!("💻️ POST new order [{}] for tenant {tenant_id}", order.order_id);
    let order = api.process_new_order(order, EventSource::OrderApi).await.map_err(|e| {
        debug!("💻️ Order was not accepted. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Created().json(order))
}

route!(search_orders => Get "/orders" impl OrderManagement, InventoryService, EventPublisher);
/// Route handler for `GET /api/v1/orders`
///
/// All query parameters are optional: `seller_id`, `status`, `start_date` and `end_date`. When the `X-Tenant-ID` header
/// is present, only that tenant's orders are returned. Results are ordered by creation time.
pub async fn search_orders<B, I, E>(
    req: HttpRequest,
    query: web::Query<OrderSearchParams>,
    api: web::Data<OrderFlowApi<B, I, E>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
    I: InventoryService,
    E: EventPublisher,
{
    let tenant_id = tenant_from_header(&req)?;
    let filter = query.into_inner().into_filter(tenant_id)?;
    debug!("💻️ GET orders search for [{filter}]");
    let orders = api.search_orders(filter).await.map_err(|e| {
        debug!("💻️ Could not fetch orders. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(orders))
}

//----------------------------------------------   Bulk intake  ----------------------------------------------------
route!(bulk_order => Post "/order/bulkorder" impl ObjectStore, IntakeQueue);
/// Route handler for `POST /api/v1/order/bulkorder`
///
/// Accepts `{"filePath": "s3://bucket/key"}`. The object must exist. It is queued for ingestion and processed in the
/// background, so a successful response only means that the file was accepted.
pub async fn bulk_order<S, Q>(
    body: web::Json<FilePathRequest>,
    api: web::Data<BulkIntakePublisher<S, Q>>,
) -> Result<HttpResponse, ServerError>
where
    S: ObjectStore,
    Q: IntakeQueue,
{
    let FilePathRequest { file_path } = body.into_inner();
    debug!("💻️ POST bulk order file {file_path}");
    api.submit(&file_path).await.map_err(|e| {
        info!("💻️ Bulk order file {file_path} was not accepted. {e}");
        ServerError::from(e)
    })?;
    let response =
        BulkOrderResponse { success: true, file_path, message: "The file has been queued for processing".into() };
    Ok(HttpResponse::Ok().json(response))
}

route!(upload_csv => Post "/csv/filepath" impl ObjectStore, IntakeQueue);
/// Route handler for `POST /api/v1/csv/filepath`
///
/// Copies a file from the server's file system into the object store, at the configured upload bucket and key. The
/// file is not queued; use the bulk order endpoint with the returned `filePath` for that.
pub async fn upload_csv<S, Q>(
    body: web::Json<FilePathRequest>,
    api: web::Data<BulkIntakePublisher<S, Q>>,
    target: web::Data<UploadTarget>,
) -> Result<HttpResponse, ServerError>
where
    S: ObjectStore,
    Q: IntakeQueue,
{
    let local = PathBuf::from(body.into_inner().file_path);
    let object = &target.0;
    debug!("💻️ POST upload of {} to {object}", local.display());
    let bytes = api.upload_local_file(&local, object).await?;
    Ok(HttpResponse::Ok().json(UploadResponse { file_path: object.to_string(), bytes }))
}

//----------------------------------------------   Webhooks  ----------------------------------------------------
route!(register_webhook => Post "/webhooks/register" impl WebhookManagement, WebhookCache, WebhookDelivery);
/// Route handler for `POST /api/v1/webhooks/register`
///
/// Registers (or replaces) the URL that the tenant in `X-Tenant-ID` is notified on when its orders are re-checked.
pub async fn register_webhook<B, C, D>(
    req: HttpRequest,
    body: web::Json<RegisterWebhookRequest>,
    api: web::Data<WebhookApi<B, C, D>>,
) -> Result<HttpResponse, ServerError>
where
    B: WebhookManagement,
    C: WebhookCache,
    D: WebhookDelivery,
{
    let tenant_id = require_tenant(&req)?;
    let url = body.into_inner().url;
    debug!("💻️ POST webhook registration for tenant {tenant_id}");
    let registration = api.register(&tenant_id, &url).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Webhook registered: {}", registration.url))))
}

//----------------------------------------------   Public files  ----------------------------------------------------
route!(public_file => Get "/public/{file}");
/// Serves invalid-rows files for download. Only plain file names in the public directory are served.
pub async fn public_file(path: web::Path<String>, dir: web::Data<PublicDir>) -> Result<HttpResponse, ServerError> {
    let name = path.into_inner();
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(ServerError::InvalidRequestPath(format!("'{name}' is not a downloadable file")));
    }
    trace!("💻️ GET public file {name}");
    let content = tokio::fs::read(dir.0.join(&name)).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => ServerError::NoRecordFound(format!("{name} does not exist")),
        _ => ServerError::IOError(e),
    })?;
    Ok(HttpResponse::build(StatusCode::OK)
        .content_type("text/csv")
        .insert_header(("Content-Disposition", format!("attachment; filename=\"{name}\"")))
        .body(content))
}
