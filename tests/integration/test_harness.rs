// Test harness for integration tests
// In-memory collaborators, image fixtures and an in-process server

use std::collections::HashMap;
use std::convert::Infallible;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use heritage_brander::config::Config;
use heritage_brander::pipeline::BrandingPipeline;
use heritage_brander::server;
use heritage_brander::storage::{ObjectStorage, StorageError, UploadOptions};
use heritage_brander::watermark::{LogoSource, WatermarkError};
use http_body_util::Full;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const BUCKET: &str = "heritage-majlis";
pub const LOGO_URL: &str = "https://cdn.heritage.test/logo.png";

/// Solid-colour JPEG of the given size
pub fn base_jpeg(width: u32, height: u32) -> Bytes {
    let img = RgbImage::from_pixel(width, height, Rgb([210, 190, 160]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Jpeg)
        .unwrap();
    Bytes::from(out.into_inner())
}

/// Opaque black PNG logo, 2:1 aspect ratio
pub fn logo_png() -> Bytes {
    let img = RgbaImage::from_pixel(60, 30, Rgba([0, 0, 0, 255]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    Bytes::from(out.into_inner())
}

pub fn event_body(event_type: &str, table: &str, bucket: &str, name: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "type": event_type,
        "schema": "storage",
        "table": table,
        "record": { "bucket_id": bucket, "name": name, "id": "0d6c7a3e" }
    }))
    .unwrap()
}

pub fn insert_event(name: &str) -> Vec<u8> {
    event_body("INSERT", "objects", BUCKET, name)
}

pub fn config_with_logo() -> Config {
    let mut config = Config::default();
    config.branding.logo_url = Some(LOGO_URL.to_string());
    config
}

#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub bucket: String,
    pub path: String,
    pub data: Bytes,
    pub options: UploadOptions,
}

/// Object storage backed by a HashMap
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<(String, String), Bytes>>,
    uploads: Mutex<Vec<RecordedUpload>>,
    downloads: AtomicUsize,
}

impl MemoryStorage {
    pub fn with_object(bucket: &str, path: &str, data: Bytes) -> Self {
        let storage = Self::default();
        storage.put(bucket, path, data);
        storage
    }

    pub fn put(&self, bucket: &str, path: &str, data: Bytes) {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), path.to_string()), data);
    }

    pub fn get(&self, bucket: &str, path: &str) -> Option<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn download(&self, bucket: &str, path: &str) -> Result<Bytes, StorageError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        self.get(bucket, path).ok_or_else(|| StorageError::Download {
            bucket: bucket.to_string(),
            path: path.to_string(),
            message: "NoSuchKey".to_string(),
        })
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        options: UploadOptions,
    ) -> Result<(), StorageError> {
        let key = (bucket.to_string(), path.to_string());
        let mut objects = self.objects.lock().unwrap();
        if !options.overwrite && objects.contains_key(&key) {
            return Err(StorageError::Upload {
                bucket: bucket.to_string(),
                path: path.to_string(),
                message: "The resource already exists".to_string(),
            });
        }
        objects.insert(key, data.clone());

        self.uploads.lock().unwrap().push(RecordedUpload {
            bucket: bucket.to_string(),
            path: path.to_string(),
            data,
            options,
        });
        Ok(())
    }
}

/// Logo source that always returns the same bytes, or always fails
pub struct StaticLogo {
    result: Result<Bytes, WatermarkError>,
    fetches: AtomicUsize,
}

impl StaticLogo {
    pub fn new(bytes: Bytes) -> Self {
        Self {
            result: Ok(bytes),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(WatermarkError::FetchError(message.to_string())),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LogoSource for StaticLogo {
    async fn fetch(&self, _url: &str) -> Result<Bytes, WatermarkError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

pub fn pipeline(
    config: Config,
    storage: Option<Arc<MemoryStorage>>,
    logo: Arc<StaticLogo>,
) -> BrandingPipeline {
    let storage = storage.map(|s| s as Arc<dyn ObjectStorage>);
    BrandingPipeline::new(Arc::new(config), storage, logo)
}

/// In-process webhook server on an ephemeral port
pub struct ServerHarness {
    pub base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<std::io::Result<()>>>,
}

impl ServerHarness {
    pub async fn start(pipeline: BrandingPipeline) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(server::serve(listener, Arc::new(pipeline), async {
            let _ = rx.await;
        }));

        Self {
            base_url: format!("http://{}", addr),
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Stop accepting connections and wait for the accept loop to exit
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await.unwrap().unwrap();
        }
    }
}

impl Drop for ServerHarness {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Minimal origin serving a logo, a redirect chain and a 404
pub async fn start_logo_origin(logo: Bytes) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let logo = logo.clone();
            tokio::spawn(async move {
                let service = service_fn(move |request: Request<hyper::body::Incoming>| {
                    let logo = logo.clone();
                    async move { Ok::<_, Infallible>(origin_response(request.uri().path(), logo)) }
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    (addr, handle)
}

fn origin_response(path: &str, logo: Bytes) -> Response<Full<Bytes>> {
    let redirect = |location: &str| {
        Response::builder()
            .status(StatusCode::FOUND)
            .header("location", location)
            .body(Full::new(Bytes::new()))
            .unwrap()
    };

    match path {
        "/logo.png" => Response::builder()
            .header("content-type", "image/png")
            .body(Full::new(logo))
            .unwrap(),
        "/old/logo.png" => redirect("/moved/logo.png"),
        "/moved/logo.png" => redirect("/logo.png"),
        "/loop" => redirect("/loop"),
        "/error" => Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Full::new(Bytes::from_static(b"boom")))
            .unwrap(),
        _ => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Full::new(Bytes::from_static(b"not found")))
            .unwrap(),
    }
}
