use std::{fmt, sync::Arc};

use axum::body::Body;

use crate::{
    config::ServerConfig,
    decode::validate_and_decode,
    error::PipelineError,
    registry::{KernelRegistry, Operation, OperationName},
    service::{EncodedResult, TransformService},
};

/// State shared by every request handler.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The built-in kernels.
    pub registry: Arc<KernelRegistry>,
    /// Filter and encode step.
    pub service: TransformService,
    /// Maximum size of a request body in bytes.
    pub max_body_bytes: usize,
}

impl AppState {
    /// State for a server running with `config`.
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_service(config, TransformService::new(config.jpeg_quality))
    }

    /// State using a custom transformation service.
    pub fn with_service(config: &ServerConfig, service: TransformService) -> Self {
        Self {
            registry: Arc::new(KernelRegistry::builtin()),
            service,
            max_body_bytes: config.max_body_bytes,
        }
    }
}

/// Progress of a single request through the pipeline.
///
/// Failures are logged with the last stage reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    /// Content type and body are available.
    Start,
    /// The content type is accepted and the body is read.
    Validated,
    /// The body is decoded into pixels.
    Decoded,
    /// The kernel to convolve with is known.
    KernelResolved,
    /// The filter produced a new image.
    Transformed,
    /// The output is encoded and ready to be sent.
    Encoded,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Validated => "validated",
            Self::Decoded => "decoded",
            Self::KernelResolved => "kernel resolved",
            Self::Transformed => "transformed",
            Self::Encoded => "encoded",
        };
        f.write_str(name)
    }
}

/// Everything the pipeline needs from an inbound request.
#[derive(Debug)]
pub struct FilterRequest {
    /// Operation named by the route.
    pub operation: OperationName,
    /// Raw `kernel` parameter, used by the custom operation.
    pub kernel: Option<String>,
    /// Declared content type of the body.
    pub content_type: Option<String>,
    /// The request body.
    pub body: Body,
}

// logs each transition so a failed request shows the last stage it reached
struct StageTracker {
    operation: OperationName,
    stage: PipelineStage,
}

impl StageTracker {
    fn new(operation: OperationName) -> Self {
        log::debug!("{operation}: {}", PipelineStage::Start);
        Self {
            operation,
            stage: PipelineStage::Start,
        }
    }

    fn advance(&mut self, stage: PipelineStage) {
        self.stage = stage;
        log::debug!("{}: {stage}", self.operation);
    }

    fn fail(&self, err: PipelineError) -> PipelineError {
        log::debug!(
            "{}: failed after {} with {}",
            self.operation,
            self.stage,
            err.category()
        );
        err
    }
}

/// Run a CPU bound pipeline step on the blocking pool.
///
/// A step that panics is reported as [`PipelineError::Task`].
pub(crate) async fn run_blocking<T, F>(step: F) -> Result<T, PipelineError>
where
    F: FnOnce() -> Result<T, PipelineError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(step)
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))?
}

/// Drive one request from its raw body to the encoded output.
///
/// The body is decoded before the kernel is resolved. The filter is never invoked for
/// a request that fails validation, decoding or kernel resolution. Decoding and
/// [`TransformService::transform`] run on the blocking pool.
pub async fn dispatch(
    state: &AppState,
    request: FilterRequest,
) -> Result<EncodedResult, PipelineError> {
    let FilterRequest {
        operation,
        kernel,
        content_type,
        body,
    } = request;
    let mut tracker = StageTracker::new(operation);

    let image = validate_and_decode(content_type.as_deref(), body, state.max_body_bytes)
        .await
        .map_err(|e| tracker.fail(e))?;
    tracker.advance(PipelineStage::Validated);
    tracker.advance(PipelineStage::Decoded);

    let operation = Operation::resolve_request(operation, kernel.as_deref())
        .map_err(|e| tracker.fail(e.into()))?;
    let kernel = state.registry.resolve(&operation).clone();
    tracker.advance(PipelineStage::KernelResolved);

    let size = image.size();
    let service = state.service.clone();
    let result = run_blocking(move || service.transform(image, &kernel))
        .await
        .map_err(|e| tracker.fail(e))?;
    tracker.advance(PipelineStage::Transformed);
    tracker.advance(PipelineStage::Encoded);

    log::debug!(
        "{}: {} {size} -> {} bytes",
        operation.name(),
        result.content_type,
        result.bytes.len(),
    );

    Ok(result)
}
