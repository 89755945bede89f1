//! Conversion service seam between SDL text and the JSON type model.

use crate::error::SdlResult;
use crate::model::TypeModel;
use crate::{parser, printer};
use async_trait::async_trait;

/// Converts SDL to the type model and back.
///
/// The schema editor talks to this trait so conversion can live in another
/// process; [`LocalSdlService`] does it in-process.
#[async_trait]
pub trait SdlService: Send + Sync {
    async fn to_model(&self, sdl: &str) -> SdlResult<TypeModel>;

    async fn to_sdl(&self, model: &TypeModel) -> SdlResult<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSdlService;

#[async_trait]
impl SdlService for LocalSdlService {
    async fn to_model(&self, sdl: &str) -> SdlResult<TypeModel> {
        parser::parse(sdl)
    }

    async fn to_sdl(&self, model: &TypeModel) -> SdlResult<String> {
        printer::serialize(model)
    }
}
