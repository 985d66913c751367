use may_minihttp::{HttpService, Request as WireRequest, Response as WireResponse};
use std::io;
use std::sync::Arc;

use super::core::Pipeline;
use super::request::parse_request;
use super::response::write_response;

/// `may_minihttp` service that feeds every request through the pipeline.
#[derive(Clone)]
pub(crate) struct AppService {
    pipeline: Arc<Pipeline>,
}

impl AppService {
    pub(crate) fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: WireRequest, res: &mut WireResponse) -> io::Result<()> {
        let response = match parse_request(req) {
            Ok(request) => self.pipeline.handle(request),
            Err(rejected) => rejected,
        };
        write_response(res, response);
        Ok(())
    }
}
