use lambda_http::{run, service_fn, tracing, Body, Error, Request, Response};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::fmt::Display;
use std::io;
use std::io::{ErrorKind, Write};
use std::str::from_utf8;
use std::sync::Arc;
use trafo::errors::TrafoError;
use trafo::input::PolicyOverrides;
use trafo::output::Output;
use trafo::{run_project, ProjectFlags};
use uuid::Uuid;

async fn function_handler(event: Request) -> Result<Response<Body>, Error> {
    let input = match event.body() {
        Body::Empty => "",
        Body::Text(text) => text.as_str(),
        Body::Binary(_) => {
            return error_response(422, &"Request body must be UTF-8 JSON text");
        }
    }
    .as_bytes();

    let output = LambdaOutput::new();

    let resp = match run_project(
        input,
        &output,
        &PolicyOverrides::default(),
        &ProjectFlags::DETAILED_LOAD_OUTPUT,
    ) {
        Ok(report) => Response::builder()
            .status(200)
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&json!({
                "report": report,
                "files": output.files(),
            }))?))
            .map_err(Box::new)?,
        Err(e) => error_response(status_for_error(&e), &e)?,
    };

    Ok(resp)
}

fn status_for_error(error: &TrafoError) -> u16 {
    match error {
        TrafoError::InvalidRequest(_) | TrafoError::FailureInCalculation(_) => 422,
        TrafoError::ErrorInOutput(_) => 500,
    }
}

fn error_response(status: u16, error: &dyn Display) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&json!({"errors": [{"id": Uuid::new_v4(), "status": status.to_string(), "detail": error.to_string()}]}))?))
        .map_err(Box::new)?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    run(service_fn(function_handler)).await
}

/// This output collects each "file" (e.g. the CSV tables) as a string keyed by its name, so they can
/// be returned alongside the JSON report in the response body.
#[derive(Debug, Default)]
struct LambdaOutput(Arc<Mutex<Vec<(String, String)>>>);

impl LambdaOutput {
    fn new() -> Self {
        Default::default()
    }

    fn files(&self) -> Value {
        Value::Object(
            self.0
                .lock()
                .iter()
                .map(|(name, contents)| (name.clone(), Value::String(contents.clone())))
                .collect(),
        )
    }
}

impl Output for LambdaOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        let file_name = format!("{location_key}.{file_extension}");
        self.0.lock().push((file_name.clone(), String::new()));

        Ok(FileLikeStringWriter {
            files: self.0.clone(),
            file_name,
        })
    }
}

impl Output for &LambdaOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        <LambdaOutput as Output>::writer_for_location_key(self, location_key, file_extension)
    }
}

/// Represents a writer for an individual "file".
struct FileLikeStringWriter {
    files: Arc<Mutex<Vec<(String, String)>>>,
    file_name: String,
}

impl Write for FileLikeStringWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let utf8 = match from_utf8(buf) {
            Ok(utf8) => utf8,
            Err(_) => {
                return Err(io::Error::new(
                    ErrorKind::InvalidData,
                    "Tried to write out invalid UTF-8.",
                ));
            }
        };
        let mut files = self.files.lock();
        if let Some((_, contents)) = files
            .iter_mut()
            .rev()
            .find(|(name, _)| *name == self.file_name)
        {
            contents.push_str(utf8);
        }
        Ok(utf8.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
