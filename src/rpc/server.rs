/// JSON-RPC server over stdin/stdout
///
/// This module implements the line-delimited front-end that:
/// 1. Reads one JSON-RPC request per line
/// 2. Dispatches it to the habit engine
/// 3. Writes one JSON-RPC response per line
///
/// Refused operations (bad dates, unknown habits, limits) are successful
/// responses carrying `{"ok": false, "reason": ...}`. Storage failures become
/// JSON-RPC errors with a generic message.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::rpc::params::{
    self, optional_day, CompletionRangeParams, CreateParams, HabitParams, ReorderParams, ToggleParams, UpdateParams,
    UserParams,
};
use crate::rpc::protocol::*;
use crate::storage::{SqliteStore, Transactional};
use crate::{EngineError, HabitEngine, ServerError};

/// How many times a conflicting operation is retried before giving up
pub const CONFLICT_RETRIES: usize = 3;

/// Why a request could not produce a result
enum Failure {
    InvalidParams(String),
    MethodNotFound(String),
    Encode(String),
    Engine(EngineError),
}

impl From<EngineError> for Failure {
    fn from(error: EngineError) -> Self {
        Failure::Engine(error)
    }
}

/// Server that exposes a `HabitEngine` over JSON-RPC
pub struct RpcServer<S: Transactional = SqliteStore> {
    engine: HabitEngine<S>,
}

impl<S: Transactional> RpcServer<S> {
    pub fn new(engine: HabitEngine<S>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &HabitEngine<S> {
        &self.engine
    }

    /// Serve requests from stdin until it is closed
    pub async fn run(&self) -> Result<(), ServerError> {
        info!("Starting JSON-RPC server, waiting for requests...");
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve requests from any line-oriented reader, answering on `writer`
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<(), ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("JSON-RPC server shutting down (input closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.process_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        writer.write_all(response_str.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                        writer.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read request: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    pub async fn process_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    json!(null),
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        Some(self.handle_request(request))
    }

    /// Handle a parsed JSON-RPC request
    pub fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::error(
                request.id,
                error_codes::INVALID_REQUEST,
                "Only JSON-RPC 2.0 is supported".to_string(),
                None,
            );
        }

        let payload = request.params.unwrap_or(Value::Null);
        let outcome = with_retry(&request.method, || self.dispatch(&request.method, payload.clone()));

        match outcome {
            Ok(result) => JsonRpcResponse::success(request.id, result),
            Err(Failure::Engine(e)) if e.is_validation() || e.is_retryable() => {
                debug!("{} refused: {}", request.method, e);
                JsonRpcResponse::success(request.id, rejected(&e))
            }
            Err(Failure::Engine(e)) => {
                error!("{} failed: {}", request.method, e);
                JsonRpcResponse::error(request.id, error_codes::STORAGE_ERROR, "Storage failure".to_string(), None)
            }
            Err(Failure::InvalidParams(message)) => {
                JsonRpcResponse::error(request.id, error_codes::INVALID_PARAMS, message, None)
            }
            Err(Failure::Encode(message)) => {
                error!("{} result could not be encoded: {}", request.method, message);
                JsonRpcResponse::error(request.id, error_codes::INTERNAL_ERROR, "Internal error".to_string(), None)
            }
            Err(Failure::MethodNotFound(method)) => JsonRpcResponse::error(
                request.id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", method),
                None,
            ),
        }
    }

    fn dispatch(&self, method: &str, payload: Value) -> Result<Value, Failure> {
        let engine = &self.engine;

        match method {
            "habit.create" => {
                let p: CreateParams = parse(payload)?;
                let (user, new_habit) = p.into_new_habit().map_err(EngineError::from)?;
                respond(&engine.create_habit(&user, new_habit)?)
            }
            "habit.update" => {
                let p: UpdateParams = parse(payload)?;
                let id = known_habit(&p.habit_id)?;
                let update = p.to_update().map_err(EngineError::from)?;
                respond(&engine.update_habit(&id, &params::user_id(&p.user_id), update)?)
            }
            "habit.archive" => {
                let p: HabitParams = parse(payload)?;
                let id = known_habit(&p.habit_id)?;
                respond(&engine.archive_habit(&id, &params::user_id(&p.user_id))?)
            }
            "habit.restore" => {
                let p: HabitParams = parse(payload)?;
                let id = known_habit(&p.habit_id)?;
                respond(&engine.restore_habit(&id, &params::user_id(&p.user_id))?)
            }
            "habit.list" => {
                let p: UserParams = parse(payload)?;
                respond(&engine.list_habits(&params::user_id(&p.user_id), p.include_archived)?)
            }
            "completion.toggle" => {
                let p: ToggleParams = parse(payload)?;
                let id = known_habit(&p.habit_id)?;
                let day = match optional_day(p.day.as_deref()).map_err(EngineError::from)? {
                    Some(day) => day,
                    None => engine.today(),
                };
                respond(&engine.toggle_completion_with_note(&id, day, &params::user_id(&p.user_id), p.note)?)
            }
            "completion.list" => {
                let p: CompletionRangeParams = parse(payload)?;
                let id = known_habit(&p.habit_id)?;
                let from = optional_day(p.from.as_deref()).map_err(EngineError::from)?;
                let to = optional_day(p.to.as_deref()).map_err(EngineError::from)?;
                respond(&engine.get_completions(&id, &params::user_id(&p.user_id), from, to)?)
            }
            "streak.current" => {
                let p: HabitParams = parse(payload)?;
                let id = known_habit(&p.habit_id)?;
                let streak = engine.get_current_streak(&id, &params::user_id(&p.user_id))?;
                Ok(accepted(json!({ "current_streak": streak })))
            }
            "favorite.toggle" => {
                let p: HabitParams = parse(payload)?;
                let id = known_habit(&p.habit_id)?;
                respond(&engine.toggle_favorite(&id, &params::user_id(&p.user_id))?)
            }
            "favorite.reorder" => {
                let p: ReorderParams = parse(payload)?;
                let id = known_habit(&p.habit_id)?;
                respond(&engine.reorder_favorite(&id, &params::user_id(&p.user_id), p.new_position)?)
            }
            "stats.habit" => {
                let p: HabitParams = parse(payload)?;
                let id = known_habit(&p.habit_id)?;
                respond(&engine.get_habit_statistics(&id, &params::user_id(&p.user_id))?)
            }
            "stats.user" => {
                let p: UserParams = parse(payload)?;
                respond(&engine.get_user_statistics(&params::user_id(&p.user_id))?)
            }
            _ => Err(Failure::MethodNotFound(method.to_string())),
        }
    }
}

/// Run `op`, retrying it while it reports a conflict
fn with_retry<F>(method: &str, mut op: F) -> Result<Value, Failure>
where
    F: FnMut() -> Result<Value, Failure>,
{
    let mut attempt = 0;
    loop {
        match op() {
            Err(Failure::Engine(e)) if e.is_retryable() && attempt < CONFLICT_RETRIES => {
                attempt += 1;
                warn!("{} hit a conflict, retrying ({}/{}): {}", method, attempt, CONFLICT_RETRIES, e);
            }
            other => return other,
        }
    }
}

fn parse<T: DeserializeOwned>(params: Value) -> Result<T, Failure> {
    serde_json::from_value(params).map_err(|e| Failure::InvalidParams(format!("Invalid parameters: {}", e)))
}

fn known_habit(raw: &str) -> Result<crate::domain::HabitId, Failure> {
    params::habit_id(raw).ok_or_else(|| {
        Failure::Engine(EngineError::NotFound {
            habit_id: raw.to_string(),
        })
    })
}

fn respond<T: Serialize>(value: &T) -> Result<Value, Failure> {
    serde_json::to_value(value)
        .map(accepted)
        .map_err(|e| Failure::Encode(e.to_string()))
}
